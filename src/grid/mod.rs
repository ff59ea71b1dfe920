pub mod geometry;
pub mod uniform_grid;
pub mod nested_grid;
pub mod grid_math;
