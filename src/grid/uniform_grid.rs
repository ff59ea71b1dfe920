//! # Uniform grid container
//!
//! [`UniformGrid<T>`] pairs a [`UniformGridGeometry`] with one value of `T`
//! per grid point, stored in a flat `Vec<T>` in offset order.
//!
//! Two element traits gate what a grid can do:
//! - [`GridElement`]: anything with an "empty" value, enough to allocate contents.
//! - [`GridValue`]: copyable, additive, scalar-multipliable values, required for
//!   trilinear [`insert`](UniformGrid::insert) / [`interpolate`](UniformGrid::interpolate)
//!   and [`compute_statistics`](UniformGrid::compute_statistics).

use std::ops::{Add, AddAssign, Deref, Index, IndexMut, Mul};

use crate::grid::geometry::UniformGridGeometry;
use crate::simulation::states::{NMat3, NVec3};

/// Element that can populate a freshly initialized grid.
pub trait GridElement: Clone {
    /// Value every grid point holds right after [`UniformGrid::init`].
    fn empty() -> Self;
}

/// Arithmetic element usable with trilinear scatter/gather.
pub trait GridValue:
    GridElement + Copy + Add<Output = Self> + AddAssign + Mul<f64, Output = Self> + Send + Sync
{
    /// Component-wise minimum.
    fn min_with(&self, other: &Self) -> Self;
    /// Component-wise maximum.
    fn max_with(&self, other: &Self) -> Self;
}

impl GridElement for f64 {
    fn empty() -> Self {
        0.0
    }
}

impl GridValue for f64 {
    fn min_with(&self, other: &Self) -> Self {
        self.min(*other)
    }
    fn max_with(&self, other: &Self) -> Self {
        self.max(*other)
    }
}

impl GridElement for NVec3 {
    fn empty() -> Self {
        NVec3::zeros()
    }
}

impl GridValue for NVec3 {
    fn min_with(&self, other: &Self) -> Self {
        self.zip_map(other, f64::min)
    }
    fn max_with(&self, other: &Self) -> Self {
        self.zip_map(other, f64::max)
    }
}

impl GridElement for NMat3 {
    fn empty() -> Self {
        NMat3::zeros()
    }
}

impl GridValue for NMat3 {
    fn min_with(&self, other: &Self) -> Self {
        self.zip_map(other, f64::min)
    }
    fn max_with(&self, other: &Self) -> Self {
        self.zip_map(other, f64::max)
    }
}

impl<T: Clone> GridElement for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }
}

/// Trilinear stencil of the cell containing a position: offsets of its 8
/// corners and their weights, ordered x fastest, then y, then z.
struct Stencil {
    offsets: [usize; 8],
    weights: [f64; 8],
}

/// Uniform grid of `T` values, one per grid point.
#[derive(Debug, Clone)]
pub struct UniformGrid<T> {
    geometry: UniformGridGeometry,
    contents: Vec<T>,
}

impl<T> Deref for UniformGrid<T> {
    type Target = UniformGridGeometry;

    fn deref(&self) -> &Self::Target {
        &self.geometry
    }
}

impl<T> Index<usize> for UniformGrid<T> {
    type Output = T;

    fn index(&self, offset: usize) -> &T {
        &self.contents[offset]
    }
}

impl<T> IndexMut<usize> for UniformGrid<T> {
    fn index_mut(&mut self, offset: usize) -> &mut T {
        &mut self.contents[offset]
    }
}

impl<T: GridElement> UniformGrid<T> {
    /// Grid with no shape and no contents.
    pub fn new() -> Self {
        Self {
            geometry: UniformGridGeometry::default(),
            contents: Vec::new(),
        }
    }

    /// Grid that copies the shape of `geometry`. Contents are not allocated
    /// until [`init`](Self::init).
    pub fn with_geometry(geometry: &UniformGridGeometry) -> Self {
        Self {
            geometry: geometry.clone(),
            contents: Vec::new(),
        }
    }

    /// Allocate contents, one empty element per grid point.
    pub fn init(&mut self) {
        self.contents.clear();
        self.contents.resize(self.geometry.grid_capacity(), T::empty());
    }

    /// Redefine the shape; any existing contents are discarded.
    pub fn define_shape(&mut self, num_elements: usize, min: NVec3, max: NVec3, power_of_two: bool) {
        self.contents.clear();
        self.geometry.define_shape(num_elements, min, max, power_of_two);
    }

    /// Take the shape of `src` decimated by `decimation`; contents are discarded.
    pub fn decimate(&mut self, src: &UniformGridGeometry, decimation: usize) {
        self.contents.clear();
        self.geometry.decimate(src, decimation);
    }

    /// Copy the shape of `src`; contents are discarded.
    pub fn copy_shape(&mut self, src: &UniformGridGeometry) {
        self.decimate(src, 1);
    }

    /// Drop shape and contents.
    pub fn clear(&mut self) {
        self.contents.clear();
        self.geometry.clear();
    }

    pub fn geometry(&self) -> &UniformGridGeometry {
        &self.geometry
    }

    /// Number of allocated elements (0 before [`init`](Self::init)).
    pub fn size(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn contents(&self) -> &[T] {
        &self.contents
    }

    pub fn contents_mut(&mut self) -> &mut [T] {
        &mut self.contents
    }

    /// Mutable element of the cell containing `position`.
    pub fn at_position_mut(&mut self, position: &NVec3) -> &mut T {
        let offset = self.geometry.cell_offset_of_position(position);
        &mut self.contents[offset]
    }

    fn stencil(&self, position: &NVec3) -> Stencil {
        let g = &self.geometry;
        let indices = g.cell_indices_of_position(position);
        let min_corner = g.position_from_indices(&indices);
        let base = g.offset_from_indices(&indices);

        // Fractional location of position within its cell
        let tween = (position - min_corner).component_mul(g.cells_per_extent());
        let one_minus = NVec3::new(1.0, 1.0, 1.0) - tween;

        let nx = g.num_points(0);
        let nxy = nx * g.num_points(1);

        Stencil {
            offsets: [
                base,
                base + 1,
                base + nx,
                base + nx + 1,
                base + nxy,
                base + nxy + 1,
                base + nxy + nx,
                base + nxy + nx + 1,
            ],
            weights: [
                one_minus.x * one_minus.y * one_minus.z,
                tween.x * one_minus.y * one_minus.z,
                one_minus.x * tween.y * one_minus.z,
                tween.x * tween.y * one_minus.z,
                one_minus.x * one_minus.y * tween.z,
                tween.x * one_minus.y * tween.z,
                one_minus.x * tween.y * tween.z,
                tween.x * tween.y * tween.z,
            ],
        }
    }
}

impl<T: GridValue> UniformGrid<T> {
    /// Scatter `item` into the 8 corners of the cell containing `position`,
    /// weighted trilinearly. Values accumulate (`+=`).
    pub fn insert(&mut self, position: &NVec3, item: T) {
        let stencil = self.stencil(position);
        for (offset, weight) in stencil.offsets.iter().zip(stencil.weights.iter()) {
            self.contents[*offset] += item * *weight;
        }
    }

    /// Gather the trilinearly interpolated value at `position`.
    pub fn interpolate(&self, position: &NVec3) -> T {
        let stencil = self.stencil(position);
        let mut result = T::empty();
        for (offset, weight) in stencil.offsets.iter().zip(stencil.weights.iter()) {
            result += self.contents[*offset] * *weight;
        }
        result
    }

    /// Component-wise `(min, max)` over all contents, or `None` for an
    /// uninitialized grid.
    pub fn compute_statistics(&self) -> Option<(T, T)> {
        let first = *self.contents.first()?;
        Some(self.contents.iter().fold((first, first), |(lo, hi), v| {
            (lo.min_with(v), hi.max_with(v))
        }))
    }
}
