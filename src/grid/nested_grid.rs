//! # Nested uniform grid
//!
//! An octree-like hierarchy made of uniform grid layers. Layer 0 is the
//! finest; every parent layer is its child decimated by (typically) 2 along
//! each axis, until a layer is a single cell.
//!
//! Each cell of a parent layer represents a *cluster* of child cells. The
//! per-layer decimation table gives the cluster size per axis, and
//! [`NestedGrid::child_cluster_min_corner_index`] maps a parent cell to the
//! minimal child cell of its cluster. The cells of the cluster are visited as:
//!
//! ```text
//! for k in 0..dec[2] { for j in 0..dec[1] { for i in 0..dec[0] {
//!     child = cluster_min + (i, j, k)
//! }}}
//! ```

use std::ops::Index;

use log::trace;

use crate::grid::geometry::UniformGridGeometry;
use crate::grid::uniform_grid::{GridElement, UniformGrid};

/// A cell has 8 corners; a layer with at most this many points is one cell.
const SINGLE_CELL_CAPACITY: usize = 8;

/// Stack of uniform grids, finest first.
#[derive(Debug, Clone)]
pub struct NestedGrid<T> {
    layers: Vec<UniformGrid<T>>,
    decimations: Vec<[usize; 3]>,
}

impl<T> Default for NestedGrid<T> {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            decimations: Vec::new(),
        }
    }
}

impl<T> Index<usize> for NestedGrid<T> {
    type Output = UniformGrid<T>;

    fn index(&self, layer: usize) -> &UniformGrid<T> {
        &self.layers[layer]
    }
}

impl<T: GridElement> NestedGrid<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full layer stack from a seed geometry.
    ///
    /// 1. Push a copy of `seed` as layer 0 and allocate its contents.
    /// 2. Keep pushing 2x decimations of the newest layer until it holds a
    ///    single cell (capacity <= 8).
    /// 3. Precompute the decimation ratios between each parent and its child.
    ///
    /// Only shapes are built here; contents are left empty for the caller to fill.
    pub fn initialize(&mut self, seed: &UniformGridGeometry) {
        self.layers.clear();
        self.layers.reserve(Self::precompute_num_layers(seed));

        self.add_layer(seed, 1);
        while self.layers[self.layers.len() - 1].grid_capacity() > SINGLE_CELL_CAPACITY {
            let template = self.layers[self.layers.len() - 1].geometry().clone();
            self.add_layer(&template, 2);
        }

        self.precompute_decimations();
        trace!("nested grid initialized with {} layers", self.layers.len());
    }

    fn add_layer(&mut self, template: &UniformGridGeometry, decimation: usize) {
        let mut layer = UniformGrid::new();
        layer.decimate(template, decimation);
        layer.init();
        self.layers.push(layer);
    }

    /// Number of layers this hierarchy will have for the given seed,
    /// used to reserve the layer vector up front.
    fn precompute_num_layers(seed: &UniformGridGeometry) -> usize {
        let mut num_layers = 1;
        let mut num_points = [seed.num_points(0), seed.num_points(1), seed.num_points(2)];
        let mut size: usize = num_points.iter().product();
        while size > SINGLE_CELL_CAPACITY {
            num_layers += 1;
            for n in num_points.iter_mut() {
                *n = (n.saturating_sub(1) / 2).max(1) + 1;
            }
            size = num_points.iter().product();
        }
        num_layers
    }

    fn precompute_decimations(&mut self) {
        // Layer 0 has no children, so its row stays zero
        self.decimations = vec![[0; 3]; self.layers.len()];
        for parent in 1..self.layers.len() {
            let child = &self.layers[parent - 1];
            let par = &self.layers[parent];
            for axis in 0..3 {
                self.decimations[parent][axis] = child.num_cells(axis) / par.num_cells(axis).max(1);
            }
        }
    }

    /// Drop all layers.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.decimations.clear();
    }
}

impl<T> NestedGrid<T> {
    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> &UniformGrid<T> {
        &self.layers[index]
    }

    pub fn layer_mut(&mut self, index: usize) -> &mut UniformGrid<T> {
        &mut self.layers[index]
    }

    /// Borrow a parent layer mutably together with its child layer.
    pub fn parent_and_child_mut(&mut self, parent: usize) -> (&mut UniformGrid<T>, &UniformGrid<T>) {
        let (lower, upper) = self.layers.split_at_mut(parent);
        (&mut upper[0], &lower[parent - 1])
    }

    /// Child cells per parent cell, per axis, for the given parent layer.
    /// Meaningless (all zero) for layer 0.
    pub fn decimations(&self, parent_layer: usize) -> &[usize; 3] {
        &self.decimations[parent_layer]
    }

    /// Indices of the minimal child cell in the cluster represented by a parent cell.
    #[inline]
    pub fn child_cluster_min_corner_index(parent_indices: &[usize; 3], decimations: &[usize; 3]) -> [usize; 3] {
        [
            parent_indices[0] * decimations[0],
            parent_indices[1] * decimations[1],
            parent_indices[2] * decimations[2],
        ]
    }

    pub fn layers(&self) -> &[UniformGrid<T>] {
        &self.layers
    }
}
