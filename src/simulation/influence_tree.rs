//! # Influence Tree
//!
//! This module implements the **influence tree**: a [`NestedGrid`] of
//! aggregated vortons ("supervortons") used to approximate the velocity that
//! a whole vorton population induces at a point. It replaces the naive
//! `O(N)`-per-query Biot-Savart sum with a hierarchical descent that is
//! exact-ish nearby and coarse far away, in the same spirit as Barnes-Hut.
//!
//! ## Core Concepts
//!
//! - Layer 0 bins every vorton into a uniform grid cell. Each cell holds one
//!   supervorton: summed vorticity, placed at the `|ω|`-weighted centroid of
//!   its members.
//! - Every parent layer aggregates a block (cluster) of child cells the same
//!   way, up to a root layer that is a single cell.
//! - Queries start at the root and walk down. A child cell that contains the
//!   query point (plus a small margin) is opened and visited recursively;
//!   every other child cell contributes through its supervorton alone.
//!
//! Unlike an adaptive octree, every layer is a full uniform grid, so cluster
//! membership is pure index arithmetic and nothing has to be allocated per
//! node.

use log::trace;

use crate::grid::geometry::UniformGridGeometry;
use crate::grid::nested_grid::NestedGrid;
use crate::grid::uniform_grid::UniformGrid;
use crate::simulation::states::NVec3;
use crate::simulation::vorton::Vorton;

/// Marks a vorticity-magnitude sum that nothing was added to.
const EMPTY_NORM_SUM: f64 = f64::MIN_POSITIVE;

/// Hierarchy of supervortons built over a vorton population.
#[derive(Debug, Clone)]
pub struct InfluenceTree {
    grid: NestedGrid<Vorton>,
    margin_factor: f64, // descent margin, fraction of child cell spacing
}

impl InfluenceTree {
    pub fn new(margin_factor: f64) -> Self {
        Self {
            grid: NestedGrid::new(),
            margin_factor,
        }
    }

    /// Rebuild the tree over `vortons`, inside the box `[min, max]`.
    ///
    /// This:
    /// 1. Shapes layer 0 to hold about one vorton per cell, with power-of-two
    ///    cell counts so each parent layer halves cleanly.
    /// 2. Builds the layer stack with [`NestedGrid::initialize`].
    /// 3. Fills layer 0 from the vortons ([`Self::make_base_vorton_grid`]).
    /// 4. Aggregates each parent layer from its child, bottom-up.
    ///
    /// # Parameters
    /// - `vortons`: the population to aggregate. Every vorton must lie inside
    ///   `[min, max]`.
    /// - `min`, `max`: bounding box of the region the tree covers.
    pub fn build(&mut self, vortons: &[Vorton], min: NVec3, max: NVec3) {
        let skeleton = UniformGridGeometry::new(vortons.len().max(1), min, max, true);
        self.grid.initialize(&skeleton);

        self.make_base_vorton_grid(vortons);

        for parent in 1..self.grid.depth() {
            self.aggregate_clusters(parent);
        }

        trace!(
            "influence tree built: {} vortons, {} layers, base {}x{}x{}",
            vortons.len(),
            self.grid.depth(),
            skeleton.num_points(0),
            skeleton.num_points(1),
            skeleton.num_points(2),
        );
    }

    /// Drop every layer.
    pub fn clear(&mut self) {
        self.grid.clear();
    }

    /// Number of layers (0 when the tree has not been built).
    pub fn depth(&self) -> usize {
        self.grid.depth()
    }

    pub fn grid(&self) -> &NestedGrid<Vorton> {
        &self.grid
    }

    /// Geometry of the finest layer, or `None` before the first build.
    pub fn base_geometry(&self) -> Option<&UniformGridGeometry> {
        self.grid.layers().first().map(|layer| layer.geometry())
    }

    pub fn margin_factor(&self) -> f64 {
        self.margin_factor
    }

    /// Velocity induced at `position` by the whole population, evaluated
    /// through the tree.
    ///
    /// Starts the descent at the root layer. A tree with a single layer has
    /// no parent to descend from, so its supervortons are summed directly.
    pub fn velocity_at(&self, position: &NVec3) -> NVec3 {
        match self.grid.depth() {
            0 => NVec3::zeros(),
            1 => {
                let mut velocity = NVec3::zeros();
                for supervorton in self.grid[0].contents() {
                    supervorton.accumulate_velocity(&mut velocity, position);
                }
                velocity
            }
            depth => self.compute_velocity(position, &[0, 0, 0], depth - 1),
        }
    }

    /// Recursively accumulate the velocity at `position` from the cluster of
    /// child cells under one parent cell.
    ///
    /// For each child cell of the cluster:
    ///
    /// - **If the query lies inside the cell** (expanded by the margin) and the
    ///   child layer is not the base layer:
    ///   descend and let the cell's own children contribute.
    ///
    /// - **Otherwise**:
    ///   the cell's supervorton stands in for everything below it.
    ///
    /// The margin is `margin_factor * spacing` per axis. On a flat (zero
    /// thickness) z axis it is the smallest positive float instead, so points
    /// lying in the plane still count as inside.
    ///
    /// # Parameters
    /// - `position`      : query point.
    /// - `parent_indices`: cell indices within `parent_layer`.
    /// - `parent_layer`  : layer of the parent cell, at least 1.
    ///
    /// # Returns
    /// The velocity contribution of every vorton under the parent cell.
    pub fn compute_velocity(&self, position: &NVec3, parent_indices: &[usize; 3], parent_layer: usize) -> NVec3 {
        let child_layer = parent_layer - 1;
        let child = &self.grid[child_layer];
        let (start, end) = self.cluster_bounds(parent_indices, parent_layer);

        let spacing = *child.cell_spacing();
        let mut margin = spacing * self.margin_factor;
        if spacing.z == 0.0 {
            margin.z = f64::MIN_POSITIVE;
        }

        let mut velocity = NVec3::zeros();
        for k in start[2]..end[2] {
            for j in start[1]..end[1] {
                for i in start[0]..end[0] {
                    let indices = [i, j, k];
                    let cell_min = child.position_from_indices(&indices);
                    let cell_max = cell_min + spacing;

                    let inside = (0..3).all(|axis| {
                        position[axis] >= cell_min[axis] - margin[axis]
                            && position[axis] < cell_max[axis] + margin[axis]
                    });

                    if parent_layer > 1 && inside {
                        // Too close: open this cell
                        velocity += self.compute_velocity(position, &indices, child_layer);
                    } else {
                        // Far enough away, or already at the base layer
                        let supervorton = &child[child.offset_from_indices(&indices)];
                        supervorton.accumulate_velocity(&mut velocity, position);
                    }
                }
            }
        }
        velocity
    }

    // helpers ==============================================================================

    /// Fill layer 0 with one supervorton per cell.
    ///
    /// Each vorton lands in the cell containing it (clamped, so vortons on the
    /// maximal face join the last cell). The cell accumulates:
    /// - `position * |ω|`, later normalized by the sum of `|ω|`
    /// - the summed vorticity
    /// - the member radius (last one wins; members share a radius in practice)
    ///
    /// The `|ω|` sums start at [`EMPTY_NORM_SUM`], so cells nothing landed in
    /// can be told apart and left alone.
    fn make_base_vorton_grid(&mut self, vortons: &[Vorton]) {
        let base = self.grid.layer_mut(0);

        let mut norm_sum: UniformGrid<f64> = UniformGrid::with_geometry(base.geometry());
        norm_sum.init();
        norm_sum.contents_mut().fill(EMPTY_NORM_SUM);

        for vorton in vortons {
            let offset = base.cell_offset_of_position(&vorton.position);
            let magnitude = vorton.vorticity.norm();

            let cell = &mut base[offset];
            cell.position += vorton.position * magnitude;
            cell.vorticity += vorton.vorticity;
            cell.radius = vorton.radius;
            norm_sum[offset] += magnitude;
        }

        for (cell, &sum) in base.contents_mut().iter_mut().zip(norm_sum.contents()) {
            if sum != EMPTY_NORM_SUM {
                cell.position /= sum;
            }
        }
    }

    /// Aggregate the child layer into `parent_layer`.
    ///
    /// Every parent cell combines the supervortons of its child cluster the
    /// same way the base layer combines vortons. The radius is the last
    /// nonzero child radius, so empty child cells do not shrink it.
    fn aggregate_clusters(&mut self, parent_layer: usize) {
        let parent_cells = {
            let parent = &self.grid[parent_layer];
            [parent.num_cells(0), parent.num_cells(1), parent.num_cells(2)]
        };

        let mut clusters = Vec::with_capacity(parent_cells.iter().product());
        for k in 0..parent_cells[2] {
            for j in 0..parent_cells[1] {
                for i in 0..parent_cells[0] {
                    let indices = [i, j, k];
                    clusters.push((indices, self.cluster_bounds(&indices, parent_layer)));
                }
            }
        }

        let (parent, child) = self.grid.parent_and_child_mut(parent_layer);
        for (parent_indices, (start, end)) in clusters {
            let mut supervorton = Vorton::default();
            let mut norm_sum = EMPTY_NORM_SUM;

            for k in start[2]..end[2] {
                for j in start[1]..end[1] {
                    for i in start[0]..end[0] {
                        let sub = &child[child.offset_from_indices(&[i, j, k])];
                        let magnitude = sub.vorticity.norm();
                        supervorton.position += sub.position * magnitude;
                        supervorton.vorticity += sub.vorticity;
                        if sub.radius != 0.0 {
                            supervorton.radius = sub.radius;
                        }
                        norm_sum += magnitude;
                    }
                }
            }

            if norm_sum != EMPTY_NORM_SUM {
                supervorton.position /= norm_sum;
            }
            let offset = parent.offset_from_indices(&parent_indices);
            parent[offset] = supervorton;
        }
    }

    /// Half-open range of child cell indices under a parent cell.
    ///
    /// The block starts at [`NestedGrid::child_cluster_min_corner_index`] and
    /// spans the layer's decimation. The last parent cell along an axis also
    /// takes any leftover child cells, so no child cell is orphaned when the
    /// child count does not divide evenly.
    fn cluster_bounds(&self, parent_indices: &[usize; 3], parent_layer: usize) -> ([usize; 3], [usize; 3]) {
        let parent = &self.grid[parent_layer];
        let child = &self.grid[parent_layer - 1];
        let decimations = self.grid.decimations(parent_layer);
        let start = NestedGrid::<Vorton>::child_cluster_min_corner_index(parent_indices, decimations);

        let mut end = [0; 3];
        for axis in 0..3 {
            end[axis] = if parent_indices[axis] + 1 >= parent.num_cells(axis) {
                child.num_cells(axis)
            } else {
                start[axis] + decimations[axis]
            };
        }
        (start, end)
    }
}

impl Default for InfluenceTree {
    fn default() -> Self {
        Self::new(0.0001)
    }
}

/// Reference velocity at `position`: the exact sum over every vorton.
pub fn compute_velocity_brute_force(vortons: &[Vorton], position: &NVec3) -> NVec3 {
    let mut velocity = NVec3::zeros();
    for vorton in vortons {
        vorton.accumulate_velocity(&mut velocity, position);
    }
    velocity
}
