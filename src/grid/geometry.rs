//! # Uniform grid geometry
//!
//! Shape of a regular lattice over an axis-aligned box. The geometry stores
//! no contents; [`UniformGrid`](crate::grid::uniform_grid::UniformGrid) adds
//! a per-point array on top of it.
//!
//! ## Layout
//!
//! - The minimal corner point sits at indices `{0,0,0}` and the maximal
//!   corner at `{Nx-1, Ny-1, Nz-1}`, where `N` is the number of **points**
//!   along each axis.
//! - A cell is the box spanned by 8 neighbouring points, so there are
//!   `N-1` cells along each axis and every axis has at least 2 points.
//! - Contents are addressed by a flat offset `i + Nx * (j + Ny * k)`.
//!
//! ## Degenerate axes
//!
//! An axis whose extent is exactly zero (e.g. z for a planar domain) is
//! treated as having a single cell of zero size. Its reciprocal spacing is
//! replaced by a huge sentinel instead of dividing by zero.

use crate::simulation::states::NVec3;

/// Multiplicative nudge applied to the requested extent so that points on
/// the maximal face still land inside the last cell.
const EXTENT_NUDGE: f64 = 1.0 + f64::EPSILON;

/// Reciprocal cell size used for axes with zero extent.
pub const DEGENERATE_CELLS_PER_EXTENT: f64 = 1.0 / f64::MIN_POSITIVE;

/// Shape of a uniform grid: bounds, point counts and spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformGridGeometry {
    min_corner: NVec3,
    extent: NVec3,
    cell_extent: NVec3,
    cells_per_extent: NVec3,
    num_points: [usize; 3],
}

impl Default for UniformGridGeometry {
    fn default() -> Self {
        Self {
            min_corner: NVec3::zeros(),
            extent: NVec3::zeros(),
            cell_extent: NVec3::zeros(),
            cells_per_extent: NVec3::zeros(),
            num_points: [0; 3],
        }
    }
}

impl UniformGridGeometry {
    /// Build a geometry that fits `num_elements` items into the box `[min, max]`.
    ///
    /// See [`UniformGridGeometry::define_shape`].
    pub fn new(num_elements: usize, min: NVec3, max: NVec3, power_of_two: bool) -> Self {
        let mut geometry = Self::default();
        geometry.define_shape(num_elements, min, max, power_of_two);
        geometry
    }

    /// Build a geometry by decimating the cell counts of `src` by `decimation`.
    pub fn decimated(src: &UniformGridGeometry, decimation: usize) -> Self {
        let mut geometry = Self::default();
        geometry.decimate(src, decimation);
        geometry
    }

    /// Define the shape so that the grid holds roughly `num_elements` cells.
    ///
    /// Cells are chosen to be as close to cubes as the box allows. Axes with
    /// zero extent reduce the dimensionality of the region, so a box of size
    /// `(2, 3, 0)` is treated as a 2D area.
    ///
    /// The procedure:
    /// 1. Expand the extent by `1 + ε` for robust containment.
    /// 2. Count non-degenerate axes and compute the region volume (or area,
    ///    or length) over those axes.
    /// 3. Size each axis as `round(extent * (volume / n)^(-1/dims))`, at least 1
    ///    and at most `8n`, so very thin boxes cannot overflow the count.
    /// 4. Optionally round each axis up to a power of two, which makes clean
    ///    halving possible in a [`NestedGrid`](crate::grid::nested_grid::NestedGrid).
    /// 5. Halve all axes while the total cell count is `>= 8n`.
    ///
    /// # Parameters
    /// - `num_elements`: number of items the grid should hold. `0` is treated as `1`.
    /// - `min`, `max`  : corners of the axis-aligned bounding box.
    /// - `power_of_two`: whether to round cell counts up to powers of two.
    pub fn define_shape(&mut self, num_elements: usize, min: NVec3, max: NVec3, power_of_two: bool) {
        let num_elements = num_elements.max(1);
        self.min_corner = min;
        self.extent = (max - min) * EXTENT_NUDGE;

        let mut size_effective = self.extent;
        let mut num_dims = 3i32;
        for axis in 0..3 {
            if size_effective[axis] == 0.0 {
                // Degenerate axis contributes nothing to the region volume
                size_effective[axis] = 1.0;
                self.extent[axis] = 0.0;
                num_dims -= 1;
            }
        }

        // No axis may need more cells than the whole grid is allowed
        let max_cells = num_elements.saturating_mul(8);

        let mut num_cells = [1usize; 3];
        if num_dims > 0 {
            let volume = size_effective.x * size_effective.y * size_effective.z;
            let cell_volume_cube_root = (volume / num_elements as f64).powf(-1.0 / num_dims as f64);
            for axis in 0..3 {
                let cells = (self.extent[axis] * cell_volume_cube_root + 0.5).min(max_cells as f64);
                num_cells[axis] = (cells as usize).clamp(1, max_cells);
            }
        }

        if power_of_two {
            for cells in num_cells.iter_mut() {
                *cells = cells.next_power_of_two();
            }
        }

        // Power-of-two rounding (or sub-unit trial sizes) can overshoot badly
        while num_cells[0].saturating_mul(num_cells[1]).saturating_mul(num_cells[2]) >= max_cells {
            for cells in num_cells.iter_mut() {
                *cells = (*cells / 2).max(1);
            }
        }

        for axis in 0..3 {
            self.num_points[axis] = num_cells[axis] + 1;
        }

        self.precompute_spacing();
    }

    /// Derive a lower-resolution shape from `src`.
    ///
    /// The number of **cells** along each axis is divided by `decimation`.
    /// When `decimation > 1` every axis keeps at least 2 points, so a populated
    /// axis never collapses to a single point.
    pub fn decimate(&mut self, src: &UniformGridGeometry, decimation: usize) {
        let decimation = decimation.max(1);
        self.extent = src.extent;
        self.min_corner = src.min_corner;
        for axis in 0..3 {
            self.num_points[axis] = src.num_cells(axis) / decimation + 1;
            if decimation > 1 {
                self.num_points[axis] = self.num_points[axis].max(2);
            }
        }
        self.precompute_spacing();
    }

    /// Reset to an empty shape.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn precompute_spacing(&mut self) {
        for axis in 0..3 {
            let cells = self.num_cells(axis) as f64;
            if cells == 0.0 {
                self.cell_extent[axis] = 0.0;
                self.cells_per_extent[axis] = 0.0;
                continue;
            }
            self.cell_extent[axis] = self.extent[axis] / cells;
            self.cells_per_extent[axis] = if self.extent[axis] == 0.0 {
                DEGENERATE_CELLS_PER_EXTENT
            } else {
                cells / self.extent[axis]
            };
        }
    }

    // index conversions ===================================================================

    /// Indices of the grid point at the minimal corner of the cell containing `position`.
    ///
    /// No clamping: `position` must lie inside the grid region.
    #[inline]
    pub fn indices_of_position(&self, position: &NVec3) -> [usize; 3] {
        let rel = position - self.min_corner;
        [
            (rel.x * self.cells_per_extent.x) as usize,
            (rel.y * self.cells_per_extent.y) as usize,
            (rel.z * self.cells_per_extent.z) as usize,
        ]
    }

    /// Like [`indices_of_position`](Self::indices_of_position) but clamped to the last cell
    /// along each axis, so the 8 corners of the result always exist.
    #[inline]
    pub fn cell_indices_of_position(&self, position: &NVec3) -> [usize; 3] {
        let mut indices = self.indices_of_position(position);
        for axis in 0..3 {
            indices[axis] = indices[axis].min(self.num_cells(axis).saturating_sub(1));
        }
        indices
    }

    /// Offset into the contents array of the point at the minimal corner of
    /// the cell containing `position`.
    #[inline]
    pub fn offset_of_position(&self, position: &NVec3) -> usize {
        self.offset_from_indices(&self.indices_of_position(position))
    }

    /// Offset of the cell containing `position`, clamped to the grid's cells.
    #[inline]
    pub fn cell_offset_of_position(&self, position: &NVec3) -> usize {
        self.offset_from_indices(&self.cell_indices_of_position(position))
    }

    #[inline]
    pub fn offset_from_indices(&self, indices: &[usize; 3]) -> usize {
        indices[0] + self.num_points[0] * (indices[1] + self.num_points[1] * indices[2])
    }

    #[inline]
    pub fn indices_from_offset(&self, offset: usize) -> [usize; 3] {
        let num_xy = self.num_points[0] * self.num_points[1];
        let k = offset / num_xy;
        let j = (offset - k * num_xy) / self.num_points[0];
        let i = offset - self.num_points[0] * (j + self.num_points[1] * k);
        [i, j, k]
    }

    /// World position of the grid point with the given indices.
    #[inline]
    pub fn position_from_indices(&self, indices: &[usize; 3]) -> NVec3 {
        NVec3::new(
            self.min_corner.x + indices[0] as f64 * self.cell_extent.x,
            self.min_corner.y + indices[1] as f64 * self.cell_extent.y,
            self.min_corner.z + indices[2] as f64 * self.cell_extent.z,
        )
    }

    #[inline]
    pub fn position_from_offset(&self, offset: usize) -> NVec3 {
        self.position_from_indices(&self.indices_from_offset(offset))
    }

    // accessors ===========================================================================

    pub fn min_corner(&self) -> &NVec3 {
        &self.min_corner
    }

    pub fn max_corner(&self) -> NVec3 {
        self.min_corner + self.extent
    }

    pub fn extent(&self) -> &NVec3 {
        &self.extent
    }

    pub fn cell_spacing(&self) -> &NVec3 {
        &self.cell_extent
    }

    pub fn cells_per_extent(&self) -> &NVec3 {
        &self.cells_per_extent
    }

    /// Number of grid points along `axis`.
    #[inline]
    pub fn num_points(&self, axis: usize) -> usize {
        self.num_points[axis]
    }

    /// Number of grid cells along `axis`.
    #[inline]
    pub fn num_cells(&self, axis: usize) -> usize {
        self.num_points[axis].saturating_sub(1)
    }

    /// Total number of grid points.
    pub fn grid_capacity(&self) -> usize {
        self.num_points[0] * self.num_points[1] * self.num_points[2]
    }

    /// Total number of grid cells.
    pub fn total_cells(&self) -> usize {
        self.num_cells(0) * self.num_cells(1) * self.num_cells(2)
    }

    /// True when any axis has zero extent, i.e. the region is 2D or lower.
    pub fn is_degenerate(&self) -> bool {
        self.extent.iter().any(|&e| e == 0.0)
    }

    /// Volume (or area, or length) over the non-degenerate axes.
    pub fn effective_volume(&self) -> f64 {
        self.extent.iter().filter(|&&e| e != 0.0).product()
    }
}
