use approx::{assert_abs_diff_eq, assert_relative_eq};

use vortsim::grid::grid_math::{compute_curl_from_jacobian, compute_jacobian};
use vortsim::{NMat3, NVec3, NestedGrid, UniformGrid, UniformGridGeometry};

/// Unit cube grid holding about `n` cells
pub fn unit_grid<T: vortsim::GridElement>(n: usize) -> UniformGrid<T> {
    let mut grid = UniformGrid::new();
    grid.define_shape(n, NVec3::zeros(), NVec3::new(1.0, 1.0, 1.0), false);
    grid.init();
    grid
}

/// Fill a vector grid with `v(x) = a * x + b`
pub fn linear_field(a: &NMat3, b: &NVec3, n: usize) -> UniformGrid<NVec3> {
    let mut grid: UniformGrid<NVec3> = unit_grid(n);
    for offset in 0..grid.size() {
        let x = grid.position_from_offset(offset);
        grid[offset] = a * x + b;
    }
    grid
}

// ==================================================================================
// Geometry tests
// ==================================================================================

#[test]
fn shape_holds_at_least_one_cell_and_fewer_than_8n() {
    let boxes = [
        (NVec3::new(0.0, 0.0, 0.0), NVec3::new(1.0, 1.0, 1.0)),
        (NVec3::new(-5.0, -1.0, 0.0), NVec3::new(5.0, 1.0, 0.1)),
        (NVec3::new(0.0, 0.0, 0.0), NVec3::new(3.0, 2.0, 0.0)), // flat
        (NVec3::new(1.0, 1.0, 1.0), NVec3::new(1.0, 1.0, 1.0)), // a single point
    ];

    for (min, max) in boxes {
        for n in [0, 1, 7, 64, 1000, 4097] {
            for power_of_two in [false, true] {
                let g = UniformGridGeometry::new(n, min, max, power_of_two);
                for axis in 0..3 {
                    assert!(g.num_cells(axis) >= 1, "axis {axis} has no cells for n = {n}");
                }
                assert!(
                    g.total_cells() < 8 * n.max(1),
                    "{} cells is too many for n = {n}",
                    g.total_cells()
                );
            }
        }
    }
}

#[test]
fn very_thin_slab_keeps_cell_counts_bounded() {
    let min = NVec3::zeros();
    let max = NVec3::new(1.0, 1.0, 1e-30);

    for n in [1, 100, 4096] {
        for power_of_two in [false, true] {
            let g = UniformGridGeometry::new(n, min, max, power_of_two);
            for axis in 0..3 {
                assert!(g.num_cells(axis) >= 1);
                assert!(g.num_cells(axis) <= 8 * n);
            }
            assert!(g.total_cells() < 8 * n, "{} cells for n = {n}", g.total_cells());
        }
    }
}

#[test]
fn power_of_two_shapes_have_power_of_two_cells() {
    let g = UniformGridGeometry::new(1000, NVec3::zeros(), NVec3::new(4.0, 2.0, 1.0), true);
    for axis in 0..3 {
        assert!(g.num_cells(axis).is_power_of_two());
    }
}

#[test]
fn degenerate_axis_uses_sentinel_spacing() {
    let g = UniformGridGeometry::new(64, NVec3::zeros(), NVec3::new(2.0, 2.0, 0.0), false);
    assert_eq!(g.extent().z, 0.0);
    assert_eq!(g.num_cells(2), 1);
    assert_eq!(g.cells_per_extent().z, vortsim::grid::geometry::DEGENERATE_CELLS_PER_EXTENT);
    assert!(g.cells_per_extent().z.is_finite());
    assert_relative_eq!(g.effective_volume(), 4.0, max_relative = 1e-12);
}

#[test]
fn offsets_and_indices_round_trip() {
    let g = UniformGridGeometry::new(200, NVec3::new(-1.0, 0.0, 2.0), NVec3::new(3.0, 1.0, 4.0), false);
    for offset in 0..g.grid_capacity() {
        let indices = g.indices_from_offset(offset);
        assert_eq!(g.offset_from_indices(&indices), offset);
    }
}

#[test]
fn positions_on_the_max_face_stay_in_the_last_cell() {
    let min = NVec3::zeros();
    let max = NVec3::new(1.0, 1.0, 1.0);
    let g = UniformGridGeometry::new(64, min, max, true);
    let indices = g.cell_indices_of_position(&g.max_corner());
    for axis in 0..3 {
        assert_eq!(indices[axis], g.num_cells(axis) - 1);
    }
}

#[test]
fn decimate_keeps_two_points_per_axis() {
    let src = UniformGridGeometry::new(64, NVec3::zeros(), NVec3::new(8.0, 8.0, 1.0), true);
    assert_eq!(src.num_cells(2), 1);

    let dec = UniformGridGeometry::decimated(&src, 2);
    assert_eq!(dec.num_cells(0), src.num_cells(0) / 2);
    assert_eq!(dec.num_points(2), 2, "a populated axis must not collapse to a point");
    assert_eq!(dec.min_corner(), src.min_corner());
    assert_eq!(dec.extent(), src.extent());

    let same = UniformGridGeometry::decimated(&src, 1);
    assert_eq!(same, src);
}

// ==================================================================================
// Uniform grid tests
// ==================================================================================

#[test]
fn insert_then_interpolate_at_a_grid_point() {
    let mut grid: UniformGrid<f64> = unit_grid(125);
    let p = grid.position_from_indices(&[2, 3, 1]);
    grid.insert(&p, 1.0);

    let total: f64 = grid.contents().iter().sum();
    assert_relative_eq!(total, 1.0, max_relative = 1e-12);
    assert_abs_diff_eq!(grid.interpolate(&p), 1.0, epsilon = 1e-9);
}

#[test]
fn insert_weights_always_sum_to_one() {
    let mut grid: UniformGrid<f64> = unit_grid(64);
    let samples = [
        NVec3::new(0.13, 0.77, 0.41),
        NVec3::new(0.5, 0.5, 0.5),
        NVec3::new(0.99, 0.01, 0.63),
        NVec3::new(1.0, 1.0, 1.0),
    ];
    for p in &samples {
        grid.insert(p, 2.0);
    }
    let total: f64 = grid.contents().iter().sum();
    assert_relative_eq!(total, 2.0 * samples.len() as f64, max_relative = 1e-12);
}

#[test]
fn interpolation_reproduces_linear_fields() {
    let a = NMat3::new(1.0, 2.0, 0.5, -1.0, 0.0, 3.0, 0.25, -2.0, 1.5);
    let b = NVec3::new(0.1, -0.2, 0.3);
    let grid = linear_field(&a, &b, 512);

    for p in [
        NVec3::new(0.13, 0.77, 0.41),
        NVec3::new(0.5, 0.25, 0.875),
        NVec3::new(0.999, 0.001, 0.6),
    ] {
        let expected = a * p + b;
        assert_relative_eq!(grid.interpolate(&p), expected, epsilon = 1e-9);
    }
}

#[test]
fn statistics_report_componentwise_extremes() {
    let mut grid: UniformGrid<NVec3> = unit_grid(8);
    assert!(grid.size() > 3);
    grid[0] = NVec3::new(-1.0, 5.0, 0.0);
    grid[1] = NVec3::new(2.0, -3.0, 0.0);
    grid[2] = NVec3::new(0.5, 0.5, 7.0);

    let (min, max) = grid.compute_statistics().expect("grid has contents");
    assert_eq!(min, NVec3::new(-1.0, -3.0, 0.0));
    assert_eq!(max, NVec3::new(2.0, 5.0, 7.0));

    let empty: UniformGrid<NVec3> = UniformGrid::new();
    assert!(empty.compute_statistics().is_none());
}

// ==================================================================================
// Nested grid tests
// ==================================================================================

#[test]
fn nested_grid_halves_until_one_cell() {
    let seed = UniformGridGeometry::new(4096, NVec3::zeros(), NVec3::new(1.0, 1.0, 1.0), true);
    assert_eq!(seed.num_cells(0), 16);

    let mut nested: NestedGrid<f64> = NestedGrid::new();
    nested.initialize(&seed);

    assert_eq!(nested.depth(), 5);
    assert_eq!(nested[0].geometry(), &seed);
    assert!(nested[nested.depth() - 1].grid_capacity() <= 8);

    for parent in 1..nested.depth() {
        let child = &nested[parent - 1];
        let par = &nested[parent];
        for axis in 0..3 {
            assert_eq!(par.num_cells(axis), (child.num_cells(axis) / 2).max(1));
            assert_eq!(nested.decimations(parent)[axis], 2);
        }
        assert_eq!(par.size(), par.grid_capacity());
    }
    assert_eq!(nested.decimations(0), &[0, 0, 0]);
}

#[test]
fn nested_grid_of_a_single_cell_has_one_layer() {
    let seed = UniformGridGeometry::new(1, NVec3::zeros(), NVec3::new(1.0, 1.0, 1.0), true);
    let mut nested: NestedGrid<f64> = NestedGrid::new();
    nested.initialize(&seed);
    assert_eq!(nested.depth(), 1);
}

#[test]
fn child_cluster_corner_scales_by_decimation() {
    let corner = NestedGrid::<f64>::child_cluster_min_corner_index(&[1, 2, 3], &[2, 2, 1]);
    assert_eq!(corner, [2, 4, 3]);
}

// ==================================================================================
// Grid math tests
// ==================================================================================

#[test]
fn jacobian_of_linear_field_is_its_matrix() {
    let a = NMat3::new(1.0, 2.0, 0.5, -1.0, 0.0, 3.0, 0.25, -2.0, 1.5);
    let grid = linear_field(&a, &NVec3::new(1.0, 1.0, 1.0), 216);

    let mut jacobian: UniformGrid<NMat3> = UniformGrid::new();
    compute_jacobian(&mut jacobian, &grid);

    assert_eq!(jacobian.size(), grid.size());
    // Interior, faces, edges and corners alike: differences are exact for linear fields
    for j in jacobian.contents() {
        assert_relative_eq!(*j, a, epsilon = 1e-9);
    }
}

#[test]
fn curl_of_rigid_rotation_is_twice_the_rate() {
    // v = (-y, x, 0)
    let a = NMat3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    let grid = linear_field(&a, &NVec3::zeros(), 125);

    let mut jacobian: UniformGrid<NMat3> = UniformGrid::new();
    compute_jacobian(&mut jacobian, &grid);
    let mut curl: UniformGrid<NVec3> = UniformGrid::new();
    compute_curl_from_jacobian(&mut curl, &jacobian);

    for c in curl.contents() {
        assert_relative_eq!(*c, NVec3::new(0.0, 0.0, 2.0), epsilon = 1e-9);
    }
}
