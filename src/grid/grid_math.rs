//! Differential operators over uniform grids of vectors.
//!
//! - [`compute_jacobian`]: velocity gradient, used by vortex stretching
//! - [`compute_curl_from_jacobian`]: curl of a field from its Jacobian

use crate::grid::uniform_grid::UniformGrid;
use crate::simulation::states::{NMat3, NVec3};

/// Compute the Jacobian of a vector field.
///
/// `jacobian` is reshaped to match `vec`. Entry `J[(b, a)]` holds
/// `d v_b / d a`, so column `a` is the derivative of the whole vector along
/// axis `a` and `J * w` gives the directional derivative `(w . grad) v`.
///
/// Interior points use central differences; points on the domain faces,
/// edges and corners use one-sided differences along the axes where a
/// neighbour is missing. Axes with zero spacing (planar domains) get a zero
/// derivative.
pub fn compute_jacobian(jacobian: &mut UniformGrid<NMat3>, vec: &UniformGrid<NVec3>) {
    jacobian.copy_shape(vec.geometry());
    jacobian.init();

    let spacing = vec.cell_spacing();
    let mut reciprocal = NVec3::zeros();
    for axis in 0..3 {
        if spacing[axis] > f64::EPSILON {
            reciprocal[axis] = 1.0 / spacing[axis];
        }
    }

    let dims = [vec.num_points(0), vec.num_points(1), vec.num_points(2)];
    let strides = [1, dims[0], dims[0] * dims[1]];

    for k in 0..dims[2] {
        for j in 0..dims[1] {
            for i in 0..dims[0] {
                let index = [i, j, k];
                let offset = i + strides[1] * j + strides[2] * k;

                let mut columns = [NVec3::zeros(); 3];
                for axis in 0..3 {
                    let last = dims[axis] - 1;
                    let stride = strides[axis];
                    columns[axis] = if last == 0 {
                        NVec3::zeros()
                    } else if index[axis] == 0 {
                        (vec[offset + stride] - vec[offset]) * reciprocal[axis]
                    } else if index[axis] == last {
                        (vec[offset] - vec[offset - stride]) * reciprocal[axis]
                    } else {
                        (vec[offset + stride] - vec[offset - stride]) * (0.5 * reciprocal[axis])
                    };
                }

                jacobian[offset] = NMat3::from_columns(&columns);
            }
        }
    }
}

/// Compute the curl of a vector field from its Jacobian.
///
/// `curl = (dvz/dy - dvy/dz, dvx/dz - dvz/dx, dvy/dx - dvx/dy)`.
pub fn compute_curl_from_jacobian(curl: &mut UniformGrid<NVec3>, jacobian: &UniformGrid<NMat3>) {
    curl.copy_shape(jacobian.geometry());
    curl.init();

    for (out, j) in curl.contents_mut().iter_mut().zip(jacobian.contents()) {
        *out = NVec3::new(
            j[(2, 1)] - j[(1, 2)],
            j[(0, 2)] - j[(2, 0)],
            j[(1, 0)] - j[(0, 1)],
        );
    }
}
