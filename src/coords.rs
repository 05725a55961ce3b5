//! Derivation of the physical coordinate space of a dataset from the
//! header's affine parameters.
//!
//! When the rank is 2 or 3 and the corresponding affine submatrix
//! departs from identity, the full (6- or 12-parameter) affine is
//! attached; otherwise the mapping is diagonal, scaling each axis by
//! its grid spacing and shifting the time axis by `toffset`. The
//! departs-from-identity tests are exact comparisons, so an all-zero
//! affine also selects the affine branch.

use crate::header::NiftiHeader;

/// A mapping from grid indices to physical coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateSpace {
    /// Independent per-axis scale and offset.
    Linear {
        /// Per-axis scale factors (the grid spacings).
        scales: Vec<f64>,
        /// Per-axis offsets; zero everywhere except a time axis.
        offsets: Vec<f64>,
    },
    /// A 2-D affine transform: `[sx, x1, x3, y0, sy, y3]`, row-major
    /// with the translation last in each row.
    Affine2d([f64; 6]),
    /// A 3-D affine transform: the full 3x4 matrix, row-major.
    Affine3d([f64; 12]),
}

impl CoordinateSpace {
    /// Map a grid index to physical coordinates.
    pub fn project(&self, index: &[f64]) -> Vec<f64> {
        match self {
            CoordinateSpace::Linear { scales, offsets } => index
                .iter()
                .zip(scales.iter().zip(offsets.iter()))
                .map(|(x, (s, o))| x * s + o)
                .collect(),
            CoordinateSpace::Affine2d(m) => {
                let (x, y) = (index[0], index[1]);
                vec![m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5]]
            }
            CoordinateSpace::Affine3d(m) => {
                let (x, y, z) = (index[0], index[1], index[2]);
                vec![
                    m[0] * x + m[1] * y + m[2] * z + m[3],
                    m[4] * x + m[5] * y + m[6] * z + m[7],
                    m[8] * x + m[9] * y + m[10] * z + m[11],
                ]
            }
        }
    }
}

/// Build the coordinate space for a decoded dataset.
pub(crate) fn build(header: &NiftiHeader) -> CoordinateSpace {
    let [sx, x1, x2, x3] = header.srow_x;
    let [y0, sy, y2, y3] = header.srow_y;
    let [z0, z1, sz, z3] = header.srow_z;
    let rank = header.rank();

    if rank == 2 && (sx != 1. || x1 != 0. || x3 != 0. || y0 != 0. || sy != 1. || y3 != 0.) {
        CoordinateSpace::Affine2d([sx, x1, x3, y0, sy, y3])
    } else if rank == 3
        && (sx != 1.
            || x1 != 0.
            || x2 != 0.
            || x3 != 0.
            || y0 != 0.
            || sy != 1.
            || y2 != 0.
            || y3 != 0.
            || z0 != 0.
            || z1 != 0.
            || sz != 1.
            || z3 != 0.)
    {
        CoordinateSpace::Affine3d([sx, x1, x2, x3, y0, sy, y2, y3, z0, z1, sz, z3])
    } else {
        let scales = header.spacings().to_vec();
        let mut offsets = vec![0.0; rank];
        if rank > 3 {
            offsets[3] = header.toffset;
        }
        CoordinateSpace::Linear { scales, offsets }
    }
}
