//! Optional intensity rescaling, applied after the fill pass whenever
//! the header's scale slope is nonzero (zero means "no rescale" by
//! format convention).
//!
//! Narrow integer kinds widen to doubles and 64-bit integer kinds
//! widen to arbitrary-precision decimals, both into freshly allocated
//! grids; floating, complex and decimal kinds are transformed keeping
//! their element kind. Color kinds are never rescaled. For complex
//! kinds the intercept lands on both components, real and imaginary.

use crate::volume::VoxelGrid;
use bigdecimal::BigDecimal;
use ndarray::ArrayD;
use num_complex::Complex;
use num_traits::FromPrimitive;

/// Apply the slope/intercept transform to a grid, possibly changing
/// its element kind. A zero slope returns the input unchanged.
pub fn rescale(grid: VoxelGrid, slope: f64, intercept: f64) -> VoxelGrid {
    if slope == 0.0 {
        return grid;
    }
    match grid {
        VoxelGrid::Bit(a) => VoxelGrid::Float64(widen(&a, slope, intercept, f64::from)),
        VoxelGrid::Uint8(a) => VoxelGrid::Float64(widen(&a, slope, intercept, f64::from)),
        VoxelGrid::Int8(a) => VoxelGrid::Float64(widen(&a, slope, intercept, f64::from)),
        VoxelGrid::Uint16(a) => VoxelGrid::Float64(widen(&a, slope, intercept, f64::from)),
        VoxelGrid::Int16(a) => VoxelGrid::Float64(widen(&a, slope, intercept, f64::from)),
        VoxelGrid::Uint32(a) => VoxelGrid::Float64(widen(&a, slope, intercept, f64::from)),
        VoxelGrid::Int32(a) => VoxelGrid::Float64(widen(&a, slope, intercept, f64::from)),
        VoxelGrid::Uint64(a) => {
            VoxelGrid::HighPrecision(widen_decimal(&a, slope, intercept, BigDecimal::from))
        }
        VoxelGrid::Int64(a) => {
            VoxelGrid::HighPrecision(widen_decimal(&a, slope, intercept, BigDecimal::from))
        }
        VoxelGrid::Float32(a) => {
            VoxelGrid::Float32(a.mapv_into(|v| (f64::from(v) * slope + intercept) as f32))
        }
        VoxelGrid::Float64(a) => VoxelGrid::Float64(a.mapv_into(|v| v * slope + intercept)),
        VoxelGrid::Complex64(a) => VoxelGrid::Complex64(a.mapv_into(|v| {
            Complex::new(
                (f64::from(v.re) * slope + intercept) as f32,
                (f64::from(v.im) * slope + intercept) as f32,
            )
        })),
        VoxelGrid::Complex128(a) => VoxelGrid::Complex128(
            a.mapv_into(|v| Complex::new(v.re * slope + intercept, v.im * slope + intercept)),
        ),
        VoxelGrid::Float128(a) => {
            let (slope, intercept) = decimal_params(slope, intercept);
            VoxelGrid::Float128(a.mapv_into(|v| v * &slope + &intercept))
        }
        VoxelGrid::Complex256(a) => {
            let (slope, intercept) = decimal_params(slope, intercept);
            VoxelGrid::Complex256(a.mapv_into(|v| {
                Complex::new(v.re * &slope + &intercept, v.im * &slope + &intercept)
            }))
        }
        VoxelGrid::HighPrecision(a) => {
            let (slope, intercept) = decimal_params(slope, intercept);
            VoxelGrid::HighPrecision(a.mapv_into(|v| v * &slope + &intercept))
        }
        // color data is never rescaled
        g @ VoxelGrid::Rgb24(_) | g @ VoxelGrid::Rgba32(_) => g,
    }
}

fn widen<T: Clone>(
    a: &ArrayD<T>,
    slope: f64,
    intercept: f64,
    to_f64: impl Fn(T) -> f64,
) -> ArrayD<f64> {
    a.mapv(|v| to_f64(v) * slope + intercept)
}

fn widen_decimal<T: Clone>(
    a: &ArrayD<T>,
    slope: f64,
    intercept: f64,
    to_decimal: impl Fn(T) -> BigDecimal,
) -> ArrayD<BigDecimal> {
    let (slope, intercept) = decimal_params(slope, intercept);
    a.mapv(|v| to_decimal(v) * &slope + &intercept)
}

fn decimal_params(slope: f64, intercept: f64) -> (BigDecimal, BigDecimal) {
    (
        BigDecimal::from_f64(slope).unwrap_or_default(),
        BigDecimal::from_f64(intercept).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::rescale;
    use crate::volume::VoxelGrid;
    use approx::assert_abs_diff_eq;
    use bigdecimal::BigDecimal;
    use ndarray::arr1;
    use num_complex::Complex;
    use rgb::RGB8;

    #[test]
    fn zero_slope_disables_rescaling() {
        let grid = VoxelGrid::Uint8(arr1(&[1u8, 2, 3]).into_dyn());
        let out = rescale(grid.clone(), 0.0, 100.0);
        assert_eq!(out, grid);
    }

    #[test]
    fn narrow_integers_widen_to_doubles() {
        let grid = VoxelGrid::Uint8(arr1(&[0u8, 100, 200]).into_dyn());
        match rescale(grid, 2.0, -1024.0) {
            VoxelGrid::Float64(a) => {
                let values: Vec<f64> = a.iter().cloned().collect();
                assert_abs_diff_eq!(values[0], -1024.0);
                assert_abs_diff_eq!(values[1], -824.0);
                assert_abs_diff_eq!(values[2], -624.0);
            }
            g => panic!("unexpected grid kind {:?}", g.kind()),
        }
    }

    #[test]
    fn wide_integers_widen_to_decimals() {
        // this value is not representable as an f64
        let v: i64 = (1 << 60) + 1;
        let grid = VoxelGrid::Int64(arr1(&[v]).into_dyn());
        match rescale(grid, 1.0, 1.0) {
            VoxelGrid::HighPrecision(a) => {
                assert_eq!(a[&[0][..]], BigDecimal::from(v + 1));
            }
            g => panic!("unexpected grid kind {:?}", g.kind()),
        }
    }

    #[test]
    fn floats_keep_their_kind() {
        let grid = VoxelGrid::Float32(arr1(&[1.0f32, 2.0]).into_dyn());
        match rescale(grid, 0.5, 1.0) {
            VoxelGrid::Float32(a) => {
                let values: Vec<f32> = a.iter().cloned().collect();
                assert_abs_diff_eq!(values[0], 1.5f32);
                assert_abs_diff_eq!(values[1], 2.0f32);
            }
            g => panic!("unexpected grid kind {:?}", g.kind()),
        }
    }

    #[test]
    fn complex_intercept_lands_on_both_components() {
        let grid = VoxelGrid::Complex128(arr1(&[Complex::new(1.0, 2.0)]).into_dyn());
        match rescale(grid, 2.0, 10.0) {
            VoxelGrid::Complex128(a) => {
                let v = a[&[0][..]];
                assert_abs_diff_eq!(v.re, 12.0);
                assert_abs_diff_eq!(v.im, 14.0);
            }
            g => panic!("unexpected grid kind {:?}", g.kind()),
        }
    }

    #[test]
    fn color_rescale_is_identity() {
        let grid = VoxelGrid::Rgb24(arr1(&[RGB8::new(1, 2, 3)]).into_dyn());
        let out = rescale(grid.clone(), 3.0, 4.0);
        assert_eq!(out, grid);
    }
}
