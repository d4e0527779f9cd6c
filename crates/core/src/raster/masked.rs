//! Rasters carrying an explicit observation mask

use crate::error::Result;
use crate::raster::{GridShape, Raster, RasterElement};
use ndarray::{Array2, Zip};

/// A floating point raster paired with a per-pixel "observed" flag.
///
/// Sensor fill values and space pixels are represented by `observed == false`
/// instead of sentinel values. Arithmetic propagates the flag: the result of
/// an operation on two masked rasters is unobserved wherever either operand
/// is unobserved. Values under an unobserved flag are always NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedRaster {
    values: Raster<f64>,
    observed: Array2<bool>,
}

impl MaskedRaster {
    /// Pair values with an observation mask of the same shape.
    pub fn new(values: Raster<f64>, observed: Array2<bool>) -> Result<Self> {
        values.grid_shape().check("observation mask", observed.dim())?;
        Ok(Self::normalized(values.into_array(), observed))
    }

    /// Treat NaN and the raster's no-data value as unobserved.
    pub fn from_raster(values: Raster<f64>) -> Self {
        let observed = values.data().mapv(|v| !v.is_nodata(values.nodata()));
        Self::normalized(values.into_array(), observed)
    }

    /// Treat NaN and `fill_value` as unobserved.
    pub fn with_fill_value(values: Raster<f64>, fill_value: f64) -> Self {
        let observed = values
            .data()
            .mapv(|v| !v.is_nan() && v != fill_value);
        Self::normalized(values.into_array(), observed)
    }

    /// Every pixel observed (NaN still counts as unobserved).
    pub fn fully_observed(values: Raster<f64>) -> Self {
        let observed = values.data().mapv(|v| !v.is_nan());
        Self::normalized(values.into_array(), observed)
    }

    /// Constant-valued raster, fully observed.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self::fully_observed(Raster::filled(rows, cols, value))
    }

    fn normalized(mut values: Array2<f64>, observed: Array2<bool>) -> Self {
        Zip::from(&mut values).and(&observed).for_each(|v, &obs| {
            if !obs {
                *v = f64::NAN;
            }
        });
        let mut values = Raster::from_array(values);
        values.set_nodata(Some(f64::NAN));
        Self { values, observed }
    }

    pub fn rows(&self) -> usize {
        self.values.rows()
    }

    pub fn cols(&self) -> usize {
        self.values.cols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    pub fn grid_shape(&self) -> GridShape {
        self.values.grid_shape()
    }

    /// Values; unobserved pixels hold NaN.
    pub fn values(&self) -> &Raster<f64> {
        &self.values
    }

    pub fn observed(&self) -> &Array2<bool> {
        &self.observed
    }

    /// Value at (row, col), `None` if unobserved or out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        match self.observed.get((row, col)) {
            Some(true) => self.values.get(row, col).ok(),
            _ => None,
        }
    }

    pub fn is_observed(&self, row: usize, col: usize) -> bool {
        self.observed.get((row, col)).copied().unwrap_or(false)
    }

    /// Number of observed pixels
    pub fn observed_count(&self) -> usize {
        self.observed.iter().filter(|&&o| o).count()
    }

    /// Fail with a shape mismatch unless this raster has `expected` shape
    pub fn ensure_shape(&self, name: &str, expected: GridShape) -> Result<()> {
        expected.check(name, self.shape())
    }

    /// Combine two masked rasters element-wise.
    ///
    /// The result is observed only where both inputs are observed and `f`
    /// returns `Some` finite value.
    pub fn zip_with<F>(&self, other: &MaskedRaster, f: F) -> Result<MaskedRaster>
    where
        F: Fn(f64, f64) -> Option<f64>,
    {
        self.grid_shape().check("masked operand", other.shape())?;

        let mut observed = Array2::from_elem(self.shape(), false);
        let values = Zip::from(self.values.data())
            .and(&self.observed)
            .and(other.values.data())
            .and(&other.observed)
            .map_collect(|&a, &oa, &b, &ob| {
                if oa && ob {
                    f(a, b).filter(|v| v.is_finite()).unwrap_or(f64::NAN)
                } else {
                    f64::NAN
                }
            });
        Zip::from(&mut observed)
            .and(&values)
            .for_each(|o, v| *o = !v.is_nan());

        Ok(Self::normalized(values, observed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(values: Vec<f64>) -> MaskedRaster {
        MaskedRaster::from_raster(Raster::from_vec(values, 2, 2).unwrap())
    }

    #[test]
    fn test_nan_is_unobserved() {
        let m = band(vec![1.0, f64::NAN, 3.0, 4.0]);
        assert_eq!(m.get(0, 0), Some(1.0));
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.observed_count(), 3);
    }

    #[test]
    fn test_fill_value_is_unobserved() {
        let r = Raster::from_vec(vec![65535.0, 280.0, 281.0, 65535.0], 2, 2).unwrap();
        let m = MaskedRaster::with_fill_value(r, 65535.0);
        assert!(!m.is_observed(0, 0));
        assert!(m.values().get(0, 0).unwrap().is_nan());
        assert_eq!(m.get(1, 0), Some(281.0));
    }

    #[test]
    fn test_fill_value_matches_exactly() {
        let r = Raster::from_vec(vec![0.0, 1e-17, 65534.99, -0.0], 2, 2).unwrap();
        let m = MaskedRaster::with_fill_value(r, 0.0);
        assert!(!m.is_observed(0, 0));
        assert_eq!(m.get(0, 1), Some(1e-17));
        assert_eq!(m.get(1, 0), Some(65534.99));
        // -0.0 == 0.0
        assert!(!m.is_observed(1, 1));
    }

    #[test]
    fn test_zip_propagates_mask() {
        let a = band(vec![1.0, f64::NAN, 3.0, 4.0]);
        let b = band(vec![1.0, 2.0, f64::NAN, 2.0]);
        let d = a.zip_with(&b, |x, y| Some(x - y)).unwrap();
        assert_eq!(d.get(0, 0), Some(0.0));
        assert_eq!(d.get(0, 1), None);
        assert_eq!(d.get(1, 0), None);
        assert_eq!(d.get(1, 1), Some(2.0));
    }

    #[test]
    fn test_zip_none_marks_unobserved() {
        let a = band(vec![1.0, 2.0, 3.0, 4.0]);
        let b = band(vec![0.0, 2.0, 0.0, 2.0]);
        let ratio = a
            .zip_with(&b, |x, y| if y == 0.0 { None } else { Some(x / y) })
            .unwrap();
        assert_eq!(ratio.observed_count(), 2);
        assert_eq!(ratio.get(1, 1), Some(2.0));
    }

    #[test]
    fn test_zip_shape_mismatch() {
        let a = band(vec![1.0; 4]);
        let b = MaskedRaster::filled(3, 2, 1.0);
        assert!(a.zip_with(&b, |x, y| Some(x + y)).is_err());
    }
}
