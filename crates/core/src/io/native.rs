//! Single-band GeoTIFF reading/writing
//!
//! Uses the `tiff` crate. Scene grids are read into `Raster<T>` whatever
//! their stored sample type; output is written either as 32-bit float or as
//! 8-bit grayscale for category products.

use crate::error::{Error, Result};
use crate::raster::{MaskedRaster, Raster, RasterElement};
use num_traits::NumCast;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray32Float, Gray8};
use tiff::encoder::TiffEncoder;

/// On-disk sample type of a written GeoTIFF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    #[default]
    Float32,
    /// 8-bit unsigned; values outside 0..=255 are written as 255
    UInt8,
}

/// Options for writing GeoTIFF files
#[derive(Debug, Clone, Default)]
pub struct GeoTiffOptions {
    pub sample_format: SampleFormat,
}

impl GeoTiffOptions {
    pub fn uint8() -> Self {
        Self {
            sample_format: SampleFormat::UInt8,
        }
    }
}

/// Read a GeoTIFF file into a Raster
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file)
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8]) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data))
}

/// Read an observation band.
///
/// NaN samples, and samples equal to `fill_value` when given, become
/// unobserved.
pub fn read_masked_geotiff<P: AsRef<Path>>(path: P, fill_value: Option<f64>) -> Result<MaskedRaster> {
    let raster: Raster<f64> = read_geotiff(path)?;
    Ok(match fill_value {
        Some(fill) => MaskedRaster::with_fill_value(raster, fill),
        None => MaskedRaster::from_raster(raster),
    })
}

fn cast_samples<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: NumCast + Copy,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or_else(T::default_nodata))
        .collect()
}

/// Internal: decode a GeoTIFF from any `Read + Seek` source
fn decode_geotiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_samples(buf),
        DecodingResult::F64(buf) => cast_samples(buf),
        DecodingResult::U8(buf) => cast_samples(buf),
        DecodingResult::U16(buf) => cast_samples(buf),
        DecodingResult::U32(buf) => cast_samples(buf),
        DecodingResult::I8(buf) => cast_samples(buf),
        DecodingResult::I16(buf) => cast_samples(buf),
        DecodingResult::I32(buf) => cast_samples(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ));
        }
    };

    // Multi-sample images decode to more than rows * cols values
    if data.len() != rows * cols {
        return Err(Error::UnsupportedDataType(format!(
            "expected a single-band image, got {} samples for {}x{} pixels",
            data.len(),
            rows,
            cols
        )));
    }

    Raster::from_vec(data, rows, cols)
}

/// Write a Raster to a GeoTIFF file
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    encode_geotiff(raster, &mut writer, options.unwrap_or_default())?;
    writer.flush()?;
    Ok(())
}

/// Write a category grid (cloud mask, shift classes) as 8-bit grayscale
pub fn write_category_geotiff<P: AsRef<Path>>(raster: &Raster<u8>, path: P) -> Result<()> {
    write_geotiff(raster, path, Some(GeoTiffOptions::uint8()))
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>, options: Option<GeoTiffOptions>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf), options.unwrap_or_default())?;
    Ok(buf)
}

/// Internal: encode a Raster as GeoTIFF into any `Write + Seek` sink
fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();

    match options.sample_format {
        SampleFormat::Float32 => {
            let data: Vec<f32> = raster
                .data()
                .iter()
                .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
                .collect();
            encoder
                .write_image::<Gray32Float>(cols as u32, rows as u32, &data)
                .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;
        }
        SampleFormat::UInt8 => {
            let data: Vec<u8> = raster
                .data()
                .iter()
                .map(|&v| num_traits::cast(v).unwrap_or(u8::MAX))
                .collect();
            encoder
                .write_image::<Gray8>(cols as u32, rows as u32, &data)
                .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_category_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clm.tif");
        let clm = Raster::from_vec(vec![0u8, 1, 2, 3, 4, 126], 2, 3).unwrap();

        write_category_geotiff(&clm, &path).unwrap();
        let back: Raster<u8> = read_geotiff(&path).unwrap();
        assert_eq!(back, clm);
    }

    #[test]
    fn test_float_buffer_keeps_nan() {
        let bt = Raster::from_vec(vec![280.5, f64::NAN, 290.25, 300.0], 2, 2).unwrap();
        let buf = write_geotiff_to_buffer(&bt, None).unwrap();
        let back: Raster<f64> = read_geotiff_from_buffer(&buf).unwrap();
        assert_eq!(back.get(0, 0).unwrap(), 280.5);
        assert!(back.get(0, 1).unwrap().is_nan());
        assert_eq!(back.get(1, 1).unwrap(), 300.0);
    }

    #[test]
    fn test_masked_read_with_fill() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ref_065.tif");
        let r = Raster::from_vec(vec![12.0, -999.0, 35.0, 40.0], 2, 2).unwrap();
        write_geotiff(&r, &path, None).unwrap();

        let band = read_masked_geotiff(&path, Some(-999.0)).unwrap();
        assert_eq!(band.observed_count(), 3);
        assert!(!band.is_observed(0, 1));
        assert_eq!(band.get(1, 0), Some(35.0));
    }

    #[test]
    fn test_garbage_buffer_is_error() {
        let result: Result<Raster<f64>> = read_geotiff_from_buffer(b"not a tiff");
        assert!(result.is_err());
    }
}
