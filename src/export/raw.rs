//! RAW format export for game engine compatibility.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::HeightField;

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// RAW export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (Unity default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian (high precision).
    R32Float,
}

impl RawFormat {
    pub fn bytes_per_sample(self) -> u64 {
        match self {
            RawFormat::R16LittleEndian | RawFormat::R16BigEndian => 2,
            RawFormat::R32Float => 4,
        }
    }
}

/// Exports a heightfield as a headerless RAW heightmap, row-major.
///
/// # Arguments
/// * `field` - The heightfield to export
/// * `path` - Output file path
/// * `format` - RAW format (R16 or R32)
/// * `min_height` - Height mapped to 0 (R16 only)
/// * `max_height` - Height mapped to 65535 (R16 only)
///
/// # Returns
/// `Ok(())` on success, or an error if export fails. `R32Float` writes
/// heights verbatim and ignores the range.
pub fn export_raw(
    field: &HeightField,
    path: &Path,
    format: RawFormat,
    min_height: f32,
    max_height: f32,
) -> Result<(), RawExportError> {
    if format != RawFormat::R32Float && min_height >= max_height {
        return Err(RawExportError::InvalidHeightRange(min_height, max_height));
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let range = max_height - min_height;
    let quantize = |height: f32| {
        let normalized = ((height - min_height) / range).clamp(0.0, 1.0);
        (normalized * 65535.0) as u16
    };

    match format {
        RawFormat::R16LittleEndian => {
            for &height in &field.heights {
                writer.write_all(&quantize(height).to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for &height in &field.heights {
                writer.write_all(&quantize(height).to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            if cfg!(target_endian = "little") {
                writer.write_all(bytemuck::cast_slice(&field.heights))?;
            } else {
                for &height in &field.heights {
                    writer.write_all(&height.to_le_bytes())?;
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Returns the expected file size for a RAW export.
pub fn expected_file_size(size: u32, format: RawFormat) -> u64 {
    (size as u64) * (size as u64) * format.bytes_per_sample()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ramp(size: u32) -> HeightField {
        let n = (size * size) as usize;
        let heights = (0..n).map(|i| i as f32 / n as f32).collect();
        HeightField::from_heights(size, heights).unwrap()
    }

    #[test]
    fn test_export_raw_r16() {
        let field = ramp(64);
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");

        export_raw(&field, &path, RawFormat::R16LittleEndian, 0.0, 1.0).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), expected_file_size(64, RawFormat::R16LittleEndian));
    }

    #[test]
    fn test_export_raw_r32() {
        let field = ramp(32);
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");

        export_raw(&field, &path, RawFormat::R32Float, 0.0, 1.0).unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len() as u64, expected_file_size(32, RawFormat::R32Float));
        let restored: Vec<f32> = data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(restored, field.heights);
    }

    #[test]
    fn test_r32_ignores_range() {
        let field = ramp(4);
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");
        assert!(export_raw(&field, &path, RawFormat::R32Float, 1.0, 0.0).is_ok());
        assert!(export_raw(&field, &path, RawFormat::R16BigEndian, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_expected_file_size() {
        assert_eq!(expected_file_size(256, RawFormat::R16LittleEndian), 256 * 256 * 2);
        assert_eq!(expected_file_size(256, RawFormat::R16BigEndian), 256 * 256 * 2);
        assert_eq!(expected_file_size(256, RawFormat::R32Float), 256 * 256 * 4);
    }

    #[test]
    fn test_raw_content_correctness() {
        let field = HeightField::from_heights(2, vec![0.0, 0.5, 0.75, 1.0]).unwrap();

        let dir = tempdir().unwrap();
        let le_path = dir.path().join("le.raw");
        let be_path = dir.path().join("be.raw");

        export_raw(&field, &le_path, RawFormat::R16LittleEndian, 0.0, 1.0).unwrap();
        export_raw(&field, &be_path, RawFormat::R16BigEndian, 0.0, 1.0).unwrap();

        let le = std::fs::read(&le_path).unwrap();
        let be = std::fs::read(&be_path).unwrap();
        assert_eq!(le.len(), 8);

        assert_eq!(u16::from_le_bytes([le[0], le[1]]), 0);
        assert!((u16::from_le_bytes([le[2], le[3]]) as i32 - 32767).abs() < 2);
        assert_eq!(u16::from_le_bytes([le[6], le[7]]), 65535);

        for (l, b) in le.chunks_exact(2).zip(be.chunks_exact(2)) {
            assert_eq!(l[0], b[1]);
            assert_eq!(l[1], b[0]);
        }
    }
}
