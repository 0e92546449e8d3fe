//! Export module for saving heightfields to image and engine formats.
//!
//! Supports 16-bit PNG for universal compatibility and RAW formats
//! for game engine imports.

mod png;
mod raw;

pub use png::{export_png, PngExportError, PngExportOptions};
pub use raw::{expected_file_size, export_raw, RawExportError, RawFormat};
