//! Tag requests and the exiftool-backed writer.
//!
//! - [`TagRequest`] — the ordered `TAG=VALUE` set for a JPEG or an XMP sidecar
//! - [`TagWriter`] — applies a request to a file in place
//! - [`ExifTool`] — the subprocess implementation, with discovery and a timeout

mod request;
mod writer;

pub use request::{Tag, TagRequest};
pub use writer::{ExifTool, TagWriter};
