use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

/// Camera, lens, and film metadata applied to every JPEG of a directory.
///
/// Required fields are guaranteed non-empty once the set comes out of
/// [`load_metadata`]. An empty lens field means "unknown" and the matching
/// tag is left out of every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSet {
    pub camera_make: String,
    pub camera_model: String,
    pub film: String,
    pub lens_make: String,
    pub lens_model: String,
}

/// On-disk shape of `metadata.json`. Every field may be absent or `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    camera_make: Option<String>,
    camera_model: Option<String>,
    film: Option<String>,
    lens_make: Option<String>,
    lens_model: Option<String>,
}

impl MetadataSet {
    /// The description written to `ImageDescription` and `XMP:Description`.
    pub fn film_description(&self) -> String {
        format!("film: {}", self.film)
    }
}

/// Read and validate the metadata file of a directory.
///
/// Required fields are checked in the order `cameraMake`, `cameraModel`,
/// `film`; the first one that is absent, `null`, or blank is reported.
pub fn load_metadata(dir: &Path, file_name: &str) -> Result<MetadataSet> {
    let path = dir.join(file_name);
    if !path.is_file() {
        return Err(Error::MetadataFileMissing(path));
    }

    let contents = std::fs::read_to_string(&path)?;
    let raw: RawMetadata =
        serde_json::from_str(&contents).map_err(|e| Error::InvalidMetadata {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    let required = |value: Option<String>, field: &'static str| match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::MissingField {
            path: path.clone(),
            field,
        }),
    };

    let camera_make = required(raw.camera_make, "cameraMake")?;
    let camera_model = required(raw.camera_model, "cameraModel")?;
    let film = required(raw.film, "film")?;

    Ok(MetadataSet {
        camera_make,
        camera_model,
        film,
        lens_make: raw.lens_make.unwrap_or_default(),
        lens_model: raw.lens_model.unwrap_or_default(),
    })
}
