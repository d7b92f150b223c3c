use crate::metadata::MetadataSet;

/// A single `TAG=VALUE` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: &'static str,
    pub value: String,
}

/// The tags applied to one file in one exiftool invocation.
///
/// Tags keep insertion order so the generated command line is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRequest {
    tags: Vec<Tag>,
}

impl TagRequest {
    /// Tags written into the JPEG itself.
    pub fn for_jpeg(metadata: &MetadataSet) -> Self {
        let description = metadata.film_description();
        let mut request = Self::default();
        request.set("Make", &metadata.camera_make);
        request.set("Model", &metadata.camera_model);
        request.set("ImageDescription", &description);
        request.set("XMP:Description", &description);
        request.set_if_present("LensMake", &metadata.lens_make);
        request.set_if_present("LensModel", &metadata.lens_model);
        request
    }

    /// Tags written into an XMP sidecar.
    pub fn for_sidecar(metadata: &MetadataSet) -> Self {
        let mut request = Self::default();
        request.set("XMP:Make", &metadata.camera_make);
        request.set("XMP:Model", &metadata.camera_model);
        request.set("XMP:Description", &metadata.film_description());
        request.set_if_present("XMP:LensMake", &metadata.lens_make);
        request.set_if_present("XMP:LensModel", &metadata.lens_model);
        request
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    /// Render as exiftool assignment arguments (`-Make=Nikon`).
    pub fn to_args(&self) -> Vec<String> {
        self.tags
            .iter()
            .map(|t| format!("-{}={}", t.name, t.value))
            .collect()
    }

    fn set(&mut self, name: &'static str, value: &str) {
        self.tags.push(Tag {
            name,
            value: value.to_string(),
        });
    }

    // exiftool deletes a tag assigned an empty string, so unknown values are left out.
    fn set_if_present(&mut self, name: &'static str, value: &str) {
        if !value.is_empty() {
            self.set(name, value);
        }
    }
}
