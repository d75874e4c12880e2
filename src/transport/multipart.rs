//! Inspectable multipart form payloads
//!
//! Forms are assembled as plain data so they can be asserted on in tests;
//! [`HttpTransport`](super::HttpTransport) converts them to
//! `reqwest::multipart::Form` at send time.

use crate::image_data::EncodedImage;

/// Value of a single form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    /// Plain text field
    Text(String),
    /// File upload with file name and content type
    File {
        data: Vec<u8>,
        file_name: String,
        mime_type: String,
    },
}

/// A named form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

/// Ordered list of multipart fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    #[must_use]
    pub fn text<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    /// Append a file field
    #[must_use]
    pub fn file<N, F, M>(mut self, name: N, data: Vec<u8>, file_name: F, mime_type: M) -> Self
    where
        N: Into<String>,
        F: Into<String>,
        M: Into<String>,
    {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::File {
                data,
                file_name: file_name.into(),
                mime_type: mime_type.into(),
            },
        });
        self
    }

    /// Append an image as `<stem>.<extension>` with its own mime type
    #[must_use]
    pub fn image<N: Into<String>>(self, name: N, stem: &str, image: &EncodedImage) -> Self {
        let file_name = format!("{}.{}", stem, image.extension());
        self.file(name, image.data().to_vec(), file_name, image.mime_type())
    }

    #[must_use]
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// First field with the given name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Text value of a field, if it is a text field
    #[must_use]
    pub fn text_value(&self, name: &str) -> Option<&str> {
        match self.get(name).map(|p| &p.value) {
            Some(PartValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Bytes of a field, if it is a file field
    #[must_use]
    pub fn file_data(&self, name: &str) -> Option<&[u8]> {
        match self.get(name).map(|p| &p.value) {
            Some(PartValue::File { data, .. }) => Some(data.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }
}
