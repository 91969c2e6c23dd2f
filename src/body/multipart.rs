use std::path::Path;

use bytes::Bytes;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::error::{BodyError, ClientResult};

/// Buffered `multipart/form-data` payload.
///
/// Files are read eagerly when added, so unreadable paths surface before any
/// network call is attempted. Encoding buffers the whole body, which keeps
/// requests cloneable for retrying middleware.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

#[derive(Debug, Clone)]
struct FilePart {
    name: String,
    filename: String,
    content: Bytes,
}

pub(crate) struct EncodedForm {
    pub(crate) bytes: Bytes,
    pub(crate) content_type: String,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn file_bytes(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        self.files.push(FilePart {
            name: name.into(),
            filename: filename.into(),
            content: content.into(),
        });
        self
    }

    /// Adds a file part read from disk; the part's filename is the path's
    /// final component.
    ///
    /// # Errors
    ///
    /// Returns a body error when the file cannot be read.
    pub fn file_path(self, name: impl Into<String>, path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)
            .map_err(|err| BodyError::read_multipart_file(path.to_path_buf(), err))?;
        let filename = path
            .file_name()
            .map_or_else(String::new, |name| name.to_string_lossy().into_owned());
        Ok(self.file_bytes(name, filename, content))
    }

    pub(crate) fn encode(&self) -> EncodedForm {
        let boundary = boundary();
        let mut out: Vec<u8> = Vec::new();

        for (name, value) in &self.fields {
            out.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }

        for file in &self.files {
            out.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name = file.name,
                    filename = file.filename,
                )
                .as_bytes(),
            );
            out.extend_from_slice(&file.content);
            out.extend_from_slice(b"\r\n");
        }

        out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        EncodedForm {
            bytes: Bytes::from(out),
            content_type: format!("multipart/form-data; boundary={boundary}"),
        }
    }
}

fn boundary() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("sling-{suffix}")
}
