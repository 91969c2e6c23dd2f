use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Body preparation and decoding failures, surfaced before or instead of any
/// network activity.
#[derive(Debug, Clone, Error)]
pub enum BodyError {
    #[error("Failed to serialize JSON body: {source}")]
    JsonSerialize {
        #[source]
        source: Arc<serde_json::Error>,
    },
    #[error("Failed to decode JSON response: {source}")]
    JsonDecode {
        #[source]
        source: Arc<serde_json::Error>,
    },
    #[error("Failed to read multipart file '{path}': {source}")]
    ReadMultipartFile {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl BodyError {
    pub(crate) fn json_serialize(source: serde_json::Error) -> Self {
        BodyError::JsonSerialize {
            source: Arc::new(source),
        }
    }

    pub(crate) fn json_decode(source: serde_json::Error) -> Self {
        BodyError::JsonDecode {
            source: Arc::new(source),
        }
    }

    pub(crate) fn read_multipart_file(path: PathBuf, source: std::io::Error) -> Self {
        BodyError::ReadMultipartFile {
            path,
            source: Arc::new(source),
        }
    }
}
