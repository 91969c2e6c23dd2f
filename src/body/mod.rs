//! Request body preparation: raw bytes, JSON, URL-encoded forms, multipart.
mod multipart;

#[cfg(test)]
mod tests;

pub use multipart::MultipartForm;

use bytes::Bytes;

use crate::client::RequestOptions;
use crate::error::{BodyError, ClientResult};

pub(crate) struct PreparedBody {
    pub(crate) bytes: Bytes,
    pub(crate) content_type: Option<String>,
}

/// Prepares the request body from the given options.
///
/// Precedence follows the options surface: an explicit raw body wins, then
/// JSON, then form fields, then multipart. Returns `None` when the request
/// carries no body.
///
/// # Errors
///
/// Returns a body error when JSON serialization fails; multipart file reads
/// fail earlier, when the file is added to the form.
pub(crate) fn prepare_body(options: &RequestOptions) -> ClientResult<Option<PreparedBody>> {
    if let Some(raw) = &options.body {
        return Ok(Some(PreparedBody {
            bytes: raw.clone(),
            content_type: None,
        }));
    }

    if let Some(json) = &options.json {
        let data = serde_json::to_vec(json).map_err(BodyError::json_serialize)?;
        return Ok(Some(PreparedBody {
            bytes: Bytes::from(data),
            content_type: Some("application/json".to_owned()),
        }));
    }

    if !options.form.is_empty() {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &options.form {
            serializer.append_pair(key, value);
        }
        return Ok(Some(PreparedBody {
            bytes: Bytes::from(serializer.finish()),
            content_type: Some("application/x-www-form-urlencoded".to_owned()),
        }));
    }

    if let Some(multipart) = &options.multipart {
        let encoded = multipart.encode();
        return Ok(Some(PreparedBody {
            bytes: encoded.bytes,
            content_type: Some(encoded.content_type),
        }));
    }

    Ok(None)
}
