use std::io::Write as _;

use bytes::Bytes;
use serde_json::json;

use crate::client::RequestOptions;
use crate::error::{BodyError, ClientError};

use super::{MultipartForm, prepare_body};

#[test]
fn no_options_means_no_body() -> Result<(), String> {
    let options = RequestOptions::new();
    let prepared = prepare_body(&options).map_err(|err| err.to_string())?;
    if prepared.is_some() {
        return Err("Expected no body".to_owned());
    }
    Ok(())
}

#[test]
fn json_body_sets_content_type() -> Result<(), String> {
    let options = RequestOptions::new()
        .json(&json!({"name": "ada"}))
        .map_err(|err| err.to_string())?;
    let prepared = prepare_body(&options)
        .map_err(|err| err.to_string())?
        .ok_or("Expected a body")?;

    if prepared.content_type.as_deref() != Some("application/json") {
        return Err(format!("Unexpected content type: {:?}", prepared.content_type));
    }
    let value: serde_json::Value =
        serde_json::from_slice(&prepared.bytes).map_err(|err| err.to_string())?;
    if value.get("name").and_then(serde_json::Value::as_str) != Some("ada") {
        return Err(format!("Unexpected payload: {}", value));
    }
    Ok(())
}

#[test]
fn form_fields_are_url_encoded() -> Result<(), String> {
    let options = RequestOptions::new()
        .form_field("username", "ada lovelace")
        .form_field("tier", "pro");
    let prepared = prepare_body(&options)
        .map_err(|err| err.to_string())?
        .ok_or("Expected a body")?;

    if prepared.content_type.as_deref() != Some("application/x-www-form-urlencoded") {
        return Err(format!("Unexpected content type: {:?}", prepared.content_type));
    }
    let encoded = String::from_utf8_lossy(&prepared.bytes).into_owned();
    if encoded != "username=ada+lovelace&tier=pro" {
        return Err(format!("Unexpected encoding: {}", encoded));
    }
    Ok(())
}

#[test]
fn raw_body_wins_over_json() -> Result<(), String> {
    let options = RequestOptions::new()
        .json(&json!({"ignored": true}))
        .map_err(|err| err.to_string())?
        .body(Bytes::from_static(b"raw bytes"));
    let prepared = prepare_body(&options)
        .map_err(|err| err.to_string())?
        .ok_or("Expected a body")?;

    if prepared.content_type.is_some() {
        return Err("Raw bodies must not force a content type".to_owned());
    }
    if prepared.bytes.as_ref() != b"raw bytes" {
        return Err("Raw body was altered".to_owned());
    }
    Ok(())
}

#[test]
fn multipart_encodes_fields_and_files() -> Result<(), String> {
    let form = MultipartForm::new()
        .field("description", "Test file")
        .file_bytes("file", "test.txt", Bytes::from_static(b"Hello, World!"));
    let encoded = form.encode();

    let boundary = encoded
        .content_type
        .strip_prefix("multipart/form-data; boundary=")
        .ok_or("Unexpected content type")?
        .to_owned();
    let body = String::from_utf8_lossy(&encoded.bytes).into_owned();

    if !body.contains("Content-Disposition: form-data; name=\"description\"\r\n\r\nTest file") {
        return Err(format!("Field part missing: {}", body));
    }
    if !body.contains("name=\"file\"; filename=\"test.txt\"") {
        return Err(format!("File part missing: {}", body));
    }
    if !body.contains("Hello, World!") {
        return Err("File content missing".to_owned());
    }
    if !body.ends_with(&format!("--{boundary}--\r\n")) {
        return Err("Closing boundary missing".to_owned());
    }
    Ok(())
}

#[test]
fn multipart_reads_files_from_disk() -> Result<(), String> {
    let mut file = tempfile::NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"payload from disk")
        .map_err(|err| err.to_string())?;

    let form = MultipartForm::new()
        .file_path("upload", file.path())
        .map_err(|err| err.to_string())?;
    let encoded = form.encode();
    let body = String::from_utf8_lossy(&encoded.bytes).into_owned();
    if !body.contains("payload from disk") {
        return Err("File content missing".to_owned());
    }
    Ok(())
}

#[test]
fn multipart_missing_file_is_an_error() -> Result<(), String> {
    let result = MultipartForm::new().file_path("upload", "/definitely/not/here.txt");
    match result {
        Err(ClientError::Body(BodyError::ReadMultipartFile { path, .. })) => {
            if path.to_string_lossy() != "/definitely/not/here.txt" {
                return Err(format!("Unexpected path in error: {}", path.display()));
            }
            Ok(())
        }
        Err(other) => Err(format!("Unexpected error: {}", other)),
        Ok(_) => Err("Expected an error for a missing file".to_owned()),
    }
}
