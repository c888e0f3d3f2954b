//! Strict JSON body decoding
//!
//! Request bodies must hold exactly one JSON object matching the target
//! type. Unknown keys are rejected by `#[serde(deny_unknown_fields)]` on the
//! request types; this module turns every serde failure into a
//! [`DecodeError`] whose message names the offending byte offset or field.

use serde::de::DeserializeOwned;
use serde_json::error::Category;

/// Default request body ceiling (1 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 1_048_576;

/// Why a request body could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("body must not be empty")]
    Empty,

    #[error("body must not be larger than {limit} bytes")]
    TooLarge { limit: usize },

    #[error("body contains badly-formed JSON (at byte {offset})")]
    Syntax { offset: usize },

    #[error("body contains badly-formed JSON (unexpected end of input)")]
    Truncated,

    #[error("body must contain exactly one JSON object (trailing data at byte {offset})")]
    TrailingData { offset: usize },

    #[error("body contains unknown JSON field \"{field}\"")]
    UnknownField { field: String },

    #[error("body is missing required JSON field \"{field}\"")]
    MissingField { field: String },

    #[error("body contains incorrect JSON type (at byte {offset}): {detail}")]
    InvalidType { offset: usize, detail: String },

    #[error("body contains an invalid value (at byte {offset}): {detail}")]
    InvalidValue { offset: usize, detail: String },

    #[error("body could not be read")]
    Unreadable,
}

/// Decode `bytes` into `T`, enforcing `limit` and single-object framing.
///
/// # Example
/// ```
/// use pagekit_server::decode::{decode, DecodeError, DEFAULT_BODY_LIMIT};
///
/// #[derive(Debug, serde::Deserialize)]
/// #[serde(deny_unknown_fields)]
/// struct Input { name: String }
///
/// let err = decode::<Input>(br#"{"name":"x","extra":1}"#, DEFAULT_BODY_LIMIT).unwrap_err();
/// assert_eq!(err, DecodeError::UnknownField { field: "extra".into() });
/// ```
pub fn decode<T: DeserializeOwned>(bytes: &[u8], limit: usize) -> Result<T, DecodeError> {
    if bytes.len() > limit {
        return Err(DecodeError::TooLarge { limit });
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }

    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = T::deserialize(&mut de).map_err(|e| classify(&e, bytes))?;

    // Anything after the first value (other than whitespace) is a second
    // document or garbage.
    de.end().map_err(|e| DecodeError::TrailingData {
        offset: byte_offset(bytes, e.line(), e.column()),
    })?;

    Ok(value)
}

fn classify(err: &serde_json::Error, bytes: &[u8]) -> DecodeError {
    let offset = byte_offset(bytes, err.line(), err.column());

    match err.classify() {
        Category::Eof => DecodeError::Truncated,
        Category::Syntax => DecodeError::Syntax { offset },
        Category::Io => DecodeError::Unreadable,
        Category::Data => {
            let detail = strip_position(&err.to_string());

            if let Some(field) = backticked_after(&detail, "unknown field ") {
                DecodeError::UnknownField { field }
            } else if let Some(field) = backticked_after(&detail, "missing field ") {
                DecodeError::MissingField { field }
            } else if detail.starts_with("invalid type") {
                DecodeError::InvalidType { offset, detail }
            } else {
                DecodeError::InvalidValue { offset, detail }
            }
        }
    }
}

/// serde_json appends " at line L column C" to data errors.
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_owned(),
        None => message.to_owned(),
    }
}

/// Extract `name` from messages shaped like "unknown field `name`, ...".
fn backticked_after(message: &str, prefix: &str) -> Option<String> {
    let rest = message.strip_prefix(prefix)?.strip_prefix('`')?;
    let end = rest.find('`')?;
    Some(rest[..end].to_owned())
}

/// Convert serde_json's 1-based line / column into a 0-based byte offset.
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    if line <= 1 {
        return column.saturating_sub(1).min(bytes.len());
    }

    let line_start = bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'\n')
        .nth(line - 2)
        .map(|(idx, _)| idx + 1)
        .unwrap_or(bytes.len());

    (line_start + column.saturating_sub(1)).min(bytes.len())
}
