//! Persisted message collection: schema check, encoding, display order

use std::cmp::Ordering;

use thiserror::Error;

use super::Message;

/// Why a persisted collection could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("collection is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("collection is not a JSON array")]
    NotArray,

    #[error("entry {index} is not a valid message: {source}")]
    Entry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode the raw `contactMessages` blob.
///
/// The blob must be a JSON array whose entries each carry the six message
/// fields as strings. Extra fields on an entry are ignored.
pub fn decode_collection(raw: &str) -> Result<Vec<Message>, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(DecodeError::Syntax)?;

    let serde_json::Value::Array(entries) = value else {
        return Err(DecodeError::NotArray);
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).map_err(|source| DecodeError::Entry { index, source })
        })
        .collect()
}

/// Encode a collection as compact JSON.
pub fn encode_collection(messages: &[Message]) -> Result<String, serde_json::Error> {
    serde_json::to_string(messages)
}

/// Sort newest first. Messages with an unparseable date go last; ties keep
/// their stored order.
pub fn sort_newest_first(messages: &mut [Message]) {
    messages.sort_by(|a, b| match (a.timestamp(), b.timestamp()) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
