//! JSON encoding of persisted records.
//!
//! Decoding returns a tagged [`DecodeError`] instead of failing loudly, so each
//! repository can fall back to an empty or default value and keep going.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::DecodeError;

/// Decode a single record stored under `key`.
pub fn decode_record<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Result<T, DecodeError> {
    let value = parse(key, raw)?;
    serde_json::from_value(value).map_err(|e| DecodeError::WrongShape {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Decode a JSON array stored under `key`.
///
/// Fails only when the value is absent, unparseable or not an array. Elements
/// that do not match `T` are skipped, so one damaged entry does not take the
/// whole collection down with it.
pub fn decode_list<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Result<Vec<T>, DecodeError> {
    let Value::Array(items) = parse(key, raw)? else {
        return Err(DecodeError::WrongShape {
            key: key.to_string(),
            reason: "expected a JSON array".to_string(),
        });
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if decoded.len() < total {
        tracing::warn!(
            key,
            skipped = total - decoded.len(),
            kept = decoded.len(),
            "skipped malformed entries"
        );
    }
    Ok(decoded)
}

/// [`decode_list`], with every failure resolved to an empty list.
///
/// An absent key is the normal first-launch state and is not logged.
pub fn decode_list_or_default<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Vec<T> {
    match decode_list(key, raw) {
        Ok(items) => items,
        Err(DecodeError::Absent { .. }) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable collection");
            Vec::new()
        }
    }
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    serde_json::to_string(value)
        .map_err(|e| tracing::error!(error = %e, "failed to encode record"))
        .ok()
}

fn parse(key: &str, raw: Option<String>) -> Result<Value, DecodeError> {
    let raw = raw.ok_or_else(|| DecodeError::Absent {
        key: key.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| DecodeError::Malformed {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn absent_is_tagged() {
        let err = decode_record::<Item>("k", None).unwrap_err();
        assert!(matches!(err, DecodeError::Absent { .. }));
    }

    #[test]
    fn malformed_vs_wrong_shape() {
        let err = decode_record::<Item>("k", Some("{not json".into())).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));

        let err = decode_record::<Item>("k", Some("{\"id\":\"x\"}".into())).unwrap_err();
        assert!(matches!(err, DecodeError::WrongShape { .. }));

        let err = decode_list::<Item>("k", Some("{\"id\":1}".into())).unwrap_err();
        assert!(matches!(err, DecodeError::WrongShape { .. }));
    }

    #[test]
    fn list_skips_bad_elements() {
        let raw = r#"[{"id":1},{"id":"two"},7,{"id":3}]"#;
        let items: Vec<Item> = decode_list("k", Some(raw.into())).unwrap();
        assert_eq!(items, vec![Item { id: 1 }, Item { id: 3 }]);
    }

    #[test]
    fn list_or_default_swallows_corruption() {
        let items: Vec<Item> = decode_list_or_default("k", Some("\u{0}garbage".into()));
        assert!(items.is_empty());
        let items: Vec<Item> = decode_list_or_default("k", None);
        assert!(items.is_empty());
    }
}
