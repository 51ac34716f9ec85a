//! Thin per-resource consumers of the REST backend. Each module builds a
//! request, hands it to the gateway, and maps the `{data: ...}` envelope
//! into display-friendly types. No business logic lives here.

pub mod categories;
pub mod orders;
pub mod payments;
pub mod products;
pub mod subcategories;
pub mod users;

pub(crate) mod de {
    //! Field-level deserializers tolerant of the backend's loosely typed
    //! JSON: money and counts may arrive as numbers or strings, ids as
    //! either, timestamps in RFC 3339 or not at all.

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Number-or-string-or-null to f64, defaulting to 0.0
    pub fn loose_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        })
    }

    /// Number-or-string-or-null to i64, defaulting to 0
    pub fn loose_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => n.as_i64().unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }

    /// Any scalar to its string form; null and objects become None
    pub fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// RFC 3339 timestamp or nothing; unparseable values are dropped rather
    /// than failing the whole listing
    pub fn loose_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    #[cfg(test)]
    mod tests {
        use serde::Deserialize;

        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "super::loose_f64")]
            amount: f64,
            #[serde(default, deserialize_with = "super::loose_i64")]
            count: i64,
            #[serde(default, deserialize_with = "super::loose_string")]
            id: Option<String>,
        }

        #[test]
        fn accepts_numbers_and_numeric_strings() {
            let row: Row =
                serde_json::from_str(r#"{"amount": "249.50", "count": 3, "id": 42}"#).unwrap();
            assert_eq!(row.amount, 249.5);
            assert_eq!(row.count, 3);
            assert_eq!(row.id.as_deref(), Some("42"));
        }

        #[test]
        fn nulls_collapse_to_defaults() {
            let row: Row =
                serde_json::from_str(r#"{"amount": null, "count": null, "id": null}"#).unwrap();
            assert_eq!(row.amount, 0.0);
            assert_eq!(row.count, 0);
            assert!(row.id.is_none());
        }
    }
}

use serde_json::{json, Value};

use crate::error::{AdminError, Result};

/// Pull the `data` field out of a `{data: ...}` envelope, treating an absent
/// field as an empty list the way the screens always have.
pub(crate) fn data_list<T: serde::de::DeserializeOwned>(envelope: &Value) -> Result<Vec<T>> {
    let data = envelope.get("data").cloned().unwrap_or_else(|| json!([]));
    serde_json::from_value(data)
        .map_err(|e| AdminError::UnexpectedResponse(format!("malformed data list: {}", e)))
}

/// Pull a single object out of a `{data: ...}` envelope.
pub(crate) fn data_item<T: serde::de::DeserializeOwned>(envelope: &Value) -> Result<T> {
    let data = envelope
        .get("data")
        .cloned()
        .ok_or_else(|| AdminError::UnexpectedResponse("response carried no data".to_string()))?;
    serde_json::from_value(data)
        .map_err(|e| AdminError::UnexpectedResponse(format!("malformed data item: {}", e)))
}
