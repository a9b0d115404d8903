use serde::{Deserialize, Deserializer};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Deserialize an identifier that the backend may send as a JSON string or number.
///
/// The restaurant API is not consistent here (users come back with numeric
/// ids on some deployments, UUID strings on others), so ids are kept as
/// strings on the client.
pub fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

/// Optional variant of [`de_id`]; `null` and a missing field both map to `None`.
pub fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "de_id")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "de_id")]
        id: String,
        #[serde(default, deserialize_with = "de_opt_id")]
        parent: Option<String>,
    }

    #[test]
    fn test_id_accepts_string_and_number() {
        let a: Row = serde_json::from_str(r#"{"id":"a1b2"}"#).unwrap();
        assert_eq!(a.id, "a1b2");
        assert!(a.parent.is_none());

        let b: Row = serde_json::from_str(r#"{"id":42,"parent":7}"#).unwrap();
        assert_eq!(b.id, "42");
        assert_eq!(b.parent.as_deref(), Some("7"));

        let c: Row = serde_json::from_str(r#"{"id":1,"parent":null}"#).unwrap();
        assert!(c.parent.is_none());
    }
}
