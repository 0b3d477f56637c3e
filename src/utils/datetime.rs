//! 日期时间序列化/反序列化工具
//!
//! 提供自定义 Serde 序列化/反序列化支持：
//! - 序列化: `DateTime`<Utc> -> RFC3339 字符串
//! - 反序列化: Graph 时间戳字符串 (RFC3339, 可带小数秒) -> `DateTime`<Utc>

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// 序列化 Option<`DateTime`<Utc>> 为 Option<RFC3339 字符串>
pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

/// 反序列化：Graph 返回的 `lastActionDateTime` 形如 `2021-05-01T00:30:00Z`
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<String>::deserialize(deserializer)? {
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| Error::custom(format!("Invalid RFC3339 timestamp: {e}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super")]
        ts: Option<DateTime<Utc>>,
    }

    #[test]
    fn deserialize_graph_timestamp() {
        let w: Wrapper = serde_json::from_str(r#"{"ts":"2021-05-01T00:30:00Z"}"#).unwrap();
        let expected = Utc.with_ymd_and_hms(2021, 5, 1, 0, 30, 0).unwrap();
        assert_eq!(w.ts, Some(expected));
    }

    #[test]
    fn deserialize_fractional_seconds() {
        let w: Wrapper = serde_json::from_str(r#"{"ts":"2021-05-01T00:30:00.5040000Z"}"#).unwrap();
        assert!(w.ts.is_some());
    }

    #[test]
    fn deserialize_null() {
        let w: Wrapper = serde_json::from_str(r#"{"ts":null}"#).unwrap();
        assert_eq!(w.ts, None);
    }

    #[test]
    fn deserialize_invalid_rejected() {
        let res: Result<Wrapper, _> = serde_json::from_str(r#"{"ts":"not-a-date"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn serialize_round_trip() {
        let w = Wrapper {
            ts: Some(Utc.with_ymd_and_hms(2021, 5, 1, 0, 30, 0).unwrap()),
        };
        let json = serde_json::to_string(&w).unwrap();
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ts, w.ts);
    }
}
