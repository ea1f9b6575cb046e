use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// 时间戳反序列化函数
///
/// 后端返回的 `created_at` 是 Python `isoformat()` 的结果，可能不带时区，
/// 不带时区时按 UTC 处理
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(serde::de::Error::custom)
}

/// 解析 ISO-8601 时间戳（带或不带时区）
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("无效的时间戳 {:?}: {}", s, e))
}

/// 反序列化数组字段，处理 null 值
pub fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::parse_timestamp;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_naive_and_offset_timestamps() {
        let naive = parse_timestamp("2024-03-05T14:07:09.123456").unwrap();
        assert_eq!((naive.year(), naive.month(), naive.day()), (2024, 3, 5));
        assert_eq!(naive.hour(), 14);

        let offset = parse_timestamp("2024-03-05T14:07:09+02:00").unwrap();
        assert_eq!(offset.hour(), 12);

        let spaced = parse_timestamp("2024-03-05 14:07:09").unwrap();
        assert_eq!(spaced.minute(), 7);

        assert!(parse_timestamp("yesterday").is_err());
    }
}
