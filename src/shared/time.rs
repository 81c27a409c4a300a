use chrono::{SecondsFormat, Utc};

pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// RFC 3339 UTC timestamp with microsecond precision, e.g. `2025-03-01T09:30:00.123456+00:00`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
