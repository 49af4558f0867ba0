//! Small shared data types.

use serde::{Deserialize, Serialize};

/// A high-precision timestamp in microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Returns the current timestamp.
    pub fn now() -> Self {
        let now = chrono::Utc::now();
        let micros = (now.timestamp() as u64) * 1_000_000 + (now.timestamp_subsec_micros() as u64);
        Self(micros)
    }

    /// Formats the timestamp as an RFC 3339 string, for diagnostics.
    pub fn to_rfc3339(&self) -> String {
        chrono::DateTime::from_timestamp_micros(self.0 as i64)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now_is_monotonic_enough() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(b >= a);
        assert!(a.0 > 0);
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp(0);
        assert!(ts.to_rfc3339().starts_with("1970-01-01T00:00:00"));
    }
}
