//! Geocode records and their application-level interpretation.
//!
//! A record keeps the provider status as a plain string. [`Outcome`] and
//! [`FailureCode`] give that string a typed meaning.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Status value meaning the provider returned a usable result.
pub const SUCCESS_STATUS: &str = "OK";

/// Fractional digits kept for stored coordinates.
const COORDINATE_SCALE: f64 = 100_000_000.0;

/// One cached geocode attempt for a normalized address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeRecord {
    pub id: i64,
    pub address: String,
    pub status: String,
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
    pub place_id: String,
    pub hits: i64,
    pub created_at: DateTime<FixedOffset>,
    pub created_at_gmt: DateTime<Utc>,
}

impl GeocodeRecord {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Time elapsed since the record was written.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at_gmt
    }

    pub fn outcome(&self) -> Outcome {
        if self.is_success() {
            Outcome::Success(Location {
                lat: self.lat,
                lng: self.lng,
                formatted_address: self.formatted_address.clone(),
                place_id: self.place_id.clone(),
            })
        } else {
            Outcome::Failure { code: FailureCode::parse(&self.status), message: self.formatted_address.clone() }
        }
    }
}

/// Coordinates and provider identifiers for a resolved address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
    pub place_id: String,
}

/// Typed view of a record's status.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Location),
    Failure { code: FailureCode, message: String },
}

/// Why a geocode attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCode {
    /// The provider could not be reached (includes timeouts).
    Transport,
    /// The provider's response body could not be understood.
    Decode,
    /// The provider reported a non-success status; `None` when it reported none.
    Api(Option<String>),
    /// A persisted status this version does not recognize.
    Other(String),
}

impl FailureCode {
    /// Build an API failure code, treating an empty status like a missing one.
    pub fn api(status: Option<&str>) -> Self {
        match status {
            Some(s) if !s.is_empty() => FailureCode::Api(Some(s.to_string())),
            _ => FailureCode::Api(None),
        }
    }

    /// Interpret a persisted status string.
    pub fn parse(status: &str) -> Self {
        match status {
            "transport_failed" => FailureCode::Transport,
            "decode_failed" => FailureCode::Decode,
            "api:NULL" => FailureCode::Api(None),
            other => match other.strip_prefix("api:") {
                Some(rest) => FailureCode::api(Some(rest)),
                None => FailureCode::Other(other.to_string()),
            },
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCode::Transport => f.write_str("transport_failed"),
            FailureCode::Decode => f.write_str("decode_failed"),
            FailureCode::Api(Some(status)) => write!(f, "api:{status}"),
            FailureCode::Api(None) => f.write_str("api:NULL"),
            FailureCode::Other(status) => f.write_str(status),
        }
    }
}

/// Insert payload for a store.
///
/// Stores assign `id`, `hits` and both timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub address: String,
    pub status: String,
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
    pub place_id: String,
}

impl NewRecord {
    pub fn success(address: impl Into<String>, location: &Location) -> Self {
        Self {
            address: address.into(),
            status: SUCCESS_STATUS.to_string(),
            lat: location.lat,
            lng: location.lng,
            formatted_address: location.formatted_address.clone(),
            place_id: location.place_id.clone(),
        }
    }

    /// Failure rows carry zero coordinates and keep the error message in `formatted_address`.
    pub fn failure(address: impl Into<String>, code: &FailureCode, message: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status: code.to_string(),
            lat: 0.0,
            lng: 0.0,
            formatted_address: message.into(),
            place_id: String::new(),
        }
    }
}

/// Round a coordinate to the stored precision (8 fractional digits).
pub(crate) fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_code_display() {
        assert_eq!(FailureCode::Transport.to_string(), "transport_failed");
        assert_eq!(FailureCode::Decode.to_string(), "decode_failed");
        assert_eq!(FailureCode::api(Some("ZERO_RESULTS")).to_string(), "api:ZERO_RESULTS");
        assert_eq!(FailureCode::api(None).to_string(), "api:NULL");
        assert_eq!(FailureCode::api(Some("")).to_string(), "api:NULL");
    }

    #[test]
    fn test_failure_code_parse() {
        assert_eq!(FailureCode::parse("transport_failed"), FailureCode::Transport);
        assert_eq!(FailureCode::parse("decode_failed"), FailureCode::Decode);
        assert_eq!(FailureCode::parse("api:NULL"), FailureCode::Api(None));
        assert_eq!(
            FailureCode::parse("api:OVER_QUERY_LIMIT"),
            FailureCode::Api(Some("OVER_QUERY_LIMIT".to_string()))
        );
        assert_eq!(
            FailureCode::parse("wp:remote_get_failed"),
            FailureCode::Other("wp:remote_get_failed".to_string())
        );
    }

    #[test]
    fn test_new_failure_record() {
        let record = NewRecord::failure("1 Nowhere Rd", &FailureCode::api(Some("ZERO_RESULTS")), "no match");
        assert_eq!(record.status, "api:ZERO_RESULTS");
        assert_eq!(record.lat, 0.0);
        assert_eq!(record.lng, 0.0);
        assert_eq!(record.formatted_address, "no match");
        assert!(record.place_id.is_empty());
    }

    #[test]
    fn test_round_coordinate() {
        assert_eq!(round_coordinate(37.42), 37.42);
        assert_eq!(round_coordinate(-122.084_000_004_9), -122.084);
        assert_eq!(round_coordinate(12.345_678_916), 12.345_678_92);
    }

    #[test]
    fn test_outcome_from_record() {
        let now = Utc::now();
        let mut record = GeocodeRecord {
            id: 1,
            address: "123 Main St".into(),
            status: SUCCESS_STATUS.into(),
            lat: 1.5,
            lng: 2.5,
            formatted_address: "123 Main St, Springfield".into(),
            place_id: "abc".into(),
            hits: 1,
            created_at: now.fixed_offset(),
            created_at_gmt: now,
        };
        assert!(matches!(record.outcome(), Outcome::Success(loc) if loc.place_id == "abc"));

        record.status = "api:ZERO_RESULTS".into();
        record.formatted_address = "API Status Invalid: ZERO_RESULTS".into();
        match record.outcome() {
            Outcome::Failure { code, message } => {
                assert_eq!(code, FailureCode::Api(Some("ZERO_RESULTS".into())));
                assert!(message.contains("ZERO_RESULTS"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
