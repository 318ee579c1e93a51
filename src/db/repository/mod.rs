//! Repository layer — entity-scoped database operations.
//!
//! Free functions over a borrowed `Connection`, so callers decide the
//! transaction boundary. All public functions are re-exported here.

mod audit;
mod medicine;
mod prescription;
mod profile;

use chrono::NaiveDateTime;

use super::DatabaseError;

pub use audit::*;
pub use medicine::*;
pub use prescription::*;
pub use profile::*;

/// Storage format of every timestamp column.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_datetime(value: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_round_trip_at_second_precision() {
        let value = NaiveDateTime::parse_from_str("2026-01-31 23:59:58", DATETIME_FORMAT).unwrap();
        assert_eq!(format_datetime(&value), "2026-01-31 23:59:58");
        assert_eq!(parse_datetime("2026-01-31 23:59:58").unwrap(), value);
    }

    #[test]
    fn malformed_timestamp_is_constraint_violation() {
        assert!(matches!(
            parse_datetime("yesterday"),
            Err(DatabaseError::ConstraintViolation(_))
        ));
    }
}
