use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum PrescriptionError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Prescription not found: {0}")]
    PrescriptionNotFound(i64),

    #[error("Medicine not found: {0}")]
    DrugNotFound(i64),

    /// Rejected by the contraindication check. Carries the report summary.
    #[error("Contraindicated: {0}")]
    Contraindicated(String),

    #[error("Status change not allowed from {0}")]
    StatusConflict(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PrescriptionError {
    /// Stable error code exposed to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VAL-001",
            Self::DrugNotFound(_) => "DRUG-404",
            Self::Contraindicated(_) => "DRUG-412",
            Self::PrescriptionNotFound(_) => "RX-404",
            Self::StatusConflict(_) => "RX-409",
            Self::Database(_) | Self::Serialization(_) => "SYS-500",
        }
    }
}

impl From<rusqlite::Error> for PrescriptionError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::Sqlite(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(PrescriptionError::Validation("x".into()).code(), "VAL-001");
        assert_eq!(PrescriptionError::DrugNotFound(3).code(), "DRUG-404");
        assert_eq!(PrescriptionError::Contraindicated("x".into()).code(), "DRUG-412");
        assert_eq!(PrescriptionError::PrescriptionNotFound(1).code(), "RX-404");
        assert_eq!(PrescriptionError::StatusConflict("ISSUED".into()).code(), "RX-409");
        let db: PrescriptionError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(db.code(), "SYS-500");
    }

    #[test]
    fn rejection_message_carries_summary() {
        let err = PrescriptionError::Contraindicated("allergy: penicillin".into());
        assert_eq!(err.to_string(), "Contraindicated: allergy: penicillin");
    }
}
