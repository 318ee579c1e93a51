use std::collections::HashMap;

use rusqlite::Connection;

use crate::contra::ContraindicationReport;
use crate::db::DatabaseError;
use crate::models::{HealthProfile, Medicine};

/// Source of catalog medicines.
pub trait MedicineCatalog: Send + Sync {
    /// Resolve the listed ids. Unknown ids are absent from the map.
    fn medicines_by_ids(
        &self,
        conn: &Connection,
        ids: &[i64],
    ) -> Result<HashMap<i64, Medicine>, DatabaseError>;
}

/// Source of patient health profiles.
pub trait ProfileDirectory: Send + Sync {
    fn profile_of(
        &self,
        conn: &Connection,
        patient_id: i64,
    ) -> Result<Option<HealthProfile>, DatabaseError>;
}

/// Notified when a prescription is rejected by the contraindication check.
/// Called before the rejecting transaction is rolled back.
pub trait ContraAlerting: Send + Sync {
    fn contraindication_rejected(&self, prescription_id: i64, report: &ContraindicationReport);
}
