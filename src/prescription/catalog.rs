use std::collections::HashMap;

use rusqlite::Connection;

use super::traits::{MedicineCatalog, ProfileDirectory};
use crate::db::repository::{get_medicines_by_ids, get_profile_by_user};
use crate::db::DatabaseError;
use crate::models::{HealthProfile, Medicine};

/// Medicine catalog backed by the `medicines` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteMedicineCatalog;

impl MedicineCatalog for SqliteMedicineCatalog {
    fn medicines_by_ids(
        &self,
        conn: &Connection,
        ids: &[i64],
    ) -> Result<HashMap<i64, Medicine>, DatabaseError> {
        get_medicines_by_ids(conn, ids)
    }
}

/// Profile directory backed by the `health_profiles` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteProfileDirectory;

impl ProfileDirectory for SqliteProfileDirectory {
    fn profile_of(
        &self,
        conn: &Connection,
        patient_id: i64,
    ) -> Result<Option<HealthProfile>, DatabaseError> {
        get_profile_by_user(conn, patient_id)
    }
}
