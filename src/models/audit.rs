use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ContraStatus;

/// Checker recorded on audits written by the evaluation engine.
pub const SYSTEM_CHECKER: &str = "SYSTEM";

/// Append-only record of one contraindication violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContraindicationAudit {
    pub id: Uuid,
    pub prescription_id: i64,
    pub prescription_item_id: i64,
    pub check_time: NaiveDateTime,
    pub checker: String,
    /// JSON of the consulted profile fields, absent when there was no profile.
    pub patient_snapshot: Option<String>,
    /// JSON payload of the violation.
    pub violations: String,
    pub result: ContraStatus,
    pub message: String,
}

/// General audit-trail event (prescription created, status changed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailEvent {
    pub timestamp: NaiveDateTime,
    pub source: String,
    pub action: String,
    pub entity: String,
    pub actor_id: Option<i64>,
}
