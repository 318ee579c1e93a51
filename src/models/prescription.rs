use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{ContraStatus, PrescriptionStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: i64,
    pub consultation_id: Option<i64>,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub status: PrescriptionStatus,
    pub notes: Option<String>,
    pub contra_check_status: ContraStatus,
    pub contra_fail_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One medicine line of a prescription. Its position in the evaluated list is
/// the `item_index` that violations refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionItem {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub prescription_id: i64,
    pub medicine_id: i64,
    #[serde(default)]
    pub dosage_instruction: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub day_supply: Option<i32>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub contra_result: ContraStatus,
}
