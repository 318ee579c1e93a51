use serde::{Deserialize, Serialize};

use super::enums::PrescriptionStatus;

/// Prescription search criteria. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionFilter {
    #[serde(default)]
    pub consultation_id: Option<i64>,
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub status: Option<PrescriptionStatus>,
}
