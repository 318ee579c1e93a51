use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::enums::{ContraStatus, ViolationType};
use crate::models::{HealthProfile, Medicine, Prescription, PrescriptionItem};

use super::report::ContraindicationReport;

// ---------------------------------------------------------------------------
// ContraViolation
// ---------------------------------------------------------------------------

/// One rule finding, attributed to a position in the evaluated item list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContraViolation {
    pub item_index: usize,
    pub medicine_id: i64,
    pub medicine_name: String,
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    pub level: ContraStatus,
    pub message: String,
}

impl ContraViolation {
    pub fn new(
        item_index: usize,
        medicine: &Medicine,
        violation_type: ViolationType,
        level: ContraStatus,
        message: String,
    ) -> Self {
        Self {
            item_index,
            medicine_id: medicine.id,
            medicine_name: medicine.generic_name.clone(),
            violation_type,
            level,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// ContraindicationEvaluator trait
// ---------------------------------------------------------------------------

/// A contraindication rule set.
///
/// Implementations must be pure: no I/O, no shared mutable state, and no
/// failure mode. Items whose medicine is missing from `medicine_by_id` are
/// skipped. Callers hold evaluators as `Arc<dyn ContraindicationEvaluator>`
/// so alternative rule sets can be swapped in without touching them.
pub trait ContraindicationEvaluator: Send + Sync {
    fn evaluate(
        &self,
        prescription: &Prescription,
        items: &[PrescriptionItem],
        medicine_by_id: &HashMap<i64, Medicine>,
        profile: Option<&HealthProfile>,
    ) -> ContraindicationReport;
}
