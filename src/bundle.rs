//! Standalone evaluation input: items, the catalog entries they reference and
//! an optional profile, read from JSON without touching the database.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contra::{ContraindicationEvaluator, ContraindicationReport};
use crate::models::enums::{ContraStatus, PrescriptionStatus};
use crate::models::{HealthProfile, Medicine, Prescription, PrescriptionItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationBundle {
    #[serde(default)]
    pub patient_id: i64,
    #[serde(default)]
    pub doctor_id: i64,
    pub items: Vec<PrescriptionItem>,
    #[serde(default)]
    pub medicines: Vec<Medicine>,
    #[serde(default)]
    pub profile: Option<HealthProfile>,
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Cannot read bundle {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bundle: {0}")]
    Parse(#[from] serde_json::Error),
}

impl EvaluationBundle {
    pub fn from_json_file(path: &Path) -> Result<Self, BundleError> {
        let raw = std::fs::read_to_string(path).map_err(|source| BundleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Unsaved DRAFT header the items belong to.
    fn draft(&self, now: NaiveDateTime) -> Prescription {
        Prescription {
            id: 0,
            consultation_id: None,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            status: PrescriptionStatus::Draft,
            notes: None,
            contra_check_status: ContraStatus::Pass,
            contra_fail_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn evaluate(&self, evaluator: &dyn ContraindicationEvaluator) -> ContraindicationReport {
        let medicine_by_id: HashMap<i64, Medicine> = self
            .medicines
            .iter()
            .map(|m| (m.id, m.clone()))
            .collect();
        let prescription = self.draft(Utc::now().naive_utc());
        evaluator.evaluate(&prescription, &self.items, &medicine_by_id, self.profile.as_ref())
    }
}
