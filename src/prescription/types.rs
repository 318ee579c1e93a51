use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PrescriptionError;
use crate::models::enums::{ContraStatus, PrescriptionStatus};
use crate::models::{ContraindicationAudit, Medicine, Prescription, PrescriptionItem};

/// Largest page a search returns.
pub const MAX_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionCreateRequest {
    #[serde(default)]
    pub consultation_id: Option<i64>,
    pub patient_id: i64,
    pub doctor_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<PrescriptionItemRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionItemRequest {
    pub drug_id: i64,
    #[serde(default)]
    pub dosage_instruction: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub day_supply: Option<i32>,
    #[serde(default)]
    pub quantity: Option<f64>,
}

impl PrescriptionCreateRequest {
    pub fn validate(&self) -> Result<(), PrescriptionError> {
        if self.patient_id <= 0 {
            return Err(PrescriptionError::Validation("patientId is required".into()));
        }
        if self.doctor_id <= 0 {
            return Err(PrescriptionError::Validation("doctorId is required".into()));
        }
        if self.items.is_empty() {
            return Err(PrescriptionError::Validation(
                "at least one item is required".into(),
            ));
        }
        for (index, item) in self.items.iter().enumerate() {
            item.validate()
                .map_err(|reason| PrescriptionError::Validation(format!("items[{index}]: {reason}")))?;
        }
        Ok(())
    }

    /// Distinct medicine ids in first-seen order.
    pub(crate) fn drug_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if !ids.contains(&item.drug_id) {
                ids.push(item.drug_id);
            }
        }
        ids
    }
}

impl PrescriptionItemRequest {
    fn validate(&self) -> Result<(), &'static str> {
        if self.drug_id <= 0 {
            return Err("drugId is required");
        }
        if self
            .dosage_instruction
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
        {
            return Err("dosageInstruction is required");
        }
        match self.day_supply {
            None => Err("daySupply is required"),
            Some(days) if days < 1 => Err("daySupply must be at least 1"),
            Some(_) => Ok(()),
        }
    }

    pub(crate) fn to_item(&self, prescription_id: i64) -> PrescriptionItem {
        PrescriptionItem {
            id: 0,
            prescription_id,
            medicine_id: self.drug_id,
            dosage_instruction: self.dosage_instruction.clone(),
            frequency: self.frequency.clone(),
            day_supply: self.day_supply,
            quantity: self.quantity,
            contra_result: ContraStatus::Pass,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: String,
}

impl StatusUpdateRequest {
    /// Case-insensitive status name. Blank or unknown names are validation errors.
    pub fn target(&self) -> Result<PrescriptionStatus, PrescriptionError> {
        let raw = self.status.trim();
        if raw.is_empty() {
            return Err(PrescriptionError::Validation("status is required".into()));
        }
        raw.to_uppercase()
            .parse::<PrescriptionStatus>()
            .map_err(|_| PrescriptionError::Validation(format!("unknown status: {raw}")))
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDetail {
    pub id: i64,
    pub consultation_id: Option<i64>,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub status: PrescriptionStatus,
    pub contra_status: ContraStatus,
    pub contra_fail_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub items: Vec<ItemView>,
    pub audits: Vec<AuditView>,
}

impl PrescriptionDetail {
    pub(crate) fn new(rx: Prescription, items: Vec<ItemView>, audits: Vec<AuditView>) -> Self {
        Self {
            id: rx.id,
            consultation_id: rx.consultation_id,
            patient_id: rx.patient_id,
            doctor_id: rx.doctor_id,
            status: rx.status,
            contra_status: rx.contra_check_status,
            contra_fail_reason: rx.contra_fail_reason,
            notes: rx.notes,
            created_at: rx.created_at,
            updated_at: rx.updated_at,
            items,
            audits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: i64,
    pub medicine_id: i64,
    pub generic_name: String,
    pub brand_name: Option<String>,
    pub dosage_instruction: Option<String>,
    pub frequency: Option<String>,
    pub day_supply: Option<i32>,
    pub quantity: Option<f64>,
    pub contra_result: ContraStatus,
    /// The medicine's raw contraindication text.
    pub contra_message: Option<String>,
}

impl ItemView {
    pub(crate) fn new(item: PrescriptionItem, medicine: &Medicine) -> Self {
        Self {
            id: item.id,
            medicine_id: item.medicine_id,
            generic_name: medicine.generic_name.clone(),
            brand_name: medicine.brand_name.clone(),
            dosage_instruction: item.dosage_instruction,
            frequency: item.frequency,
            day_supply: item.day_supply,
            quantity: item.quantity,
            contra_result: item.contra_result,
            contra_message: medicine.contraindications.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditView {
    pub id: Uuid,
    pub prescription_item_id: i64,
    pub checker: String,
    pub result: ContraStatus,
    pub message: String,
    pub violations: String,
    pub check_time: NaiveDateTime,
}

impl From<ContraindicationAudit> for AuditView {
    fn from(audit: ContraindicationAudit) -> Self {
        Self {
            id: audit.id,
            prescription_item_id: audit.prescription_item_id,
            checker: audit.checker,
            result: audit.result,
            message: audit.message,
            violations: audit.violations,
            check_time: audit.check_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionSummary {
    pub id: i64,
    pub consultation_id: Option<i64>,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub status: PrescriptionStatus,
    pub contra_status: ContraStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Prescription> for PrescriptionSummary {
    fn from(rx: Prescription) -> Self {
        Self {
            id: rx.id,
            consultation_id: rx.consultation_id,
            patient_id: rx.patient_id,
            doctor_id: rx.doctor_id,
            status: rx.status,
            contra_status: rx.contra_check_status,
            created_at: rx.created_at,
            updated_at: rx.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub size: u32,
}

/// Clamp a requested page to `page >= 0` and `1 <= size <= MAX_PAGE_SIZE`.
pub fn clamp_page(page: i64, size: i64) -> (u32, u32) {
    let page = page.clamp(0, i64::from(u32::MAX)) as u32;
    let size = size.clamp(1, i64::from(MAX_PAGE_SIZE)) as u32;
    (page, size)
}
