use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use super::error::PrescriptionError;
use super::traits::{ContraAlerting, MedicineCatalog, ProfileDirectory};
use super::types::{
    clamp_page, AuditView, ItemView, Page, PrescriptionCreateRequest, PrescriptionDetail,
    PrescriptionSummary, StatusUpdateRequest,
};
use crate::contra::{ContraViolation, ContraindicationEvaluator, ContraindicationReport};
use crate::db::repository::{
    count_prescriptions, get_contra_audits, get_prescription, get_prescription_items,
    insert_contra_audits, insert_prescription, insert_prescription_item, insert_trail_events,
    search_prescriptions, update_item_contra_result, update_prescription_contra,
    update_prescription_status,
};
use crate::models::enums::{ContraStatus, PrescriptionStatus, ViolationType};
use crate::models::{
    ContraindicationAudit, HealthProfile, Medicine, PatientSnapshot, Prescription,
    PrescriptionFilter, PrescriptionItem, TrailEvent, SYSTEM_CHECKER,
};

/// Source recorded on every trail event written here.
const TRAIL_SOURCE: &str = "prescription";

pub const ACTION_CREATED: &str = "PRESCRIPTION_CREATED";
pub const ACTION_STATUS_CHANGED: &str = "PRESCRIPTION_STATUS_CHANGED";
pub const ACTION_RECHECKED: &str = "PRESCRIPTION_RECHECKED";

/// Trail entity key of a prescription.
pub fn trail_entity(prescription_id: i64) -> String {
    format!("prescription:{prescription_id}")
}

/// Audit payload of one violation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViolationPayload<'a> {
    item_index: usize,
    medicine_id: i64,
    #[serde(rename = "type")]
    violation_type: ViolationType,
    level: ContraStatus,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    generic_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand_name: Option<&'a str>,
}

/// Prescription lifecycle around the contraindication engine.
///
/// Every mutating operation runs in one transaction on the caller's
/// connection. A FAIL verdict alerts and returns `Contraindicated` without
/// committing, so nothing of the rejected attempt is persisted.
pub struct PrescriptionService {
    evaluator: Arc<dyn ContraindicationEvaluator>,
    catalog: Arc<dyn MedicineCatalog>,
    profiles: Arc<dyn ProfileDirectory>,
    alerting: Arc<dyn ContraAlerting>,
}

impl PrescriptionService {
    pub fn new(
        evaluator: Arc<dyn ContraindicationEvaluator>,
        catalog: Arc<dyn MedicineCatalog>,
        profiles: Arc<dyn ProfileDirectory>,
        alerting: Arc<dyn ContraAlerting>,
    ) -> Self {
        Self {
            evaluator,
            catalog,
            profiles,
            alerting,
        }
    }

    /// Create a DRAFT prescription, evaluate it and audit every violation.
    pub fn create(
        &self,
        conn: &Connection,
        request: &PrescriptionCreateRequest,
    ) -> Result<PrescriptionDetail, PrescriptionError> {
        request.validate()?;

        let tx = conn.unchecked_transaction()?;
        let now = now();

        let profile = self.profiles.profile_of(&tx, request.patient_id)?;
        let mut rx = Prescription {
            id: 0,
            consultation_id: request.consultation_id,
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            status: PrescriptionStatus::Draft,
            notes: request.notes.clone(),
            contra_check_status: ContraStatus::Pass,
            contra_fail_reason: None,
            created_at: now,
            updated_at: now,
        };
        rx.id = insert_prescription(&tx, &rx)?;

        let medicine_by_id = self.load_medicines(&tx, &request.drug_ids())?;
        for (index, item) in request.items.iter().enumerate() {
            insert_prescription_item(&tx, &item.to_item(rx.id), index)?;
        }
        let mut items = get_prescription_items(&tx, rx.id)?;

        let report =
            self.evaluate_and_audit(&tx, &rx, &mut items, &medicine_by_id, profile.as_ref(), now)?;
        if report.is_rejected() {
            return Err(self.reject(rx.id, report));
        }

        update_prescription_contra(&tx, rx.id, report.status, Some(&report.summary), &now)?;
        insert_trail_events(&tx, &[trail_event(ACTION_CREATED, &rx, now)])?;
        tx.commit()?;

        tracing::info!(
            prescription_id = rx.id,
            items = items.len(),
            status = report.status.as_str(),
            "Prescription created"
        );

        self.detail(conn, rx.id)
    }

    /// Prescription with its items (medicine names resolved) and audits.
    pub fn detail(&self, conn: &Connection, id: i64) -> Result<PrescriptionDetail, PrescriptionError> {
        let rx = get_prescription(conn, id)?.ok_or(PrescriptionError::PrescriptionNotFound(id))?;
        let items = get_prescription_items(conn, id)?;
        let medicine_by_id = self.load_medicines(conn, &medicine_ids(&items))?;

        let item_views = items
            .into_iter()
            .map(|item| match medicine_by_id.get(&item.medicine_id) {
                Some(medicine) => Ok(ItemView::new(item, medicine)),
                None => Err(PrescriptionError::DrugNotFound(item.medicine_id)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let audits = get_contra_audits(conn, id)?
            .into_iter()
            .map(AuditView::from)
            .collect();

        Ok(PrescriptionDetail::new(rx, item_views, audits))
    }

    /// One page of prescription summaries, newest first.
    pub fn search(
        &self,
        conn: &Connection,
        filter: &PrescriptionFilter,
        page: i64,
        size: i64,
    ) -> Result<Page<PrescriptionSummary>, PrescriptionError> {
        let (page, size) = clamp_page(page, size);
        let offset = i64::from(page) * i64::from(size);

        let items = search_prescriptions(conn, filter, i64::from(size), offset)?
            .into_iter()
            .map(PrescriptionSummary::from)
            .collect();
        let total = count_prescriptions(conn, filter)?;

        Ok(Page {
            items,
            total,
            page,
            size,
        })
    }

    /// Move a DRAFT prescription to a new status. Issuing requires a
    /// persisted verdict other than FAIL.
    pub fn update_status(
        &self,
        conn: &Connection,
        id: i64,
        request: &StatusUpdateRequest,
    ) -> Result<PrescriptionDetail, PrescriptionError> {
        let tx = conn.unchecked_transaction()?;
        let rx = get_prescription(&tx, id)?.ok_or(PrescriptionError::PrescriptionNotFound(id))?;

        let target = request.target()?;
        if rx.status.is_final() {
            return Err(PrescriptionError::StatusConflict(rx.status.to_string()));
        }
        if target == PrescriptionStatus::Issued && rx.contra_check_status == ContraStatus::Fail {
            return Err(PrescriptionError::Contraindicated(
                "contraindication check failed, prescription cannot be issued".into(),
            ));
        }

        let now = now();
        update_prescription_status(&tx, id, target, &now)?;
        insert_trail_events(&tx, &[trail_event(ACTION_STATUS_CHANGED, &rx, now)])?;
        tx.commit()?;

        tracing::info!(
            prescription_id = id,
            from = rx.status.as_str(),
            to = target.as_str(),
            "Prescription status changed"
        );

        self.detail(conn, id)
    }

    /// Re-evaluate a stored DRAFT prescription against the current catalog and
    /// profile. New findings are merged into the stored item and prescription
    /// results, which never go down, and new audits are appended.
    pub fn recheck(&self, conn: &Connection, id: i64) -> Result<PrescriptionDetail, PrescriptionError> {
        let tx = conn.unchecked_transaction()?;
        let rx = get_prescription(&tx, id)?.ok_or(PrescriptionError::PrescriptionNotFound(id))?;
        if rx.status != PrescriptionStatus::Draft {
            return Err(PrescriptionError::StatusConflict(rx.status.to_string()));
        }

        let mut items = get_prescription_items(&tx, id)?;
        let medicine_by_id = self.load_medicines(&tx, &medicine_ids(&items))?;
        let profile = self.profiles.profile_of(&tx, rx.patient_id)?;
        let now = now();

        let report =
            self.evaluate_and_audit(&tx, &rx, &mut items, &medicine_by_id, profile.as_ref(), now)?;
        if report.is_rejected() {
            return Err(self.reject(rx.id, report));
        }

        let status = rx.contra_check_status.merge(report.status);
        let reason = if status == report.status {
            Some(report.summary.as_str())
        } else {
            rx.contra_fail_reason.as_deref()
        };
        update_prescription_contra(&tx, id, status, reason, &now)?;
        insert_trail_events(&tx, &[trail_event(ACTION_RECHECKED, &rx, now)])?;
        tx.commit()?;

        tracing::info!(
            prescription_id = id,
            previous = rx.contra_check_status.as_str(),
            status = status.as_str(),
            "Prescription rechecked"
        );

        self.detail(conn, id)
    }

    /// Resolve every id or fail on the first unknown one.
    fn load_medicines(
        &self,
        conn: &Connection,
        ids: &[i64],
    ) -> Result<HashMap<i64, Medicine>, PrescriptionError> {
        let found = self.catalog.medicines_by_ids(conn, ids)?;
        if let Some(missing) = ids.iter().find(|id| !found.contains_key(id)) {
            return Err(PrescriptionError::DrugNotFound(*missing));
        }
        Ok(found)
    }

    /// Evaluate, write one audit per violation, and store each item's result
    /// (its stored result joined with its violation levels) where it changed.
    fn evaluate_and_audit(
        &self,
        conn: &Connection,
        rx: &Prescription,
        items: &mut [PrescriptionItem],
        medicine_by_id: &HashMap<i64, Medicine>,
        profile: Option<&HealthProfile>,
        now: NaiveDateTime,
    ) -> Result<ContraindicationReport, PrescriptionError> {
        let report = self.evaluator.evaluate(rx, items, medicine_by_id, profile);

        let snapshot = profile
            .map(|p| serde_json::to_string(&PatientSnapshot::of(p)))
            .transpose()?;

        let mut results: Vec<ContraStatus> = items.iter().map(|item| item.contra_result).collect();
        let mut audits = Vec::with_capacity(report.violations.len());
        for violation in &report.violations {
            let Some(item) = items.get(violation.item_index) else {
                continue;
            };
            results[violation.item_index] = results[violation.item_index].merge(violation.level);
            audits.push(ContraindicationAudit {
                id: Uuid::new_v4(),
                prescription_id: rx.id,
                prescription_item_id: item.id,
                check_time: now,
                checker: SYSTEM_CHECKER.to_string(),
                patient_snapshot: snapshot.clone(),
                violations: violation_payload(violation, medicine_by_id)?,
                result: violation.level,
                message: violation.message.clone(),
            });
        }
        insert_contra_audits(conn, &audits)?;

        let mut updated = 0usize;
        for (item, result) in items.iter_mut().zip(results) {
            if item.contra_result != result {
                item.contra_result = result;
                update_item_contra_result(conn, item.id, result)?;
                updated += 1;
            }
        }

        tracing::debug!(
            prescription_id = rx.id,
            audits = audits.len(),
            items_updated = updated,
            "Contraindication audits written"
        );

        Ok(report)
    }

    /// Alert on a FAIL verdict and turn it into the rejection error. The
    /// caller's transaction is dropped uncommitted.
    fn reject(&self, prescription_id: i64, report: ContraindicationReport) -> PrescriptionError {
        self.alerting.contraindication_rejected(prescription_id, &report);
        tracing::warn!(
            prescription_id,
            violations = report.violations.len(),
            "Prescription rejected by contraindication check"
        );
        PrescriptionError::Contraindicated(report.summary)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn medicine_ids(items: &[PrescriptionItem]) -> Vec<i64> {
    let mut ids: Vec<i64> = items.iter().map(|item| item.medicine_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn trail_event(action: &str, rx: &Prescription, timestamp: NaiveDateTime) -> TrailEvent {
    TrailEvent {
        timestamp,
        source: TRAIL_SOURCE.to_string(),
        action: action.to_string(),
        entity: trail_entity(rx.id),
        actor_id: Some(rx.doctor_id),
    }
}

fn violation_payload(
    violation: &ContraViolation,
    medicine_by_id: &HashMap<i64, Medicine>,
) -> Result<String, serde_json::Error> {
    let medicine = medicine_by_id.get(&violation.medicine_id);
    serde_json::to_string(&ViolationPayload {
        item_index: violation.item_index,
        medicine_id: violation.medicine_id,
        violation_type: violation.violation_type,
        level: violation.level,
        message: &violation.message,
        generic_name: medicine.map(|m| m.generic_name.as_str()),
        brand_name: medicine.map(|m| m.brand_name.as_deref().unwrap_or_default()),
    })
}
