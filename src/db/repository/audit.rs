use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::enums::ContraStatus;
use crate::models::{ContraindicationAudit, TrailEvent};

/// Append contraindication audits. Records are never updated or deleted.
pub fn insert_contra_audits(
    conn: &Connection,
    audits: &[ContraindicationAudit],
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO contraindication_audits (id, prescription_id, prescription_item_id,
         check_time, checker, patient_snapshot, violations, result, message)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for audit in audits {
        stmt.execute(params![
            audit.id.to_string(),
            audit.prescription_id,
            audit.prescription_item_id,
            format_datetime(&audit.check_time),
            audit.checker,
            audit.patient_snapshot,
            audit.violations,
            audit.result.as_str(),
            audit.message,
        ])?;
    }
    Ok(())
}

/// Audits of a prescription, oldest first.
pub fn get_contra_audits(
    conn: &Connection,
    prescription_id: i64,
) -> Result<Vec<ContraindicationAudit>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, prescription_id, prescription_item_id, check_time, checker,
         patient_snapshot, violations, result, message
         FROM contraindication_audits WHERE prescription_id = ?1
         ORDER BY check_time, rowid",
    )?;
    let rows = stmt.query_map(params![prescription_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, String>(8)?,
        ))
    })?;

    let mut audits = Vec::new();
    for row in rows {
        let (id, prescription_id, prescription_item_id, check_time, checker, snapshot, violations, result, message) =
            row?;
        audits.push(ContraindicationAudit {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            prescription_id,
            prescription_item_id,
            check_time: parse_datetime(&check_time)?,
            checker,
            patient_snapshot: snapshot,
            violations,
            result: ContraStatus::from_str(&result)?,
            message,
        });
    }
    Ok(audits)
}

/// Insert a batch of trail events into the audit_log table.
pub fn insert_trail_events(conn: &Connection, events: &[TrailEvent]) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO audit_log (timestamp, source, action, entity, actor_id) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for event in events {
        stmt.execute(params![
            format_datetime(&event.timestamp),
            event.source,
            event.action,
            event.entity,
            event.actor_id,
        ])?;
    }
    Ok(())
}

/// Trail events recorded for an entity, oldest first.
pub fn query_trail_by_entity(conn: &Connection, entity: &str) -> Result<Vec<TrailEvent>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT timestamp, source, action, entity, actor_id FROM audit_log
         WHERE entity = ?1
         ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![entity], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<i64>>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(timestamp, source, action, entity, actor_id)| {
            Ok(TrailEvent {
                timestamp: parse_datetime(&timestamp)?,
                source,
                action,
                entity,
                actor_id,
            })
        })
        .collect()
}
