use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::{format_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::enums::{ContraStatus, PrescriptionStatus};
use crate::models::{Prescription, PrescriptionFilter, PrescriptionItem};

const PRESCRIPTION_COLUMNS: &str = "id, consultation_id, patient_id, doctor_id, status, notes,
     contra_check_status, contra_fail_reason, created_at, updated_at";

const FILTER_CLAUSE: &str = "(?1 IS NULL OR consultation_id = ?1)
     AND (?2 IS NULL OR patient_id = ?2)
     AND (?3 IS NULL OR doctor_id = ?3)
     AND (?4 IS NULL OR status = ?4)";

/// Insert a prescription header. The id field is ignored; returns the new id.
pub fn insert_prescription(conn: &Connection, rx: &Prescription) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (consultation_id, patient_id, doctor_id, status, notes,
         contra_check_status, contra_fail_reason, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            rx.consultation_id,
            rx.patient_id,
            rx.doctor_id,
            rx.status.as_str(),
            rx.notes,
            rx.contra_check_status.as_str(),
            rx.contra_fail_reason,
            format_datetime(&rx.created_at),
            format_datetime(&rx.updated_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_prescription(conn: &Connection, id: i64) -> Result<Option<Prescription>, DatabaseError> {
    let sql = format!("SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], prescription_row_from_rusqlite)
        .optional()?;
    row.map(prescription_from_row).transpose()
}

/// Store the outcome of a contraindication check on the header.
pub fn update_prescription_contra(
    conn: &Connection,
    id: i64,
    status: ContraStatus,
    fail_reason: Option<&str>,
    updated_at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET contra_check_status = ?1, contra_fail_reason = ?2, updated_at = ?3
         WHERE id = ?4",
        params![status.as_str(), fail_reason, format_datetime(updated_at), id],
    )?;
    ensure_found(changed, id)
}

pub fn update_prescription_status(
    conn: &Connection,
    id: i64,
    status: PrescriptionStatus,
    updated_at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), format_datetime(updated_at), id],
    )?;
    ensure_found(changed, id)
}

/// One page of prescriptions matching `filter`, newest first.
pub fn search_prescriptions(
    conn: &Connection,
    filter: &PrescriptionFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Prescription>, DatabaseError> {
    let sql = format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE {FILTER_CLAUSE}
         ORDER BY created_at DESC, id DESC LIMIT ?5 OFFSET ?6"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            filter.consultation_id,
            filter.patient_id,
            filter.doctor_id,
            filter.status.map(|s| s.as_str()),
            limit,
            offset,
        ],
        prescription_row_from_rusqlite,
    )?;

    let mut prescriptions = Vec::new();
    for row in rows {
        prescriptions.push(prescription_from_row(row?)?);
    }
    Ok(prescriptions)
}

pub fn count_prescriptions(
    conn: &Connection,
    filter: &PrescriptionFilter,
) -> Result<i64, DatabaseError> {
    let sql = format!("SELECT COUNT(*) FROM prescriptions WHERE {FILTER_CLAUSE}");
    let count = conn.query_row(
        &sql,
        params![
            filter.consultation_id,
            filter.patient_id,
            filter.doctor_id,
            filter.status.map(|s| s.as_str()),
        ],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Insert an item at position `item_index` of its prescription. Returns the new id.
pub fn insert_prescription_item(
    conn: &Connection,
    item: &PrescriptionItem,
    item_index: usize,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescription_items (prescription_id, item_index, medicine_id,
         dosage_instruction, frequency, day_supply, quantity, contra_result)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            item.prescription_id,
            item_index as i64,
            item.medicine_id,
            item.dosage_instruction,
            item.frequency,
            item.day_supply,
            item.quantity,
            item.contra_result.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Items of a prescription in their original order.
pub fn get_prescription_items(
    conn: &Connection,
    prescription_id: i64,
) -> Result<Vec<PrescriptionItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, prescription_id, medicine_id, dosage_instruction, frequency, day_supply,
         quantity, contra_result
         FROM prescription_items WHERE prescription_id = ?1 ORDER BY item_index",
    )?;
    let rows = stmt.query_map(params![prescription_id], |row| {
        Ok((
            PrescriptionItem {
                id: row.get(0)?,
                prescription_id: row.get(1)?,
                medicine_id: row.get(2)?,
                dosage_instruction: row.get(3)?,
                frequency: row.get(4)?,
                day_supply: row.get(5)?,
                quantity: row.get(6)?,
                contra_result: ContraStatus::Pass,
            },
            row.get::<_, String>(7)?,
        ))
    })?;

    let mut items = Vec::new();
    for row in rows {
        let (mut item, contra_result) = row?;
        item.contra_result = ContraStatus::from_str(&contra_result)?;
        items.push(item);
    }
    Ok(items)
}

pub fn update_item_contra_result(
    conn: &Connection,
    item_id: i64,
    result: ContraStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescription_items SET contra_result = ?1 WHERE id = ?2",
        params![result.as_str(), item_id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "PrescriptionItem".into(),
            id: item_id.to_string(),
        });
    }
    Ok(())
}

fn ensure_found(changed: usize, id: i64) -> Result<(), DatabaseError> {
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct PrescriptionRow {
    id: i64,
    consultation_id: Option<i64>,
    patient_id: i64,
    doctor_id: i64,
    status: String,
    notes: Option<String>,
    contra_check_status: String,
    contra_fail_reason: Option<String>,
    created_at: String,
    updated_at: String,
}

fn prescription_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PrescriptionRow, rusqlite::Error> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        consultation_id: row.get(1)?,
        patient_id: row.get(2)?,
        doctor_id: row.get(3)?,
        status: row.get(4)?,
        notes: row.get(5)?,
        contra_check_status: row.get(6)?,
        contra_fail_reason: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn prescription_from_row(row: PrescriptionRow) -> Result<Prescription, DatabaseError> {
    Ok(Prescription {
        id: row.id,
        consultation_id: row.consultation_id,
        patient_id: row.patient_id,
        doctor_id: row.doctor_id,
        status: PrescriptionStatus::from_str(&row.status)?,
        notes: row.notes,
        contra_check_status: ContraStatus::from_str(&row.contra_check_status)?,
        contra_fail_reason: row.contra_fail_reason,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_medicine;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Medicine;

    fn at(day: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 4, day)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn draft(patient_id: i64, doctor_id: i64, day: u32) -> Prescription {
        Prescription {
            id: 0,
            consultation_id: Some(patient_id * 10),
            patient_id,
            doctor_id,
            status: PrescriptionStatus::Draft,
            notes: None,
            contra_check_status: ContraStatus::Pass,
            contra_fail_reason: None,
            created_at: at(day),
            updated_at: at(day),
        }
    }

    fn seed_medicine(conn: &Connection) -> i64 {
        insert_medicine(
            conn,
            &Medicine {
                generic_name: "Ibuprofen".into(),
                version: 1,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn prescription_round_trip() {
        let conn = open_memory_database().unwrap();
        let id = insert_prescription(&conn, &draft(1, 2, 1)).unwrap();
        let stored = get_prescription(&conn, id).unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.status, PrescriptionStatus::Draft);
        assert_eq!(stored.created_at, at(1));
        assert_eq!(stored.consultation_id, Some(10));
        assert!(get_prescription(&conn, id + 1).unwrap().is_none());
    }

    #[test]
    fn contra_and_status_updates() {
        let conn = open_memory_database().unwrap();
        let id = insert_prescription(&conn, &draft(1, 2, 1)).unwrap();

        update_prescription_contra(&conn, id, ContraStatus::Warn, Some("check"), &at(2)).unwrap();
        update_prescription_status(&conn, id, PrescriptionStatus::Issued, &at(3)).unwrap();

        let stored = get_prescription(&conn, id).unwrap().unwrap();
        assert_eq!(stored.contra_check_status, ContraStatus::Warn);
        assert_eq!(stored.contra_fail_reason.as_deref(), Some("check"));
        assert_eq!(stored.status, PrescriptionStatus::Issued);
        assert_eq!(stored.updated_at, at(3));

        let err = update_prescription_status(&conn, 999, PrescriptionStatus::Issued, &at(3));
        assert!(matches!(err, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn items_keep_insertion_order() {
        let conn = open_memory_database().unwrap();
        let med = seed_medicine(&conn);
        let rx = insert_prescription(&conn, &draft(1, 2, 1)).unwrap();

        let mut ids = Vec::new();
        for (index, days) in [3, 1, 2].into_iter().enumerate() {
            let item = PrescriptionItem {
                id: 0,
                prescription_id: rx,
                medicine_id: med,
                dosage_instruction: Some(format!("{days} per day")),
                frequency: Some("daily".into()),
                day_supply: Some(days),
                quantity: None,
                contra_result: ContraStatus::Pass,
            };
            ids.push(insert_prescription_item(&conn, &item, index).unwrap());
        }
        update_item_contra_result(&conn, ids[1], ContraStatus::Fail).unwrap();

        let items = get_prescription_items(&conn, rx).unwrap();
        let supplies: Vec<_> = items.iter().map(|i| i.day_supply).collect();
        assert_eq!(supplies, vec![Some(3), Some(1), Some(2)]);
        assert_eq!(items[1].contra_result, ContraStatus::Fail);
        assert_eq!(items[0].contra_result, ContraStatus::Pass);
    }

    #[test]
    fn item_requires_known_medicine() {
        let conn = open_memory_database().unwrap();
        let rx = insert_prescription(&conn, &draft(1, 2, 1)).unwrap();
        let item = PrescriptionItem {
            id: 0,
            prescription_id: rx,
            medicine_id: 404,
            dosage_instruction: None,
            frequency: None,
            day_supply: None,
            quantity: None,
            contra_result: ContraStatus::Pass,
        };
        assert!(insert_prescription_item(&conn, &item, 0).is_err());
    }

    #[test]
    fn search_filters_and_pages() {
        let conn = open_memory_database().unwrap();
        for day in 1..=5 {
            insert_prescription(&conn, &draft(1, 7, day)).unwrap();
        }
        let other = insert_prescription(&conn, &draft(2, 8, 6)).unwrap();
        update_prescription_status(&conn, other, PrescriptionStatus::Cancelled, &at(6)).unwrap();

        let by_patient = PrescriptionFilter {
            patient_id: Some(1),
            ..Default::default()
        };
        assert_eq!(count_prescriptions(&conn, &by_patient).unwrap(), 5);

        let first_page = search_prescriptions(&conn, &by_patient, 2, 0).unwrap();
        assert_eq!(first_page.len(), 2);
        assert_eq!(first_page[0].created_at, at(5));
        let last_page = search_prescriptions(&conn, &by_patient, 2, 4).unwrap();
        assert_eq!(last_page.len(), 1);
        assert_eq!(last_page[0].created_at, at(1));

        let cancelled = PrescriptionFilter {
            status: Some(PrescriptionStatus::Cancelled),
            ..Default::default()
        };
        let found = search_prescriptions(&conn, &cancelled, 10, 0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, other);

        assert_eq!(count_prescriptions(&conn, &PrescriptionFilter::default()).unwrap(), 6);
    }

    #[test]
    fn search_by_issued_status() {
        let conn = open_memory_database().unwrap();
        let issued_a = insert_prescription(&conn, &draft(1, 7, 1)).unwrap();
        let issued_b = insert_prescription(&conn, &draft(2, 7, 2)).unwrap();
        insert_prescription(&conn, &draft(1, 7, 3)).unwrap();
        for id in [issued_a, issued_b] {
            update_prescription_status(&conn, id, PrescriptionStatus::Issued, &at(4)).unwrap();
        }

        let issued = PrescriptionFilter {
            status: Some(PrescriptionStatus::Issued),
            ..Default::default()
        };
        assert_eq!(count_prescriptions(&conn, &issued).unwrap(), 2);
        let ids: Vec<_> = search_prescriptions(&conn, &issued, 10, 0)
            .unwrap()
            .into_iter()
            .map(|rx| rx.id)
            .collect();
        assert_eq!(ids, vec![issued_b, issued_a]);

        let issued_for_patient = PrescriptionFilter {
            patient_id: Some(1),
            ..issued.clone()
        };
        assert_eq!(count_prescriptions(&conn, &issued_for_patient).unwrap(), 1);
        let found = search_prescriptions(&conn, &issued_for_patient, 10, 0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, issued_a);
        assert_eq!(found[0].status, PrescriptionStatus::Issued);
    }
}
