use std::collections::HashMap;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::Medicine;

const MEDICINE_COLUMNS: &str = "id, generic_name, brand_name, indications, contraindications,
     dosage_guideline, drug_interactions, tags, version";

/// Insert a catalog medicine. A non-positive id lets SQLite assign one.
/// Returns the stored id.
pub fn insert_medicine(conn: &Connection, medicine: &Medicine) -> Result<i64, DatabaseError> {
    let id = (medicine.id > 0).then_some(medicine.id);
    conn.execute(
        "INSERT INTO medicines (id, generic_name, brand_name, indications, contraindications,
         dosage_guideline, drug_interactions, tags, version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            medicine.generic_name,
            medicine.brand_name,
            medicine.indications,
            medicine.contraindications,
            medicine.dosage_guideline,
            medicine.drug_interactions,
            medicine.tags,
            medicine.version,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_medicine(conn: &Connection, id: i64) -> Result<Option<Medicine>, DatabaseError> {
    let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1");
    let medicine = conn
        .query_row(&sql, params![id], medicine_from_rusqlite)
        .optional()?;
    Ok(medicine)
}

/// Load every listed medicine that exists. Unknown ids are simply absent from
/// the returned map.
pub fn get_medicines_by_ids(
    conn: &Connection,
    ids: &[i64],
) -> Result<HashMap<i64, Medicine>, DatabaseError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id IN ({placeholders})");
    let mut stmt = conn.prepare(&sql)?;
    let medicines = stmt
        .query_map(params_from_iter(ids.iter()), medicine_from_rusqlite)?
        .map(|row| row.map(|m| (m.id, m)))
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(medicines)
}

fn medicine_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<Medicine, rusqlite::Error> {
    Ok(Medicine {
        id: row.get(0)?,
        generic_name: row.get(1)?,
        brand_name: row.get(2)?,
        indications: row.get(3)?,
        contraindications: row.get(4)?,
        dosage_guideline: row.get(5)?,
        drug_interactions: row.get(6)?,
        tags: row.get(7)?,
        version: row.get(8)?,
    })
}
