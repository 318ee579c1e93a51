use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::HealthProfile;

/// Insert or replace the health profile of `profile.user_id`.
pub fn upsert_profile(conn: &Connection, profile: &HealthProfile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO health_profiles (user_id, birth_date, blood_type, chronic_diseases,
         allergy_history, genetic_risk, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
         ON CONFLICT(user_id) DO UPDATE SET
            birth_date = excluded.birth_date,
            blood_type = excluded.blood_type,
            chronic_diseases = excluded.chronic_diseases,
            allergy_history = excluded.allergy_history,
            genetic_risk = excluded.genetic_risk,
            updated_at = excluded.updated_at",
        params![
            profile.user_id,
            profile.birth_date.map(|d| d.to_string()),
            profile.blood_type,
            profile.chronic_diseases,
            profile.allergy_history,
            profile.genetic_risk,
        ],
    )?;
    Ok(())
}

pub fn get_profile_by_user(
    conn: &Connection,
    user_id: i64,
) -> Result<Option<HealthProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            "SELECT user_id, birth_date, blood_type, chronic_diseases, allergy_history, genetic_risk
             FROM health_profiles WHERE user_id = ?1",
            params![user_id],
            |row| {
                let birth_date: Option<String> = row.get(1)?;
                Ok(HealthProfile {
                    user_id: row.get(0)?,
                    birth_date: birth_date
                        .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                    blood_type: row.get(2)?,
                    chronic_diseases: row.get(3)?,
                    allergy_history: row.get(4)?,
                    genetic_risk: row.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn upsert_then_read() {
        let conn = open_memory_database().unwrap();
        let profile = HealthProfile {
            user_id: 5,
            birth_date: NaiveDate::from_ymd_opt(1985, 2, 3),
            blood_type: Some("A".into()),
            chronic_diseases: Some("asthma".into()),
            allergy_history: Some("penicillin".into()),
            genetic_risk: None,
        };
        upsert_profile(&conn, &profile).unwrap();
        assert_eq!(get_profile_by_user(&conn, 5).unwrap(), Some(profile.clone()));

        let updated = HealthProfile {
            blood_type: Some("B".into()),
            ..profile
        };
        upsert_profile(&conn, &updated).unwrap();
        let stored = get_profile_by_user(&conn, 5).unwrap().unwrap();
        assert_eq!(stored.blood_type.as_deref(), Some("B"));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM health_profiles", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn unknown_user_has_no_profile() {
        let conn = open_memory_database().unwrap();
        assert!(get_profile_by_user(&conn, 1).unwrap().is_none());
    }
}
