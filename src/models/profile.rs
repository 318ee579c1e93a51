use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Patient health profile. Every clinical field is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    pub user_id: i64,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub chronic_diseases: Option<String>,
    #[serde(default)]
    pub allergy_history: Option<String>,
    #[serde(default)]
    pub genetic_risk: Option<String>,
}

/// Profile fields consulted by the contraindication checks, as stored with
/// each audit record. Missing fields serialize as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSnapshot {
    pub allergy_history: String,
    pub chronic_diseases: String,
    pub genetic_risk: String,
    pub blood_type: String,
}

impl PatientSnapshot {
    pub fn of(profile: &HealthProfile) -> Self {
        fn safe(value: &Option<String>) -> String {
            value.clone().unwrap_or_default()
        }
        Self {
            allergy_history: safe(&profile.allergy_history),
            chronic_diseases: safe(&profile.chronic_diseases),
            genetic_risk: safe(&profile.genetic_risk),
            blood_type: safe(&profile.blood_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_blanks_missing_fields() {
        let profile = HealthProfile {
            user_id: 7,
            allergy_history: Some("penicillin".into()),
            ..Default::default()
        };
        let snapshot = PatientSnapshot::of(&profile);
        assert_eq!(snapshot.allergy_history, "penicillin");
        assert_eq!(snapshot.blood_type, "");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["allergyHistory"], "penicillin");
        assert_eq!(json["chronicDiseases"], "");
    }
}
