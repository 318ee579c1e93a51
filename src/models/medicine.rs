use serde::{Deserialize, Serialize};

/// Catalog snapshot of a medicine. Free-text clinical fields are kept raw;
/// the contraindication engine tokenizes them at evaluation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: i64,
    pub generic_name: String,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub indications: Option<String>,
    #[serde(default)]
    pub contraindications: Option<String>,
    #[serde(default)]
    pub dosage_guideline: Option<String>,
    #[serde(default)]
    pub drug_interactions: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default = "default_version")]
    pub version: i32,
}

fn default_version() -> i32 {
    1
}
