use std::collections::HashMap;

use crate::models::enums::{ContraStatus, ViolationType};
use crate::models::{HealthProfile, Medicine, PrescriptionItem};

use super::messages::MessageTemplates;
use super::tokens::{extract_first_integer, is_blank, lower_or_empty, tokens, TokenSet};
use super::types::ContraViolation;

/// Overdose keywords recognized in every deployment.
pub const BUILTIN_OVERDOSE_KEYWORDS: &[&str] = &["overdose", "超剂量"];

/// Maximum digit count of the guideline number read by the dosage heuristic.
pub const DEFAULT_GUIDELINE_DIGIT_LIMIT: usize = 4;

/// Contraindication token that marks a pregnancy restriction.
const PREGNANCY_TOKEN: &str = "pregnancy";
/// Genetic-risk marker for a pregnant patient.
const PREGNANT_MARKER: &str = "pregnant";
/// Prefix of blood-type restriction tokens, e.g. `bloodtype:o`.
const BLOOD_TYPE_PREFIX: &str = "bloodtype:";

/// Parameters of the dosage heuristics.
#[derive(Debug, Clone)]
pub struct DosageRules {
    /// Lowercased overdose keywords, built-ins included.
    pub overdose_keywords: Vec<String>,
    pub guideline_digit_limit: usize,
}

impl DosageRules {
    pub fn new(extra_keywords: &[String], guideline_digit_limit: usize) -> Self {
        let mut overdose_keywords: Vec<String> = BUILTIN_OVERDOSE_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .collect();
        for keyword in extra_keywords {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() && !overdose_keywords.contains(&keyword) {
                overdose_keywords.push(keyword);
            }
        }
        Self {
            overdose_keywords,
            guideline_digit_limit,
        }
    }

    fn mentions_overdose(&self, instruction: &str) -> bool {
        self.overdose_keywords
            .iter()
            .any(|keyword| instruction.contains(keyword.as_str()))
    }
}

impl Default for DosageRules {
    fn default() -> Self {
        Self::new(&[], DEFAULT_GUIDELINE_DIGIT_LIMIT)
    }
}

// ---------------------------------------------------------------------------
// [1] ALLERGY check
// ---------------------------------------------------------------------------

/// One FAIL per token shared by the medicine's contraindications and the
/// patient's allergy history.
pub fn check_allergy(
    index: usize,
    medicine: &Medicine,
    patient_allergies: &TokenSet,
    messages: &MessageTemplates,
) -> Vec<ContraViolation> {
    let drug_allergies = tokens(medicine.contraindications.as_deref());
    if drug_allergies.is_empty() || patient_allergies.is_empty() {
        return Vec::new();
    }

    drug_allergies
        .intersection(patient_allergies)
        .map(|allergy| {
            ContraViolation::new(
                index,
                medicine,
                ViolationType::Allergy,
                ContraStatus::Fail,
                messages.allergy(allergy),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// [2] DISEASE check
// ---------------------------------------------------------------------------

/// One WARN per token shared by the medicine's indications and the patient's
/// chronic diseases.
///
/// This compares indications, not contraindications. The rule is kept as the
/// clinical catalog currently relies on it.
pub fn check_disease(
    index: usize,
    medicine: &Medicine,
    patient_diseases: &TokenSet,
    messages: &MessageTemplates,
) -> Vec<ContraViolation> {
    let drug_diseases = tokens(medicine.indications.as_deref());
    if drug_diseases.is_empty() || patient_diseases.is_empty() {
        return Vec::new();
    }

    drug_diseases
        .intersection(patient_diseases)
        .map(|disease| {
            ContraViolation::new(
                index,
                medicine,
                ViolationType::Disease,
                ContraStatus::Warn,
                messages.disease(disease),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// [3] DOSAGE check
// ---------------------------------------------------------------------------

/// Overdose keyword in the instruction (FAIL), otherwise day supply above the
/// guideline's "max" figure for a daily regimen (WARN). Nothing is checked
/// when the medicine has no guideline.
pub fn check_dosage(
    index: usize,
    medicine: &Medicine,
    item: &PrescriptionItem,
    rules: &DosageRules,
    messages: &MessageTemplates,
) -> Vec<ContraViolation> {
    let guideline = match medicine.dosage_guideline.as_deref() {
        Some(g) if !is_blank(Some(g)) => g,
        _ => return Vec::new(),
    };

    let instruction = lower_or_empty(item.dosage_instruction.as_deref());
    if rules.mentions_overdose(&instruction) {
        return vec![ContraViolation::new(
            index,
            medicine,
            ViolationType::Dosage,
            ContraStatus::Fail,
            messages.overdose(item.dosage_instruction.as_deref().unwrap_or_default()),
        )];
    }

    if !guideline.to_lowercase().contains("max") {
        return Vec::new();
    }

    let Some(max_daily) = extract_first_integer(guideline, rules.guideline_digit_limit)
        .filter(|value| *value > 0)
    else {
        return Vec::new();
    };

    let daily = lower_or_empty(item.frequency.as_deref()).contains("daily");
    let exceeds = item
        .day_supply
        .is_some_and(|days| i64::from(days) > i64::from(max_daily));

    if daily && exceeds {
        vec![ContraViolation::new(
            index,
            medicine,
            ViolationType::Dosage,
            ContraStatus::Warn,
            messages.guideline_exceeded(guideline),
        )]
    } else {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// [4] SPECIAL POPULATION check
// ---------------------------------------------------------------------------

/// Pregnancy restriction (FAIL) and blood-type restriction (WARN). The two
/// rules are independent and may both fire.
pub fn check_special_population(
    index: usize,
    medicine: &Medicine,
    profile: Option<&HealthProfile>,
    messages: &MessageTemplates,
) -> Vec<ContraViolation> {
    let Some(profile) = profile else {
        return Vec::new();
    };
    let contraindications = tokens(medicine.contraindications.as_deref());
    if contraindications.is_empty() {
        return Vec::new();
    }

    let mut violations = Vec::new();

    let pregnant = lower_or_empty(profile.genetic_risk.as_deref()).contains(PREGNANT_MARKER);
    if contraindications.contains(PREGNANCY_TOKEN) && pregnant {
        violations.push(ContraViolation::new(
            index,
            medicine,
            ViolationType::SpecialPopulation,
            ContraStatus::Fail,
            messages.pregnancy(&medicine.generic_name),
        ));
    }

    let blood_type = lower_or_empty(profile.blood_type.as_deref());
    if contraindications.contains(&format!("{BLOOD_TYPE_PREFIX}{blood_type}")) {
        violations.push(ContraViolation::new(
            index,
            medicine,
            ViolationType::SpecialPopulation,
            ContraStatus::Warn,
            messages.blood_type(),
        ));
    }

    violations
}

// ---------------------------------------------------------------------------
// [5] INTERACTION check
// ---------------------------------------------------------------------------

/// Pairwise interaction scan over items i < j.
///
/// Only the earlier item's interaction list is consulted; a match on the later
/// medicine's generic name or id yields a FAIL for both items with the same
/// message.
pub fn check_interactions(
    items: &[PrescriptionItem],
    medicine_by_id: &HashMap<i64, Medicine>,
    messages: &MessageTemplates,
) -> Vec<ContraViolation> {
    let mut violations = Vec::new();

    for (i, first_item) in items.iter().enumerate() {
        let Some(first) = medicine_by_id.get(&first_item.medicine_id) else {
            continue;
        };
        let interaction_tokens = tokens(first.drug_interactions.as_deref());
        if interaction_tokens.is_empty() {
            continue;
        }

        for (j, second_item) in items.iter().enumerate().skip(i + 1) {
            let Some(second) = medicine_by_id.get(&second_item.medicine_id) else {
                continue;
            };
            let by_name = interaction_tokens.contains(&second.generic_name.to_lowercase());
            let by_id = interaction_tokens.contains(&second.id.to_string());
            if !(by_name || by_id) {
                continue;
            }

            let message = messages.interaction(&first.generic_name, &second.generic_name);
            violations.push(ContraViolation::new(
                i,
                first,
                ViolationType::Interaction,
                ContraStatus::Fail,
                message.clone(),
            ));
            violations.push(ContraViolation::new(
                j,
                second,
                ViolationType::Interaction,
                ContraStatus::Fail,
                message,
            ));
        }
    }

    violations
}
