use std::collections::HashMap;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::models::enums::ViolationType;
use crate::models::{HealthProfile, Medicine, Prescription, PrescriptionItem};

use super::detection::{
    check_allergy, check_disease, check_dosage, check_interactions, check_special_population,
    DosageRules,
};
use super::messages::MessageTemplates;
use super::report::ContraindicationReport;
use super::tokens::tokens;
use super::types::{ContraViolation, ContraindicationEvaluator};

/// Default rule set: allergy, disease, dosage and special-population checks
/// per item in item order, then the pairwise interaction scan.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedEvaluator {
    pub(crate) messages: MessageTemplates,
    pub(crate) dosage: DosageRules,
}

impl RuleBasedEvaluator {
    pub fn new(messages: MessageTemplates, dosage: DosageRules) -> Self {
        Self { messages, dosage }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            MessageTemplates::new(config.locale),
            DosageRules::new(&config.overdose_keywords, config.guideline_digit_limit),
        )
    }

    /// Run every check and collect violations in evaluation order.
    fn run_checks(
        &self,
        items: &[PrescriptionItem],
        medicine_by_id: &HashMap<i64, Medicine>,
        profile: Option<&HealthProfile>,
    ) -> Vec<ContraViolation> {
        let patient_allergies = tokens(profile.and_then(|p| p.allergy_history.as_deref()));
        let patient_diseases = tokens(profile.and_then(|p| p.chronic_diseases.as_deref()));

        let per_item = items.iter().enumerate().flat_map(|(index, item)| {
            let Some(medicine) = medicine_by_id.get(&item.medicine_id) else {
                return Vec::new();
            };
            check_allergy(index, medicine, &patient_allergies, &self.messages)
                .into_iter()
                .chain(check_disease(index, medicine, &patient_diseases, &self.messages))
                .chain(check_dosage(index, medicine, item, &self.dosage, &self.messages))
                .chain(check_special_population(index, medicine, profile, &self.messages))
                .collect()
        });

        per_item
            .chain(check_interactions(items, medicine_by_id, &self.messages))
            .collect()
    }
}

impl ContraindicationEvaluator for RuleBasedEvaluator {
    fn evaluate(
        &self,
        prescription: &Prescription,
        items: &[PrescriptionItem],
        medicine_by_id: &HashMap<i64, Medicine>,
        profile: Option<&HealthProfile>,
    ) -> ContraindicationReport {
        let start = Instant::now();

        let violations = self.run_checks(items, medicine_by_id, profile);
        let report = ContraindicationReport::from_violations_with(violations, &self.messages);

        tracing::debug!(
            prescription_id = prescription.id,
            items = items.len(),
            has_profile = profile.is_some(),
            allergies = report.count_of(ViolationType::Allergy),
            diseases = report.count_of(ViolationType::Disease),
            dosages = report.count_of(ViolationType::Dosage),
            special_populations = report.count_of(ViolationType::SpecialPopulation),
            interactions = report.count_of(ViolationType::Interaction),
            status = report.status.as_str(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Contraindication evaluation complete"
        );

        report
    }
}
