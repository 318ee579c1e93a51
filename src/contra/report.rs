use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::enums::{ContraStatus, ViolationType};

use super::messages::MessageTemplates;
use super::types::ContraViolation;

/// Separator between deduplicated messages in a report summary.
pub const SUMMARY_SEPARATOR: &str = "; ";

/// Outcome of one evaluation. Created fresh per call, never persisted as such.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContraindicationReport {
    pub status: ContraStatus,
    pub summary: String,
    pub violations: Vec<ContraViolation>,
}

impl ContraindicationReport {
    /// Report without findings, summarized with the default (English) template.
    pub fn pass() -> Self {
        Self::pass_with_summary(MessageTemplates::default().passed())
    }

    pub fn pass_with_summary(summary: String) -> Self {
        Self {
            status: ContraStatus::Pass,
            summary,
            violations: Vec::new(),
        }
    }

    /// Build a report from collected violations using the default templates.
    pub fn from_violations(violations: Vec<ContraViolation>) -> Self {
        Self::from_violations_with(violations, &MessageTemplates::default())
    }

    /// Build a report: status is the lattice join of all levels, summary is
    /// the messages deduplicated by exact string equality and joined by "; ".
    pub fn from_violations_with(
        violations: Vec<ContraViolation>,
        templates: &MessageTemplates,
    ) -> Self {
        if violations.is_empty() {
            return Self::pass_with_summary(templates.passed());
        }

        let status = violations
            .iter()
            .map(|v| v.level)
            .fold(ContraStatus::Pass, ContraStatus::merge);

        let mut seen: HashSet<&str> = HashSet::new();
        let summary = violations
            .iter()
            .map(|v| v.message.as_str())
            .filter(|message| seen.insert(*message))
            .collect::<Vec<_>>()
            .join(SUMMARY_SEPARATOR);

        Self {
            status,
            summary,
            violations,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ContraStatus::Fail
    }

    pub fn count_of(&self, violation_type: ViolationType) -> usize {
        self.violations
            .iter()
            .filter(|v| v.violation_type == violation_type)
            .count()
    }

    /// Violations attributed to one item position.
    pub fn violations_for_item(&self, item_index: usize) -> impl Iterator<Item = &ContraViolation> {
        self.violations
            .iter()
            .filter(move |v| v.item_index == item_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Medicine;

    fn violation(index: usize, level: ContraStatus, message: &str) -> ContraViolation {
        let medicine = Medicine {
            id: 11,
            generic_name: "TestMed".into(),
            ..Default::default()
        };
        ContraViolation::new(index, &medicine, ViolationType::Dosage, level, message.into())
    }

    #[test]
    fn empty_violations_pass() {
        let report = ContraindicationReport::from_violations(vec![]);
        assert_eq!(report.status, ContraStatus::Pass);
        assert_eq!(report.summary, "contraindication check passed");
        assert!(report.violations.is_empty());
        assert!(!report.is_rejected());
    }

    #[test]
    fn status_is_max_level() {
        let report = ContraindicationReport::from_violations(vec![
            violation(0, ContraStatus::Warn, "a"),
            violation(1, ContraStatus::Pass, "b"),
        ]);
        assert_eq!(report.status, ContraStatus::Warn);

        let report = ContraindicationReport::from_violations(vec![
            violation(0, ContraStatus::Warn, "a"),
            violation(0, ContraStatus::Fail, "b"),
            violation(1, ContraStatus::Warn, "c"),
        ]);
        assert_eq!(report.status, ContraStatus::Fail);
        assert!(report.is_rejected());
    }

    #[test]
    fn only_pass_levels_stay_pass_but_keep_violations() {
        let report =
            ContraindicationReport::from_violations(vec![violation(0, ContraStatus::Pass, "note")]);
        assert_eq!(report.status, ContraStatus::Pass);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.summary, "note");
    }

    #[test]
    fn summary_deduplicates_messages() {
        let report = ContraindicationReport::from_violations(vec![
            violation(0, ContraStatus::Fail, "pair a + b"),
            violation(1, ContraStatus::Fail, "pair a + b"),
            violation(1, ContraStatus::Warn, "other"),
        ]);
        assert_eq!(report.violations.len(), 3);
        let parts: HashSet<&str> = report.summary.split(SUMMARY_SEPARATOR).collect();
        assert_eq!(parts, HashSet::from(["pair a + b", "other"]));
    }

    #[test]
    fn violations_keep_input_order() {
        let input = vec![
            violation(1, ContraStatus::Warn, "x"),
            violation(0, ContraStatus::Fail, "y"),
        ];
        let report = ContraindicationReport::from_violations(input.clone());
        assert_eq!(report.violations, input);
        assert_eq!(report.violations_for_item(0).count(), 1);
        assert_eq!(report.count_of(ViolationType::Dosage), 2);
    }

    #[test]
    fn localized_pass_summary() {
        let zh = MessageTemplates::new(crate::contra::messages::MessageLocale::Zh);
        let report = ContraindicationReport::from_violations_with(vec![], &zh);
        assert_eq!(report.summary, "禁忌校验通过");
    }
}
