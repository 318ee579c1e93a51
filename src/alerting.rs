use crate::contra::ContraindicationReport;
use crate::prescription::ContraAlerting;

/// Alerting sink that reports rejections to the log at ERROR level.
/// Only identifiers and counts are logged, never the violation messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlerting;

impl ContraAlerting for LogAlerting {
    fn contraindication_rejected(&self, prescription_id: i64, report: &ContraindicationReport) {
        tracing::error!(
            prescription_id,
            status = report.status.as_str(),
            violations = report.violations.len(),
            "Contraindication check rejected prescription"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_alerting_accepts_any_report() {
        LogAlerting.contraindication_rejected(1, &ContraindicationReport::pass());
    }
}
