pub mod alerting;
pub mod bundle;
pub mod config;
pub mod contra; // Contraindication engine
pub mod db;
pub mod models;
pub mod prescription; // Prescription lifecycle + audits

mod phi_audit;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::alerting::LogAlerting;
use crate::config::EngineConfig;
use crate::contra::RuleBasedEvaluator;
use crate::prescription::{PrescriptionService, SqliteMedicineCatalog, SqliteProfileDirectory};

/// Install the fmt subscriber. `RUST_LOG` wins over the built-in filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Service wired to the SQLite catalog and profile tables, the rule-based
/// evaluator configured by `config`, and log alerting.
pub fn sqlite_prescription_service(config: &EngineConfig) -> PrescriptionService {
    PrescriptionService::new(
        Arc::new(RuleBasedEvaluator::from_config(config)),
        Arc::new(SqliteMedicineCatalog),
        Arc::new(SqliteProfileDirectory),
        Arc::new(LogAlerting),
    )
}
