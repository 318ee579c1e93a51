use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use contraguard::bundle::EvaluationBundle;
use contraguard::config::{self, EngineConfig};
use contraguard::contra::RuleBasedEvaluator;
use contraguard::db::open_database;
use contraguard::models::enums::PrescriptionStatus;
use contraguard::models::PrescriptionFilter;
use contraguard::prescription::{PrescriptionCreateRequest, PrescriptionError, StatusUpdateRequest};

#[derive(Parser)]
#[command(name = "contraguard")]
#[command(version, about = "Prescription contraindication checks")]
struct Cli {
    /// Engine config JSON (defaults, then CONTRAGUARD_* environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (defaults to ~/Contraguard/contraguard.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a JSON bundle of items, medicines and profile without storing anything
    Evaluate {
        /// Bundle file
        input: PathBuf,
    },
    /// Create or migrate the database
    InitDb,
    /// Create a prescription from a JSON request
    Create {
        /// Request file
        input: PathBuf,
    },
    /// Show a prescription with its items and audits
    Show { id: i64 },
    /// List prescriptions
    Search {
        #[arg(long)]
        patient: Option<i64>,
        #[arg(long)]
        doctor: Option<i64>,
        /// DRAFT, ISSUED or CANCELLED
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 0)]
        page: i64,
        #[arg(long, default_value_t = 20)]
        size: i64,
    },
    /// Change the status of a DRAFT prescription (ISSUED or CANCELLED)
    SetStatus { id: i64, status: String },
    /// Re-evaluate a DRAFT prescription
    Recheck { id: i64 },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Bundle(#[from] contraguard::bundle::BundleError),
    #[error(transparent)]
    Database(#[from] contraguard::db::DatabaseError),
    #[error(transparent)]
    Prescription(#[from] PrescriptionError),
    #[error("{0}")]
    Input(String),
}

fn main() -> ExitCode {
    contraguard::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Prescription(e)) => {
            eprintln!("error [{}]: {e}", e.code());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let engine_config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::from_env()?,
    };
    let db_path = cli.db.clone().unwrap_or_else(config::database_path);

    match cli.command {
        Commands::Evaluate { input } => {
            let bundle = EvaluationBundle::from_json_file(&input)?;
            let report = bundle.evaluate(&RuleBasedEvaluator::from_config(&engine_config));
            print_json(&report)
        }
        Commands::InitDb => {
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CliError::Input(format!("{}: {e}", parent.display())))?;
            }
            let conn = open_database(&db_path)?;
            let version = contraguard::db::get_current_version(&conn);
            tracing::info!(version, "Database ready");
            println!("{} (schema v{version})", db_path.display());
            Ok(())
        }
        Commands::Create { input } => {
            let request: PrescriptionCreateRequest = read_json(&input)?;
            let conn = open_database(&db_path)?;
            let service = contraguard::sqlite_prescription_service(&engine_config);
            print_json(&service.create(&conn, &request)?)
        }
        Commands::Show { id } => {
            let conn = open_database(&db_path)?;
            let service = contraguard::sqlite_prescription_service(&engine_config);
            print_json(&service.detail(&conn, id)?)
        }
        Commands::Search {
            patient,
            doctor,
            status,
            page,
            size,
        } => {
            let status = status
                .map(|raw| {
                    raw.trim()
                        .to_uppercase()
                        .parse::<PrescriptionStatus>()
                        .map_err(|_| CliError::Input(format!("unknown status: {raw}")))
                })
                .transpose()?;
            let conn = open_database(&db_path)?;
            let service = contraguard::sqlite_prescription_service(&engine_config);
            let filter = PrescriptionFilter {
                patient_id: patient,
                doctor_id: doctor,
                status,
                ..Default::default()
            };
            print_json(&service.search(&conn, &filter, page, size)?)
        }
        Commands::SetStatus { id, status } => {
            let conn = open_database(&db_path)?;
            let service = contraguard::sqlite_prescription_service(&engine_config);
            print_json(&service.update_status(&conn, id, &StatusUpdateRequest { status })?)
        }
        Commands::Recheck { id } => {
            let conn = open_database(&db_path)?;
            let service = contraguard::sqlite_prescription_service(&engine_config);
            print_json(&service.recheck(&conn, id)?)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::Input(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| CliError::Input(format!("{}: {e}", path.display())))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Input(format!("cannot render output: {e}")))?;
    println!("{out}");
    Ok(())
}
