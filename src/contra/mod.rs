//! Contraindication evaluation: per-item allergy, disease, dosage and
//! special-population rules plus a pairwise interaction scan, folded into one
//! report whose status is the worst level found.
//!
//! Evaluation is pure. It reads the prescription, its items, the resolved
//! medicines and an optional health profile, and never touches storage.

pub mod detection;
mod engine;
pub mod messages;
mod report;
pub mod tokens;
mod types;

pub use engine::*;
pub use messages::{MessageLocale, MessageTemplates};
pub use report::*;
pub use types::*;
