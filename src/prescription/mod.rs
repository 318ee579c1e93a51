//! Prescription lifecycle: creation with contraindication evaluation and
//! auditing, detail and search views, status transitions, and re-evaluation
//! of stored drafts.

pub mod catalog;
mod error;
mod service;
pub mod traits;
mod types;

pub use catalog::*;
pub use error::*;
pub use service::*;
pub use traits::*;
pub use types::*;
