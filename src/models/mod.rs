pub mod audit;
pub mod enums;
pub mod filters;
pub mod medicine;
pub mod prescription;
pub mod profile;

pub use audit::*;
pub use filters::*;
pub use medicine::*;
pub use prescription::*;
pub use profile::*;
