pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::{last_error, report, report_rhf, PfError, PfResult, RhfError, RhfResult};
