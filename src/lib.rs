pub mod aggregate;
pub mod error;
pub mod model;
pub mod profile;

pub use aggregate::{build_report, generate_report, Aggregator};
pub use error::{CoverError, Result};
pub use profile::ProfileParser;
