//! CLI command implementations.

mod doctor;
mod init;
mod run;

pub use doctor::run_doctor;
pub use init::run_init;
pub use run::run_pipeline;
