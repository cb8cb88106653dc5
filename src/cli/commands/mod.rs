//! CLI command implementations.

mod complete;
mod config;
mod doctor;
mod init;
mod list;
mod pending;
mod process;
mod reprocess;
mod show;

pub use complete::{run_complete, run_status};
pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use list::run_list;
pub use pending::run_pending;
pub use process::run_process;
pub use reprocess::run_reprocess;
pub use show::run_show;
