//! HTTP handlers grouped by resource

pub mod analysis;
pub mod approval;
pub mod chains;
pub mod common;
pub mod quotes;

pub use analysis::{get_analyze, get_ecosystems};
pub use approval::{post_approval_execute, post_approval_status};
pub use chains::{get_aggregators, get_health, get_supported_chains};
pub use quotes::{post_execute, post_pre_check, post_status, post_universal_quote};
