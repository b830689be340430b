mod analysis_detail;
mod dashboard;
mod fragments;

pub use analysis_detail::analysis_detail_handler;
pub use dashboard::dashboard_handler;
pub use fragments::{analyze_handler, recent_handler};
