pub mod analysis;
pub mod dashboard;

pub use analysis::analysis_page;
pub use dashboard::{dashboard_page, DashboardData};
