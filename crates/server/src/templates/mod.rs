pub mod components;
pub mod fragments;
pub mod layouts;
pub mod pages;

pub use fragments::{
    analysis_error, analysis_result, geocode_choices, recent_analyses_rows,
};
pub use layouts::{CurrentPage, PageConfig};
pub use pages::{analysis_page, dashboard_page, DashboardData};
