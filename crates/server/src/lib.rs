pub mod assessment;
pub mod db;
mod geocode;
mod openmeteo;
mod routes;
mod startup;
pub mod templates;
mod utils;

pub use db::*;
pub use geocode::*;
pub use openmeteo::*;
pub use routes::*;
pub use startup::*;
pub use utils::*;
