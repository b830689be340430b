pub mod analyses;
pub mod export;
pub mod ui;

pub use analyses::*;
pub use export::*;
pub use ui::*;
