mod navbar;
mod theme;

pub use navbar::navbar;
pub use theme::theme_toggle;
