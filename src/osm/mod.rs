pub mod locale;
pub mod normalize;

pub use locale::{Locale, localize_hours};
pub use normalize::normalize;
