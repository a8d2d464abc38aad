pub mod loaders;
pub mod locale;
pub mod qa;

pub use loaders::load_queries;
pub use locale::{LocaleParams, LocalePreset, POPULAR_LOCALES};
pub use qa::{QaPair, QueryRecord};
