pub mod chart_session;
pub mod data_acquisition;
pub mod dataset_cache;
pub mod panel_selector;
pub mod preferences;

pub use chart_session::*;
pub use data_acquisition::*;
pub use dataset_cache::*;
pub use panel_selector::*;
pub use preferences::*;
