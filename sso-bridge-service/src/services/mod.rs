pub mod companion;
pub mod identity;
pub mod metrics;
pub mod settings;
pub mod sso;
pub mod user_store;

pub use companion::CompanionClient;
pub use metrics::get_metrics;
pub use settings::SettingsStore;
pub use sso::SsoService;
pub use user_store::{InMemoryUserStore, UserStore};
