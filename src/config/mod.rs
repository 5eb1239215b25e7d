pub mod loader;
pub mod provider;
pub mod settings;

use serde::Deserialize;

use self::provider::ProviderConfig;
use self::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub provider: ProviderConfig,
}
