//! Conference providers and whether their plugin is switched on.

use std::collections::HashSet;

use tracing::warn;
use web_conferences_config::ConferenceProviderConfig;
use web_conferences_database::models::PluginSetting;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConferenceProvider {
    /// Stored on the conference, e.g. `Wimba`.
    pub conference_type: String,
    /// Name of the plugin setting, e.g. `wimba`.
    pub plugin_id: String,
    pub has_advanced_settings: bool,
}

impl ConferenceProvider {
    fn new(conference_type: &str, plugin_id: &str, has_advanced_settings: bool) -> Self {
        Self {
            conference_type: conference_type.to_owned(),
            plugin_id: plugin_id.to_owned(),
            has_advanced_settings,
        }
    }
}

impl From<&ConferenceProviderConfig> for ConferenceProvider {
    fn from(config: &ConferenceProviderConfig) -> Self {
        Self::new(
            &config.conference_type,
            &config.plugin_id,
            config.has_advanced_settings,
        )
    }
}

/// A plugin is on when it has a setting that is not disabled and actually
/// configures something.
#[must_use]
pub fn plugin_enabled(setting: &PluginSetting) -> bool {
    !setting.disabled
        && setting
            .settings
            .as_object()
            .is_some_and(|settings| !settings.is_empty())
}

#[derive(Clone, Debug)]
pub struct PluginRegistry {
    providers: Vec<ConferenceProvider>,
}

impl PluginRegistry {
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            providers: vec![
                ConferenceProvider::new("AdobeConnect", "adobe_connect", false),
                ConferenceProvider::new("BigBlueButton", "big_blue_button", true),
                ConferenceProvider::new("DimDim", "dim_dim", false),
                ConferenceProvider::new("Wimba", "wimba", false),
            ],
        }
    }

    /// Adds the configured providers. One with the `conference_type` of an
    /// existing provider replaces it.
    #[must_use]
    pub fn with_providers(mut self, configured: &[ConferenceProviderConfig]) -> Self {
        for provider in configured.iter().map(ConferenceProvider::from) {
            if let Some(existing) = self
                .providers
                .iter_mut()
                .find(|existing| existing.conference_type == provider.conference_type)
            {
                warn!(
                    "conference provider {} now uses plugin {}",
                    provider.conference_type, provider.plugin_id
                );
                *existing = provider;
            } else {
                self.providers.push(provider);
            }
        }
        self
    }

    #[must_use]
    pub fn provider(&self, conference_type: &str) -> Option<&ConferenceProvider> {
        self.providers
            .iter()
            .find(|provider| provider.conference_type == conference_type)
    }

    pub fn providers(&self) -> impl Iterator<Item = &ConferenceProvider> {
        self.providers.iter()
    }

    /// Conference types whose plugin is enabled in `settings`. Providers
    /// without a setting are off.
    #[must_use]
    pub fn enabled_conference_types<'a>(&'a self, settings: &[PluginSetting]) -> HashSet<&'a str> {
        self.providers
            .iter()
            .filter(|provider| {
                settings
                    .iter()
                    .find(|setting| setting.name == provider.plugin_id)
                    .is_some_and(plugin_enabled)
            })
            .map(|provider| provider.conference_type.as_str())
            .collect()
    }
}
