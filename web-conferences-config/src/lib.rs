use core::fmt::{Debug, Display};
use std::net::SocketAddr;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "web-conferences.toml";
pub const ENV_PREFIX: &str = "WC_";

/// Pagination limits of the api.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
    #[serde(default = "max_per_page")]
    pub max_per_page: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: max_per_page(),
        }
    }
}

/// An additional conference provider on top of the built in ones.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConferenceProviderConfig {
    pub conference_type: String,
    pub plugin_id: String,
    #[serde(default)]
    pub has_advanced_settings: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    pub database_url: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub conference_providers: Vec<ConferenceProviderConfig>,
}

const fn default_per_page() -> u32 {
    10
}

const fn max_per_page() -> u32 {
    50
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
    #[error("api.default_per_page ({default}) must be between 1 and api.max_per_page ({max})")]
    PerPage { default: u32, max: u32 },
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Config {
    fn validate(self) -> Result<Self, ConfigError> {
        let ApiConfig {
            default_per_page: default,
            max_per_page: max,
        } = self.api;
        if default == 0 || default > max {
            return Err(ConfigError::PerPage { default, max });
        }
        Ok(self)
    }
}

/// Nested keys in the environment are separated by `__`, e.g.
/// `WC_API__MAX_PER_PAGE=100`.
pub fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    figment().extract::<Config>()?.validate()
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_apply_when_only_the_database_is_configured() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, r#"database_url = "postgres://localhost/wc""#)?;
            let config = get_config().map_err(|err| err.to_string())?;
            assert_eq!(config.database_url, "postgres://localhost/wc");
            assert_eq!(config.listen_address, default_listen_address());
            assert_eq!(config.api, ApiConfig::default());
            assert!(config.conference_providers.is_empty());
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_the_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                database_url = "postgres://localhost/wc"

                [api]
                max_per_page = 20

                [[conference_providers]]
                conference_type = "Zoom"
                plugin_id = "zoom"
                "#,
            )?;
            jail.set_env("WC_API__MAX_PER_PAGE", "100");
            jail.set_env("WC_LISTEN_ADDRESS", "127.0.0.1:8080");
            let config = get_config().map_err(|err| err.to_string())?;
            assert_eq!(config.api.max_per_page, 100);
            assert_eq!(config.api.default_per_page, 10);
            assert_eq!(config.listen_address, SocketAddr::from(([127, 0, 0, 1], 8080)));
            assert_eq!(
                config.conference_providers,
                vec![ConferenceProviderConfig {
                    conference_type: "Zoom".to_owned(),
                    plugin_id: "zoom".to_owned(),
                    has_advanced_settings: false,
                }]
            );
            Ok(())
        });
    }

    #[test]
    fn missing_database_url_is_an_error() {
        Jail::expect_with(|_jail| {
            assert!(matches!(get_config(), Err(ConfigError::Figment(_))));
            Ok(())
        });
    }

    #[test]
    fn default_page_size_above_maximum_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("WC_DATABASE_URL", "postgres://localhost/wc");
            jail.set_env("WC_API__DEFAULT_PER_PAGE", "60");
            assert!(matches!(
                get_config(),
                Err(ConfigError::PerPage {
                    default: 60,
                    max: 50
                })
            ));
            Ok(())
        });
    }
}
