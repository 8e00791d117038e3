use super::asset::Asset;
use super::duration::deserialize_duration;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_HORIZON_URL: &str = "https://horizon.stellar.org";
pub const USDC_ISSUER: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";

#[derive(Debug, Deserialize, Clone)]
pub struct HorizonProviderConfig {
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    pub horizon: Option<HorizonProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            horizon: Some(HorizonProviderConfig {
                base_url: DEFAULT_HORIZON_URL.to_string(),
                page_size: default_page_size(),
            }),
        }
    }
}

/// The asset all prices are quoted in. An absent issuer means the native asset.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct QuoteConfig {
    pub code: String,
    pub issuer: Option<String>,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        QuoteConfig {
            code: "USDC".to_string(),
            issuer: Some(USDC_ISSUER.to_string()),
        }
    }
}

impl QuoteConfig {
    pub fn to_asset(&self) -> Result<Asset> {
        match &self.issuer {
            Some(issuer) => format!("{}:{}", self.code, issuer).parse(),
            None if self.code.eq_ignore_ascii_case("xlm")
                || self.code.eq_ignore_ascii_case("native") =>
            {
                Ok(Asset::Native)
            }
            None => bail!("Quote asset '{}' needs an issuer", self.code),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_window", deserialize_with = "deserialize_duration")]
    pub window: Duration,
    #[serde(default)]
    pub quote: QuoteConfig,
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    #[serde(
        default = "default_fetch_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub fetch_timeout: Duration,
    #[serde(default = "default_min_balance")]
    pub min_balance: Decimal,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            window: default_window(),
            quote: QuoteConfig::default(),
            concurrency_limit: default_concurrency_limit(),
            fetch_timeout: default_fetch_timeout(),
            min_balance: default_min_balance(),
            providers: ProvidersConfig::default(),
        }
    }
}

fn default_window() -> Duration {
    Duration::from_secs(365 * 24 * 60 * 60)
}

fn default_concurrency_limit() -> usize {
    4
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_min_balance() -> Decimal {
    Decimal::new(1, 3)
}

fn default_page_size() -> u32 {
    200
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "backfolio", "backfolio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn horizon_url(&self) -> &str {
        self.providers
            .horizon
            .as_ref()
            .map_or(DEFAULT_HORIZON_URL, |p| &p.base_url)
    }

    pub fn page_size(&self) -> u32 {
        self.providers
            .horizon
            .as_ref()
            .map_or(default_page_size(), |p| p.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
window: "90d"
quote:
  code: "EURC"
  issuer: "GDHU6WRG4IEQXM5NZ4BMPKOXHW76MZM4Y2IEMFDVXBSDP6SJY4ITNPP2"
concurrency_limit: 8
fetch_timeout: "10s"
min_balance: 0.5
providers:
  horizon:
    base_url: "http://example.com/horizon"
    page_size: 50
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.window, Duration::from_secs(90 * 24 * 60 * 60));
        assert_eq!(config.quote.code, "EURC");
        assert_eq!(config.concurrency_limit, 8);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.min_balance, Decimal::from_str("0.5").unwrap());
        assert_eq!(config.horizon_url(), "http://example.com/horizon");
        assert_eq!(config.page_size(), 50);

        let quote = config.quote.to_asset().unwrap();
        assert_eq!(quote.code(), "EURC");
        assert_eq!(
            quote.issuer(),
            Some("GDHU6WRG4IEQXM5NZ4BMPKOXHW76MZM4Y2IEMFDVXBSDP6SJY4ITNPP2")
        );
    }

    #[test]
    fn test_defaults_apply_to_empty_config() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.window, Duration::from_secs(365 * 24 * 60 * 60));
        assert_eq!(config.quote, QuoteConfig::default());
        assert_eq!(config.concurrency_limit, 4);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.min_balance, Decimal::from_str("0.001").unwrap());
        assert_eq!(config.horizon_url(), DEFAULT_HORIZON_URL);
        assert_eq!(config.page_size(), 200);
        assert_eq!(
            config.quote.to_asset().unwrap(),
            Asset::credit("USDC", USDC_ISSUER)
        );
    }

    #[test]
    fn test_page_size_defaults_when_omitted() {
        let yaml_str = r#"
providers:
  horizon:
    base_url: "http://localhost:8000"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.page_size(), 200);
    }

    #[test]
    fn test_native_quote() {
        let quote = QuoteConfig {
            code: "XLM".to_string(),
            issuer: None,
        };
        assert_eq!(quote.to_asset().unwrap(), Asset::Native);

        let missing_issuer = QuoteConfig {
            code: "USDC".to_string(),
            issuer: None,
        };
        assert!(missing_issuer.to_asset().is_err());
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let result: Result<AppConfig, _> = serde_yaml::from_str(r#"window: "a year""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "window: \"30d\"\n").unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.window, Duration::from_secs(30 * 24 * 60 * 60));
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/definitely/not/here/config.yaml");
        assert!(result.unwrap_err().to_string().contains("Failed to read config file"));
    }
}
