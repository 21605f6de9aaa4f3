use crate::domain::trend::Resolution;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub charts: ChartSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Interface language sent to the provider
    #[serde(default = "default_hl")]
    pub hl: String,
    /// Timezone offset in minutes, provider convention (360 = UTC-6)
    #[serde(default = "default_tz")]
    pub tz: i32,
    /// Worldwide queries, or finer US levels; other countries break down by sub-region
    #[serde(default)]
    pub region_resolution: Resolution,
    /// Pause before the related-queries call, the provider throttles bursts
    #[serde(default = "default_related_pause_ms")]
    pub related_pause_ms: u64,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            hl: default_hl(),
            tz: default_tz(),
            region_resolution: Resolution::default(),
            related_pause_ms: default_related_pause_ms(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    #[serde(default = "default_template")]
    pub template: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            template: default_template(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_base_url() -> String {
    "https://trends.google.com".to_string()
}

fn default_hl() -> String {
    "en-US".to_string()
}

fn default_tz() -> i32 {
    360
}

fn default_related_pause_ms() -> u64 {
    1000
}

fn default_template() -> String {
    "plotly_white".to_string()
}

/// `config/dashboard.{toml,yaml,json}` if present, then `TRENDS__SECTION__KEY`
/// environment overrides.
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("TRENDS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
