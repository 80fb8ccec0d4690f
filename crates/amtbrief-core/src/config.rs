use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
/// Default upload ceiling for `analyze-file`: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Default session token lifetime.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 3600;

/// Top-level config (amtbrief.toml + AMTBRIEF_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Identity provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Telegram bot secret token — required for ChatLike auth (`AuthUnconfigured` if absent).
    pub telegram_bot_secret: Option<String>,
    /// Google OAuth client id — required for GoogleLike auth.
    pub google_client_id: Option<String>,
    /// Signing secret for minted Session Tokens (HS256).
    pub session_secret: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,
}

/// System-wide (non-user) provider keys, mapped one per family.
///
/// When absent for a family, users must supply their own key in an API key
/// slot for that family to be reachable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    /// Maps each user API key slot (1..3) to the provider family it is
    /// interpreted as.
    #[serde(default = "default_slot_mapping")]
    pub slot_mapping: [SlotProvider; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotProvider {
    Gemini,
    OpenAi,
    Anthropic,
}

impl SlotProvider {
    pub fn family(self) -> crate::types::ProviderFamily {
        match self {
            SlotProvider::Gemini => crate::types::ProviderFamily::GeminiLike,
            SlotProvider::OpenAi => crate::types::ProviderFamily::OpenAILike,
            SlotProvider::Anthropic => crate::types::ProviderFamily::AnthropicLike,
        }
    }
}

fn default_slot_mapping() -> [SlotProvider; 3] {
    [SlotProvider::Gemini, SlotProvider::OpenAi, SlotProvider::Anthropic]
}

/// OCR subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_binary")]
    pub binary_path: String,
    #[serde(default = "default_lang_pack")]
    pub language_pack_dir: Option<String>,
    #[serde(default = "default_languages")]
    pub languages: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary_path: default_ocr_binary(),
            language_pack_dir: default_lang_pack(),
            languages: default_languages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_upload")]
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_session_ttl() -> i64 {
    DEFAULT_SESSION_TTL_SECS
}
fn default_max_upload() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}
fn default_ocr_binary() -> String {
    "tesseract".to_string()
}
fn default_lang_pack() -> Option<String> {
    None
}
fn default_languages() -> String {
    "deu+eng+rus+ukr".to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.amtbrief/amtbrief.db", home)
}

impl AppConfig {
    /// Load config from a TOML file with `AMTBRIEF_*` env var overrides,
    /// once at startup, into an immutable config record passed explicitly
    /// to everything that needs it.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: AppConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("AMTBRIEF_").split("__"))
            .extract()
            .map_err(|e| crate::error::ApiError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.amtbrief/amtbrief.toml", home)
}
