use crate::processing::Capability;
use crate::provider::ProviderSettings;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_ENDPOINT: &str = "https://us-documentai.googleapis.com";
const DEFAULT_MIME_TYPE: &str = "application/pdf";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Processor identifier configured for each capability.
///
/// Identifiers are opaque resource names such as
/// `projects/<project>/locations/<location>/processors/<id>`.
#[derive(Debug, Clone, Default)]
pub struct ProcessorIds {
    /// Document OCR processor.
    pub ocr: Option<String>,
    /// Form parser processor.
    pub form_parser: Option<String>,
    /// Summarizer processor.
    pub summarizer: Option<String>,
    /// Custom extractor processor.
    pub custom_extractor: Option<String>,
}

impl ProcessorIds {
    /// Identifier configured for `capability`, if any.
    pub fn get(&self, capability: Capability) -> Option<&str> {
        let slot = match capability {
            Capability::Ocr => &self.ocr,
            Capability::FormParser => &self.form_parser,
            Capability::Summarize => &self.summarizer,
            Capability::CustomExtractor => &self.custom_extractor,
        };
        slot.as_deref().filter(|value| !value.trim().is_empty())
    }

    /// Capabilities that have an identifier, in declaration order.
    pub fn configured(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.get(*capability).is_some())
            .collect()
    }
}

/// Runtime configuration for the document service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Document AI REST endpoint.
    pub document_ai_endpoint: String,
    /// Optional bearer token sent with provider requests.
    pub document_ai_access_token: Option<String>,
    /// Processor identifiers per capability.
    pub processors: ProcessorIds,
    /// MIME type assumed when an upload does not declare one.
    pub default_mime_type: String,
    /// Provider request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Largest accepted upload body in bytes.
    pub max_upload_bytes: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            document_ai_endpoint: load_env_optional("DOCUMENT_AI_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            document_ai_access_token: load_env_optional("DOCUMENT_AI_ACCESS_TOKEN"),
            processors: ProcessorIds {
                ocr: load_env_optional("DOCUMENT_AI_OCR_ID"),
                form_parser: load_env_optional("DOCUMENT_AI_FORM_PARSER_ID"),
                summarizer: load_env_optional("DOCUMENT_AI_SUMMARIZER_ID"),
                custom_extractor: load_env_optional("DOCUMENT_AI_CUSTOM_EXTRACTOR_ID"),
            },
            default_mime_type: load_env_optional("DOCUMENT_AI_MIME_TYPE")
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            request_timeout_secs: parse_optional("DOCUMENT_AI_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            max_upload_bytes: parse_optional("MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }

    /// Connection settings handed to the provider client.
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            endpoint: self.document_ai_endpoint.clone(),
            access_token: self.document_ai_access_token.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.into()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        endpoint = %config.document_ai_endpoint,
        capabilities = ?config.processors.configured(),
        default_mime_type = %config.default_mime_type,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
