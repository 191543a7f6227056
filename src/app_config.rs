use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::encoding::resolve_label;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// External decompiler and compiler
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Archive processing settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Translate
    #[default]
    Google,
    // @provider: Ollama
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google Translate",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::Google => Self {
                provider_type: "google".to_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_ollama_timeout_secs(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for LLM providers
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Rate limit delay in milliseconds between consecutive requests
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Reuse translations of repeated strings within a run
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            cache_enabled: true,
        }
    }
}

/// One external program and its argument template
///
/// Arguments may contain `{archive}`, `{output_dir}`, `{project}` and `{project_dir}`
/// placeholders, substituted with absolute paths when the tool runs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolConfig {
    // @field: Program name or path
    pub path: String,

    // @field: Argument template
    #[serde(default)]
    pub args: Vec<String>,

    // @field: Seconds before the program is killed
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
}

/// Decompiler and compiler used around translation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolsConfig {
    #[serde(default = "default_decompiler")]
    pub decompiler: ToolConfig,

    #[serde(default = "default_compiler")]
    pub compiler: ToolConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            decompiler: default_decompiler(),
            compiler: default_compiler(),
        }
    }
}

/// Archive processing settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ArchiveConfig {
    /// Extensions (without dot, case-insensitive) of files translated as pages
    #[serde(default = "default_page_extensions")]
    pub page_extensions: Vec<String>,

    /// Prefix of output file names; defaults to `[<TARGET>] `
    #[serde(default)]
    pub output_prefix: Option<String>,

    /// Encoding label of translated pages and navigation files
    #[serde(default = "default_output_encoding")]
    pub output_encoding: String,

    /// Encoding label to assume for files without a byte order mark
    #[serde(default)]
    pub source_encoding: Option<String>,

    /// Pages translated at the same time
    #[serde(default = "default_concurrent_pages")]
    pub concurrent_pages: usize,

    /// Directory that holds temporary workspaces; system temp dir when unset
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,

    /// Ask the compiler to build a full-text search index
    #[serde(default = "default_true")]
    pub full_text_search: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            page_extensions: default_page_extensions(),
            output_prefix: None,
            output_encoding: default_output_encoding(),
            source_encoding: None,
            concurrent_pages: default_concurrent_pages(),
            workspace_root: None,
            full_text_search: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ollama_timeout_secs() -> u64 {
    60
}

fn default_tool_timeout_secs() -> u64 {
    600
}

fn default_rate_limit_delay_ms() -> u64 {
    100 // Keep the keyless Google endpoint from throttling us
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama2".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional translator of software documentation. Translate the text from {source_language} to {target_language}. Reply with the translation only, without quotes, notes or explanations.".to_string()
}

fn default_page_extensions() -> Vec<String> {
    vec!["html".to_string(), "htm".to_string()]
}

fn default_output_encoding() -> String {
    "utf-8".to_string()
}

fn default_concurrent_pages() -> usize {
    1
}

#[cfg(windows)]
fn default_decompiler() -> ToolConfig {
    ToolConfig {
        path: "hh.exe".to_string(),
        args: vec!["-decompile".to_string(), "{output_dir}".to_string(), "{archive}".to_string()],
        timeout_secs: default_tool_timeout_secs(),
    }
}

#[cfg(not(windows))]
fn default_decompiler() -> ToolConfig {
    ToolConfig {
        path: "extract_chmLib".to_string(),
        args: vec!["{archive}".to_string(), "{output_dir}".to_string()],
        timeout_secs: default_tool_timeout_secs(),
    }
}

#[cfg(windows)]
fn default_compiler() -> ToolConfig {
    ToolConfig {
        path: "hhc.exe".to_string(),
        args: vec!["{project}".to_string()],
        timeout_secs: default_tool_timeout_secs(),
    }
}

#[cfg(not(windows))]
fn default_compiler() -> ToolConfig {
    ToolConfig {
        path: "chmcmd".to_string(),
        args: vec!["{project}".to_string()],
        timeout_secs: default_tool_timeout_secs(),
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        resolve_label(&self.archive.output_encoding)
            .map_err(|e| anyhow!("Invalid output encoding: {}", e))?;
        if let Some(label) = &self.archive.source_encoding {
            resolve_label(label).map_err(|e| anyhow!("Invalid source encoding: {}", e))?;
        }

        if self.archive.concurrent_pages == 0 {
            return Err(anyhow!("concurrent_pages must be at least 1"));
        }
        if self.archive.page_extensions.is_empty() {
            return Err(anyhow!("At least one page extension is required"));
        }
        if self.tools.decompiler.path.trim().is_empty() || self.tools.compiler.path.trim().is_empty() {
            return Err(anyhow!("Decompiler and compiler paths must not be empty"));
        }

        Ok(())
    }

    /// Output file name prefix, configured or derived from the target language
    pub fn output_prefix(&self) -> String {
        self.archive
            .output_prefix
            .clone()
            .unwrap_or_else(|| crate::language_utils::output_marker(&self.target_language))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "ja".to_string(),
            target_language: "en".to_string(),
            translation: TranslationConfig::default(),
            tools: ToolsConfig::default(),
            archive: ArchiveConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::Google => String::new(),
            TranslationProvider::Ollama => default_ollama_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::Google => String::new(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(provider_config) if provider_config.timeout_secs > 0 => provider_config.timeout_secs,
            _ => match self.provider {
                TranslationProvider::Google => default_timeout_secs(),
                TranslationProvider::Ollama => default_ollama_timeout_secs(),
            },
        }
    }

    /// Get the active provider configuration, adding a default entry if it is missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Google),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
