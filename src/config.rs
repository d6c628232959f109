//! Configuration types for quiz generation.
//!
//! Every knob of a run lives in [`QuizConfig`], built via its
//! [`QuizConfigBuilder`]. The config is constructed once (in `main`, or by
//! whatever shell embeds the library) and passed by reference into each run;
//! nothing is read from process-global state afterwards.
//!
//! Credentials are checked separately, once, at start-up via
//! [`Credentials::from_env`].

use crate::error::QuizGenError;
use crate::exemplar::SchemaExemplar;
use crate::pipeline::llm::ModelClient;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Model used when neither the caller nor the environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Provider the CLI defaults to. The library falls back to it only when
/// `OPENAI_API_KEY` is set.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Configuration for a quiz generation run.
///
/// Built via [`QuizConfig::builder()`] or using [`QuizConfig::default()`].
///
/// # Example
/// ```rust
/// use quizgen::QuizConfig;
///
/// let config = QuizConfig::builder()
///     .model("gpt-4.1-mini")
///     .temperature(0.3)
///     .build()
///     .unwrap();
/// assert_eq!(config.model.as_deref(), Some("gpt-4.1-mini"));
/// ```
#[derive(Clone)]
pub struct QuizConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano", "claude-haiku-4-5".
    /// If None, falls back to `QUIZGEN_MODEL`, then [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None, falls back to `QUIZGEN_PROVIDER`, then to [`DEFAULT_PROVIDER`]
    /// only when `OPENAI_API_KEY` is set. With none of these the run fails
    /// with `ConfigurationError`.
    pub provider_name: Option<String>,

    /// Pre-constructed model client. Takes precedence over `provider_name`.
    pub client: Option<Arc<dyn ModelClient>>,

    /// Sampling temperature for both calls. Range: 0.0–2.0. Default: 0.5.
    pub temperature: f32,

    /// Maximum tokens per completion. Default: 4096.
    ///
    /// Too low a value truncates the quiz JSON and the run ends in
    /// `MalformedQuiz`.
    pub max_tokens: usize,

    /// Directory for the staged document. If None, uses the OS temp dir.
    pub staging_dir: Option<PathBuf>,

    /// Answer-shape example injected into the generation prompt.
    pub exemplar: SchemaExemplar,

    /// Optional per-stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            client: None,
            temperature: 0.5,
            max_tokens: 4096,
            staging_dir: None,
            exemplar: SchemaExemplar::builtin(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("client", &self.client.as_ref().map(|_| "<dyn ModelClient>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("staging_dir", &self.staging_dir)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl QuizConfig {
    /// Create a new builder for `QuizConfig`.
    pub fn builder() -> QuizConfigBuilder {
        QuizConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`QuizConfig`].
#[derive(Debug)]
pub struct QuizConfigBuilder {
    config: QuizConfig,
}

impl QuizConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.staging_dir = Some(dir.into());
        self
    }

    pub fn exemplar(mut self, exemplar: SchemaExemplar) -> Self {
        self.config.exemplar = exemplar;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QuizConfig, QuizGenError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(QuizGenError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if !c.temperature.is_finite() {
            return Err(QuizGenError::InvalidConfig(format!(
                "temperature must be a number in 0.0–2.0, got {}",
                c.temperature
            )));
        }
        if let Some(dir) = &c.staging_dir {
            if !dir.is_dir() {
                return Err(QuizGenError::InvalidConfig(format!(
                    "staging directory '{}' does not exist",
                    dir.display()
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Credentials ──────────────────────────────────────────────────────────

/// Environment variable holding the API key for a provider.
///
/// Returns `None` for local providers that need no key. Unknown providers
/// are assumed to follow the `<PROVIDER>_API_KEY` convention.
pub fn api_key_var(provider: &str) -> Option<String> {
    match provider.to_ascii_lowercase().as_str() {
        "ollama" | "lmstudio" | "mock" => None,
        "openai" => Some("OPENAI_API_KEY".into()),
        "anthropic" => Some("ANTHROPIC_API_KEY".into()),
        "gemini" | "google" => Some("GEMINI_API_KEY".into()),
        "mistral" => Some("MISTRAL_API_KEY".into()),
        "azure" | "azure-openai" => Some("AZURE_OPENAI_API_KEY".into()),
        "openrouter" => Some("OPENROUTER_API_KEY".into()),
        "xai" => Some("XAI_API_KEY".into()),
        other => Some(format!(
            "{}_API_KEY",
            other.to_ascii_uppercase().replace('-', "_")
        )),
    }
}

/// Credentials for the selected provider, resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub provider: String,
    /// Name of the variable the key came from; `None` for local providers.
    pub key_var: Option<String>,
}

impl Credentials {
    /// Check that `provider`'s API key is present and non-empty.
    ///
    /// # Errors
    /// [`QuizGenError::ConfigurationError`] naming the missing variable.
    pub fn from_env(provider: &str) -> Result<Self, QuizGenError> {
        Self::from_lookup(provider, |var| std::env::var(var).ok())
    }

    /// Same as [`Credentials::from_env`] with an injectable variable lookup.
    pub fn from_lookup(
        provider: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, QuizGenError> {
        let key_var = api_key_var(provider);
        if let Some(var) = &key_var {
            let present = lookup(var).is_some_and(|v| !v.trim().is_empty());
            if !present {
                return Err(QuizGenError::ConfigurationError(format!(
                    "{} is not set; it is required for the '{}' provider",
                    var, provider
                )));
            }
        }
        Ok(Self {
            provider: provider.to_string(),
            key_var,
        })
    }
}
