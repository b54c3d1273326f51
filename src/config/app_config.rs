use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::research::{
    AcceptancePolicy, BranchFailurePolicy, CorrectiveLoopConfig, LegalDomain, WorkflowConfig,
    MAX_ITERATIONS,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub orchestration: OrchestrationConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Prometheus metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Chat model used by every agent
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

/// Passage sources per domain
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub corpora: CorpusConfig,
    /// Passages returned per statute search
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub tavily: TavilyConfig,
    #[serde(default = "default_retrieval_timeout_secs")]
    pub timeout_secs: u64,
}

/// JSON corpus files (`[{"text", "source"}]`) for the statute domains
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorpusConfig {
    pub personal_data: Option<PathBuf>,
    pub labor: Option<PathBuf>,
    pub housing: Option<PathBuf>,
}

/// Tavily web search settings
#[derive(Debug, Clone, Deserialize)]
pub struct TavilyConfig {
    #[serde(default = "default_tavily_base_url")]
    pub base_url: String,
    #[serde(default = "default_tavily_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_tavily_max_results")]
    pub max_results: usize,
}

/// Corrective loop and fan-out settings
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestrationConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default)]
    pub acceptance: AcceptancePolicy,
    #[serde(default)]
    pub branch_failure_policy: BranchFailurePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Turns kept per session
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    /// Sessions idle for longer than this are swept
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_top_k() -> usize {
    5
}

fn default_retrieval_timeout_secs() -> u64 {
    30
}

fn default_tavily_base_url() -> String {
    "https://api.tavily.com".to_string()
}

fn default_tavily_api_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}

fn default_tavily_max_results() -> usize {
    10
}

fn default_max_iterations() -> u32 {
    MAX_ITERATIONS
}

fn default_max_turns() -> usize {
    20
}

fn default_session_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_llm_api_key_env(),
            temperature: 0.0,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            corpora: CorpusConfig::default(),
            top_k: default_top_k(),
            tavily: TavilyConfig::default(),
            timeout_secs: default_retrieval_timeout_secs(),
        }
    }
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CorpusConfig {
    /// Corpus file for a statute domain; always `None` for web
    pub fn path_for(&self, domain: LegalDomain) -> Option<&PathBuf> {
        match domain {
            LegalDomain::PersonalData => self.personal_data.as_ref(),
            LegalDomain::Labor => self.labor.as_ref(),
            LegalDomain::Housing => self.housing.as_ref(),
            LegalDomain::Web => None,
        }
    }
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            base_url: default_tavily_base_url(),
            api_key_env: default_tavily_api_key_env(),
            max_results: default_tavily_max_results(),
        }
    }
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            acceptance: AcceptancePolicy::default(),
            branch_failure_policy: BranchFailurePolicy::default(),
        }
    }
}

impl OrchestrationConfig {
    /// Workflow settings, with the retrieval timeout taken from `retrieval`.
    /// `max_iterations` is clamped to `1..=MAX_ITERATIONS`.
    pub fn workflow_config(&self, retrieval: &RetrievalConfig) -> WorkflowConfig {
        let corrective_loop = CorrectiveLoopConfig::new()
            .with_max_iterations(self.max_iterations)
            .with_acceptance(self.acceptance)
            .with_retrieval_timeout(retrieval.timeout());

        WorkflowConfig::new()
            .with_branch_failure_policy(self.branch_failure_policy)
            .with_corrective_loop(corrective_loop)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            ttl_secs: default_session_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Never zero, so it can drive `tokio::time::interval`
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Loaded configuration, or the defaults plus the load error for the caller to log
    pub fn load_or_default() -> (Self, Option<config::ConfigError>) {
        Self::or_default(Self::load())
    }

    fn or_default(
        loaded: Result<Self, config::ConfigError>,
    ) -> (Self, Option<config::ConfigError>) {
        match loaded {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.tavily.max_results, 10);
        assert_eq!(config.orchestration.max_iterations, 2);
        assert_eq!(
            config.orchestration.branch_failure_policy,
            BranchFailurePolicy::Abort
        );
    }

    #[test]
    fn test_partial_sections_deserialize() {
        let json = serde_json::json!({
            "llm": { "model": "gpt-4o" },
            "orchestration": { "branch_failure_policy": "degrade", "acceptance": { "strip_threshold": 0.5 } },
            "retrieval": { "corpora": { "labor": "data/labor.json" } }
        });

        let config: AppConfig = serde_json::from_value(json).unwrap();

        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(
            config.orchestration.branch_failure_policy,
            BranchFailurePolicy::Degrade
        );
        assert_eq!(config.orchestration.acceptance.strip_threshold, 0.5);
        assert_eq!(config.orchestration.acceptance.query_relevance_threshold, 0.8);
        assert_eq!(
            config.retrieval.corpora.path_for(LegalDomain::Labor),
            Some(&PathBuf::from("data/labor.json"))
        );
        assert_eq!(config.retrieval.corpora.path_for(LegalDomain::Web), None);
    }

    #[test]
    fn test_workflow_config_mapping() {
        let mut config = AppConfig::default();
        config.orchestration.max_iterations = 0;
        config.retrieval.timeout_secs = 5;

        let workflow = config.orchestration.workflow_config(&config.retrieval);

        assert_eq!(workflow.corrective_loop.max_iterations, 1);
        assert_eq!(workflow.corrective_loop.retrieval_timeout_ms, 5_000);
    }

    #[test]
    fn test_iteration_cap_above_two_is_clamped() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "orchestration": {"max_iterations": 5}
        }))
        .unwrap();

        let workflow = config.orchestration.workflow_config(&config.retrieval);

        assert_eq!(workflow.corrective_loop.max_iterations, MAX_ITERATIONS);
    }

    #[test]
    fn test_invalid_policy_falls_back_to_defaults_with_error() {
        let loaded = config::Config::builder()
            .set_override("orchestration.branch_failure_policy", "explode")
            .and_then(|builder| builder.build())
            .and_then(|config| config.try_deserialize::<AppConfig>());
        assert!(loaded.is_err());

        let (config, error) = AppConfig::or_default(loaded);

        assert!(error.is_some());
        assert_eq!(config.server.port, AppConfig::default().server.port);
        assert_eq!(
            config.orchestration.branch_failure_policy,
            BranchFailurePolicy::default()
        );
    }

    #[test]
    fn test_valid_config_has_no_load_error() {
        let (config, error) = AppConfig::or_default(Ok(AppConfig::default()));

        assert!(error.is_none());
        assert_eq!(config.session.max_turns, AppConfig::default().session.max_turns);
    }
}
