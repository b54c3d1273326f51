//! Wiring of the research workflow from configuration

use std::sync::Arc;

use tracing::{info, warn};

use super::{
    CorrectiveLoop, LegalResearchWorkflow, LlmAnswerSynthesizer, LlmDomainRouter,
    LlmInformationExtractor, LlmQueryRefiner, LoopAgents, ProviderLanguageModel,
};
use crate::config::AppConfig;
use crate::domain::research::{LanguageModel, LegalDomain, PassageSource, ResearchError};
use crate::infrastructure::llm::{HttpClient, LlmProviderFactory};
use crate::infrastructure::passage::{InMemoryPassageSource, TavilySearchSource};

/// Builds a [`LegalResearchWorkflow`] from [`AppConfig`]
#[derive(Debug)]
pub struct ResearchWorkflowFactory;

impl ResearchWorkflowFactory {
    /// Build with the configured OpenAI-compatible provider
    pub async fn create(config: &AppConfig) -> Result<LegalResearchWorkflow, ResearchError> {
        let provider = LlmProviderFactory::create(&config.llm)?;
        let model = ProviderLanguageModel::new(provider, &config.llm.model)
            .with_temperature(config.llm.temperature)
            .with_timeout(config.llm.timeout());

        info!(model = %config.llm.model, "Language model configured");

        Self::create_with_model(config, Arc::new(model)).await
    }

    /// Build around an injected model shared by every agent
    pub async fn create_with_model(
        config: &AppConfig,
        model: Arc<dyn LanguageModel>,
    ) -> Result<LegalResearchWorkflow, ResearchError> {
        let workflow_config = config.orchestration.workflow_config(&config.retrieval);
        let synthesizer = Arc::new(LlmAnswerSynthesizer::new(model.clone()));
        let agents = LoopAgents {
            extractor: Arc::new(LlmInformationExtractor::new(model.clone())),
            refiner: Arc::new(LlmQueryRefiner::new(model.clone())),
            synthesizer: synthesizer.clone(),
        };

        let mut loops = Vec::with_capacity(LegalDomain::ALL.len());
        for domain in LegalDomain::ALL {
            let source = Self::passage_source(config, domain).await?;
            loops.push(CorrectiveLoop::new(
                source,
                agents.clone(),
                workflow_config.corrective_loop.clone(),
            ));
        }

        Ok(LegalResearchWorkflow::new(
            Arc::new(LlmDomainRouter::new(model)),
            loops,
            synthesizer,
        )
        .with_branch_failure_policy(workflow_config.branch_failure_policy))
    }

    async fn passage_source(
        config: &AppConfig,
        domain: LegalDomain,
    ) -> Result<Arc<dyn PassageSource>, ResearchError> {
        let retrieval = &config.retrieval;

        if domain.is_web() {
            let tavily = &retrieval.tavily;
            return match std::env::var(&tavily.api_key_env) {
                Ok(api_key) if !api_key.trim().is_empty() => {
                    let client = HttpClient::with_timeout(retrieval.timeout())?;
                    let source = TavilySearchSource::with_base_url(client, api_key, &tavily.base_url)
                        .with_max_results(tavily.max_results);
                    Ok(Arc::new(source))
                }
                _ => {
                    warn!(
                        "{} is not set; web search answers with the unavailable sentinel",
                        tavily.api_key_env
                    );
                    Ok(Arc::new(InMemoryPassageSource::unavailable(domain)))
                }
            };
        }

        match retrieval.corpora.path_for(domain) {
            Some(path) => {
                let source =
                    InMemoryPassageSource::from_file(domain, path, retrieval.top_k).await?;
                Ok(Arc::new(source))
            }
            None => {
                warn!(%domain, "No corpus configured; searches answer with the unavailable sentinel");
                Ok(Arc::new(InMemoryPassageSource::unavailable(domain)))
            }
        }
    }
}
