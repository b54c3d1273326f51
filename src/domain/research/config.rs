//! Orchestration configuration types

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use super::extraction::AcceptancePolicy;

/// What the top-level workflow does when one domain branch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BranchFailurePolicy {
    /// Join every branch, then fail the request with the first branch failure
    #[default]
    Abort,
    /// Record a "no answer from domain" marker and synthesize from the rest
    Degrade,
}

/// Hard upper bound on extract rounds per loop
pub const MAX_ITERATIONS: u32 = 2;

fn clamp_iterations(max_iterations: u32) -> u32 {
    max_iterations.clamp(1, MAX_ITERATIONS)
}

fn deserialize_max_iterations<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    u32::deserialize(deserializer).map(clamp_iterations)
}

/// Configuration for one corrective retrieval loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectiveLoopConfig {
    /// Extract rounds after which the loop always proceeds to generation
    #[serde(
        default = "default_max_iterations",
        deserialize_with = "deserialize_max_iterations"
    )]
    pub max_iterations: u32,
    /// Strip and result acceptance thresholds
    #[serde(default)]
    pub acceptance: AcceptancePolicy,
    /// Timeout for one passage source call, in milliseconds
    #[serde(default = "default_retrieval_timeout_ms")]
    pub retrieval_timeout_ms: u64,
}

fn default_max_iterations() -> u32 {
    MAX_ITERATIONS
}

fn default_retrieval_timeout_ms() -> u64 {
    30_000
}

impl Default for CorrectiveLoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            acceptance: AcceptancePolicy::default(),
            retrieval_timeout_ms: default_retrieval_timeout_ms(),
        }
    }
}

impl CorrectiveLoopConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration cap, clamped to `1..=MAX_ITERATIONS`
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = clamp_iterations(max_iterations);
        self
    }

    pub fn with_acceptance(mut self, acceptance: AcceptancePolicy) -> Self {
        self.acceptance = acceptance;
        self
    }

    pub fn with_retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.retrieval_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn retrieval_timeout(&self) -> Duration {
        Duration::from_millis(self.retrieval_timeout_ms)
    }
}

/// Configuration for the top-level research workflow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub branch_failure_policy: BranchFailurePolicy,
    #[serde(default)]
    pub corrective_loop: CorrectiveLoopConfig,
}

impl WorkflowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch_failure_policy(mut self, policy: BranchFailurePolicy) -> Self {
        self.branch_failure_policy = policy;
        self
    }

    pub fn with_corrective_loop(mut self, config: CorrectiveLoopConfig) -> Self {
        self.corrective_loop = config;
        self
    }
}
