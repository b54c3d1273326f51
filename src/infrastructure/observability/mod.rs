//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_branch_failure, record_llm_request,
    record_loop_iterations, record_request, LlmRequestMetricParams, PrometheusMetrics,
};
