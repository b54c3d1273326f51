//! Infrastructure layer - External service implementations

pub mod llm;
pub mod logging;
pub mod observability;
pub mod passage;
pub mod research;
pub mod services;
pub mod session;
