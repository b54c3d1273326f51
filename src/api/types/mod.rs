//! Request and response bodies for the HTTP API

pub mod error;
pub mod json;
pub mod legal;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use legal::{AskRequest, AskResponse, SessionResponse};
