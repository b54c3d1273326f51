//! Passage source implementations

mod in_memory;
mod tavily;

pub use in_memory::{CorpusEntry, InMemoryPassageSource};
pub use tavily::{format_web_passage, TavilySearchSource, DEFAULT_TAVILY_BASE_URL, WEB_SOURCE};
