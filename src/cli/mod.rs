//! CLI module for the Legal RAG Gateway
//!
//! - `serve`: HTTP API server
//! - `ask`: answer one question from the terminal

pub mod ask;
pub mod serve;

use clap::{Parser, Subcommand};

/// Legal RAG Gateway - routed corrective retrieval over Korean consumer law
#[derive(Parser)]
#[command(name = "legal-rag-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer one question and print the final answer
    Ask(ask::AskArgs),
}
