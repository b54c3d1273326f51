//! Ask command - one conversation turn from the terminal

use clap::Args;
use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::logging;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The legal question
    pub question: String,

    /// Session id to continue
    #[arg(long)]
    pub session: Option<String>,

    /// Print per-domain answers after the final answer
    #[arg(long)]
    pub trace: bool,
}

/// Print the final answer, or the user-facing failure message with a non-zero exit
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (config, load_error) = AppConfig::load_or_default();
    logging::init_logging(&config.logging);
    if let Some(e) = load_error {
        warn!(error = %e, "Invalid configuration, falling back to defaults");
    }

    let service = crate::create_conversation_service(&config).await?;

    let turn = match service.ask(&args.question, args.session.as_deref()).await {
        Ok(turn) => turn,
        Err(e) => {
            warn!(error = %e, "Question failed");
            anyhow::bail!(e.user_message());
        }
    };

    println!("{}", turn.outcome.final_answer);

    if args.trace {
        for answer in &turn.outcome.domain_answers {
            println!("\n--- {} ---\n{}", answer.domain.law_name(), answer.answer);
        }
    }

    eprintln!("session: {}", turn.session_id);

    Ok(())
}
