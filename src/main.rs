use std::fs::File;
use std::sync::Mutex;

use clap::Parser;
use graph_quiz::{Config, Quiz};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config = Config::parse();

    // The terminal belongs to the UI, so logs go to a file.
    let log_file = File::create(&config.log_file)?;
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "graph_quiz=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    if config.check {
        let issues = graph_quiz::check_bank(&config.questions)?;
        if issues.is_empty() {
            println!("{}: no problems found", config.questions.display());
            return Ok(());
        }
        for issue in &issues {
            println!("{}", issue);
        }
        color_eyre::eyre::bail!("{} problems found in {}", issues.len(), config.questions.display());
    }

    Quiz::from_config(&config).run().await?;

    Ok(())
}
