//! TopicLens CLI — topic research, article generation, and diagrams.
//!
//! Searches the web for a topic, distills the pages into structured research
//! or an article with a language model, and renders diagrams from free-text
//! descriptions. Everything is also served over a JSON HTTP API.

mod app;
mod commands;
mod server;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
