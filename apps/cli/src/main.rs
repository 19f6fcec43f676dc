//! DescriptionEnhancer CLI: pick a catalog scope from the category tree and
//! rewrite its product descriptions with an LLM.

mod commands;
mod menu;

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
