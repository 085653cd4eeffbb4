use anyhow::Result;
use clap::Parser;
use framewatch_core::{config, pipeline};

#[derive(Parser)]
#[command(
    name = "framewatch",
    about = "Watches a camera frame drop folder and relays plate reads"
)]
struct Cli {
    /// Config file; environment variables override its values.
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    pipeline::run(cfg).await
}
