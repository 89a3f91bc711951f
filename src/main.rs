use anyhow::Result;
use weekcal::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
