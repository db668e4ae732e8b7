use clap::Parser;
use dotenv::dotenv;

use ghcs_lib::{logging, pipeline, Args, ScrapeConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let args = Args::parse();
    logging::init(args.verbose);

    pipeline::run_scrape(&args, ScrapeConfig::from_env()).await?;
    Ok(())
}
