use std::env;

use clap::Parser;
use dotenv::dotenv;

use ghcs_lib::{logging, pipeline, ApiArgs, DEFAULT_API_BASE};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let args = ApiArgs::parse();
    logging::init(args.verbose);

    pipeline::run_api(&args, env::var("GITHUB_TOKEN").ok(), DEFAULT_API_BASE).await?;
    Ok(())
}
