use canvas_agent::Cli;
use clap::Parser;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    canvas_agent::run(Cli::parse()).await
}
