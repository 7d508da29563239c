use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    name = "canvas-agent",
    version,
    about = "Drawing agent that plans and paints through MCP tools"
)]
pub struct Cli {
    /// Path to the agent configuration (defaults to config/agent.toml)
    #[arg(long)]
    pub config: Option<String>,
}
