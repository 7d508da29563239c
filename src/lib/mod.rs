pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, tooling};
pub use cli::Cli;
pub use config::{AppConfig, ModelProviderConfig};
pub use domain::types;
pub use infrastructure::model;

use agent::{ActionDispatcher, Agent, AgentError, DecisionEngine, write_session_log};
use config::{QuerySource, SessionLogConfig};
use model::ProviderFactory;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::oneshot;
use tooling::{McpProcess, ToolProvider};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use types::UserQuery;

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!("Starting canvas-agent");
    debug!(config = ?cli.config, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(Path::new);
    let app_config = AppConfig::load(config_path).map_err(AgentError::from)?;
    debug!(
        provider = app_config.provider.id.as_str(),
        model = app_config.model.as_str(),
        server = app_config.server.name.as_str(),
        "Configuration loaded"
    );

    let query = interruptible(resolve_query(&app_config.query), tokio::signal::ctrl_c()).await;
    let Some(query) = query else {
        return Ok(());
    };
    let query = query?;

    let process = McpProcess::new(app_config.server.clone());
    let catalog = match tooling::connect(&process, app_config.agent.startup_timeout).await {
        Ok(catalog) => catalog,
        Err(err) => {
            error!(%err, "Tool provider startup failed");
            process.shutdown().await;
            return Err(AgentError::from(err).into());
        }
    };

    let client = ProviderFactory::create(&app_config.provider);
    let engine = DecisionEngine::new(client, app_config.model.clone(), &catalog);
    let provider: Arc<dyn ToolProvider> = Arc::new(process.clone());
    let dispatcher = ActionDispatcher::new(provider, catalog, app_config.agent.tool_timeout);
    let mut agent = Agent::new(engine, dispatcher);

    let result = interruptible(agent.run(&query), tokio::signal::ctrl_c()).await;

    persist_session(&app_config.session_log, &agent);
    process.shutdown().await;

    match result {
        Some(Ok(outcome)) => {
            info!(iterations = outcome.iterations, "Agent execution finished");
            Ok(())
        }
        Some(Err(err)) => Err(err.into()),
        None => Ok(()),
    }
}

fn persist_session(config: &SessionLogConfig, agent: &Agent) {
    if !config.enabled {
        return;
    }
    if let Err(err) = write_session_log(&config.directory, agent.state()) {
        warn!(%err, "Failed to write session log");
    }
}

/// Runs `task` unless `interrupt` fires first; `None` means the user interrupted.
async fn interruptible<F: Future>(task: F, interrupt: impl Future) -> Option<F::Output> {
    tokio::select! {
        output = task => Some(output),
        _ = interrupt => {
            warn!("Interrupted by user");
            println!("\nInterrupted.");
            None
        }
    }
}

async fn resolve_query(source: &QuerySource) -> Result<UserQuery, AgentError> {
    match source {
        QuerySource::Fixed(query) => Ok(query.clone()),
        QuerySource::Interactive { default_style } => {
            let default_style = default_style.clone();
            read_off_runtime(move || {
                let stdin = io::stdin();
                let mut input = stdin.lock();
                prompt_user_query(&mut input, &default_style)
            })
            .await
        }
    }
}

/// Runs a blocking terminal read on a detached thread so the runtime stays free to
/// observe Ctrl-C and shutdown is not held up by a pending `read_line`.
async fn read_off_runtime<F>(read: F) -> Result<UserQuery, AgentError>
where
    F: FnOnce() -> Result<UserQuery, AgentError> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let _ = tx.send(read());
    });
    rx.await
        .map_err(|_| io::Error::other("terminal input thread stopped"))?
}

/// Asks for the description (until non-empty) and the style on `input`.
fn prompt_user_query(
    input: &mut impl BufRead,
    default_style: &str,
) -> Result<UserQuery, AgentError> {
    let description = loop {
        let line = prompt_line(input, "Describe what you want to create: ")?;
        if !line.is_empty() {
            break line;
        }
        println!("Please enter a description.");
    };

    let style = prompt_line(input, &format!("Style preference [{default_style}]: "))?;
    let style = if style.is_empty() {
        default_style.to_string()
    } else {
        style
    };
    Ok(UserQuery::new(description, style))
}

fn prompt_line(input: &mut impl BufRead, label: &str) -> Result<String, AgentError> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
    }
    Ok(line.trim().to_string())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
