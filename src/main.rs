use std::path::Path;
use std::sync::Arc;

use agent_assist::assist::{AgentState, ModelInfo, Orchestrator};
use agent_assist::config::{ServiceConfig, load_env_file};
use agent_assist::server::assist_routes;

#[tokio::main]
async fn main() -> agent_assist::error::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // .env values never override the real environment
    let env_loaded = load_env_file(Path::new(".env"));

    let config = ServiceConfig::from_env();
    let model = ModelInfo {
        provider: config.model.provider.clone(),
        id: config.model.model_id.clone(),
    };

    eprintln!("🤖 Agent Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {} ({})", model.id, model.provider);
    eprintln!("   Assist API: http://0.0.0.0:{}/assist", config.port);
    eprintln!("   Health: http://0.0.0.0:{}/health", config.port);
    eprintln!(
        "   Runs: max {} concurrent, timeout {}s",
        config.runs.max_concurrent_runs,
        config.runs.invoke_timeout.as_secs()
    );
    if env_loaded {
        eprintln!("   Env file: .env");
    }

    // ── Agents ──────────────────────────────────────────────────────────
    // A bad model config doesn't stop the server; requests report it instead.
    let agents = AgentState::build(config.model.llm_config());
    match agents.load_error() {
        Some(detail) => eprintln!("   Agents: unavailable ({})\n", detail),
        None => eprintln!("   Agents: coach, knowledge, operations, compliance\n"),
    }

    let orchestrator = Arc::new(Orchestrator::new(agents, model, &config.runs));
    let app = assist_routes(orchestrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Assist server started");
    axum::serve(listener, app).await?;

    Ok(())
}
