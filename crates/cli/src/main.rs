mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use catalog::Catalog;
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use policy::Tier;
use runtime::{
    ChatRequest, ChatResponse, ChatService, GeminiBackend, Identity, Orchestrator, ToolRegistry,
};
use storage::{SessionId, SessionStore, ShortlistStore, UsageTracker};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::Result;

/// Identifier used for quotas when chatting from the terminal.
const LOCAL_IDENTIFIER: &str = "local";

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "A wedding shopping concierge for the terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Account tier to chat as (guest, free, premium)
        #[arg(short, long, default_value = "guest")]
        tier: Tier,
    },
    /// Ask a single question and print the answer
    Ask {
        message: String,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
        #[arg(short, long, default_value = "guest")]
        tier: Tier,
    },
    /// List the tools advertised to the model
    Tools,
    /// List the model roster in failover order
    Models,
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let (config, path) = Config::discover()?;
    if let Some(path) = &path {
        tracing::info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Some(Commands::Chat { tier }) => cmd_chat(&config, path.as_deref(), tier).await,
        None => cmd_chat(&config, path.as_deref(), Tier::Guest).await,
        Some(Commands::Ask { message, json, tier }) => cmd_ask(&config, &message, json, tier).await,
        Some(Commands::Tools) => cmd_tools(&config),
        Some(Commands::Models) => {
            cmd_models(&config);
            Ok(())
        }
    }
}

fn build_service(config: &Config) -> Result<ChatService<GeminiBackend>> {
    let catalog = match &config.catalog.path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    let tools = ToolRegistry::concierge(Arc::new(catalog), Arc::new(ShortlistStore::new()));

    let backend = config.api_key().map(|key| {
        GeminiBackend::builder(key)
            .base_url(config.backend.base_url.as_str())
            .max_output_tokens(config.backend.max_output_tokens)
            .temperature(config.backend.temperature)
            .build()
    });
    if backend.is_none() {
        tracing::warn!("{} not set; answering with canned responses", config::API_KEY_ENV);
    }

    let orchestrator = Orchestrator::new(backend, Arc::new(config.roster()), Arc::new(tools))
        .with_max_rounds(config.backend.max_rounds)
        .with_exchange_timeout(Duration::from_secs(config.backend.exchange_timeout_secs));
    let sessions = SessionStore::with_ttl(chrono::Duration::hours(config.session.ttl_hours));

    let service = ChatService::new(
        orchestrator,
        &config.policy,
        Arc::new(sessions),
        Arc::new(UsageTracker::new()),
    )?;
    Ok(service.with_history_window(config.session.history_window))
}

async fn cmd_chat(config: &Config, path: Option<&Path>, tier: Tier) -> Result<()> {
    let service = build_service(config)?;
    let identity = Identity {
        identifier: LOCAL_IDENTIFIER.to_string(),
        tier,
    };

    println!("concierge v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Config: {}",
        path.map_or("defaults".to_string(), |p| p.display().to_string())
    );
    if service.orchestrator().is_live() {
        println!("Model: {}", service.orchestrator().roster().current().identifier);
    } else {
        println!("Model: none (set {} for live answers)", config::API_KEY_ENV);
    }
    println!("Tier: {tier}");
    println!("Commands: /new, /usage, /reset-models. Type 'quit' or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut session: Option<SessionId> = None;

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        match input {
            "" => continue,
            "quit" | "exit" => break,
            "/new" => {
                session = None;
                println!("Started a new conversation.\n");
                continue;
            }
            "/usage" => {
                let usage = service.usage_status(&identity);
                let resets = Local
                    .from_utc_datetime(&usage.resets_at.naive_utc())
                    .format("%Y-%m-%d %H:%M");
                println!(
                    "{} of {} messages used today; resets {resets}.\n",
                    usage.used, usage.limit
                );
                continue;
            }
            "/reset-models" => {
                service.orchestrator().roster().reset();
                println!(
                    "Model roster reset to {}.\n",
                    service.orchestrator().roster().current().identifier
                );
                continue;
            }
            _ => {}
        }

        let request = ChatRequest {
            session_id: session,
            message: input.to_string(),
            identity: identity.clone(),
        };
        match service.chat(request).await {
            Ok(response) => {
                session = Some(response.session_id);
                print_response(&response);
            }
            Err(e) => {
                let e = error::Error::from(e);
                tracing::error!(error = %e, "chat failed");
                eprintln!("{}\n", e.user_message());
            }
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

async fn cmd_ask(config: &Config, message: &str, json: bool, tier: Tier) -> Result<()> {
    let service = build_service(config)?;
    let response = service
        .chat(ChatRequest {
            session_id: None,
            message: message.to_string(),
            identity: Identity {
                identifier: LOCAL_IDENTIFIER.to_string(),
                tier,
            },
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

fn print_response(response: &ChatResponse) {
    println!("\n{}\n", response.message);
    for call in &response.tool_calls {
        println!("  [tool] {} {}", call.tool, call.args);
    }
    println!(
        "  [{}] {} message(s) left today",
        response.model_used, response.usage.remaining
    );
    if let Some(nudge) = &response.nudge {
        println!("  {}", nudge.message);
    }
    println!();
}

fn cmd_tools(config: &Config) -> Result<()> {
    let service = build_service(config)?;
    for spec in service.orchestrator().tools().specs() {
        println!("{:<22}  {}", spec.name, spec.description);
    }
    Ok(())
}

fn cmd_models(config: &Config) {
    let roster = config.roster();
    println!("{:<4}{:<24}  {:<11}  {:<12}  STATUS", "", "MODEL", "TIER", "DAILY LIMIT");
    println!("{}", "-".repeat(70));
    for (i, candidate) in roster.candidates().iter().enumerate() {
        let marker = if i == roster.cursor() { "*" } else { "" };
        let status = match candidate.status {
            runtime::CandidateStatus::Available => "available",
            runtime::CandidateStatus::Degraded => "degraded",
        };
        println!(
            "{marker:<4}{:<24}  {:<11}  {:<12}  {status}",
            candidate.identifier,
            candidate.tier.to_string(),
            candidate.daily_limit.to_string()
        );
    }
}
