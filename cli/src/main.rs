//! CLI entrypoint for Boomerang
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use boomerang_application::{
    AgentPool, AssessUseCase, BoomerangEventSink, CompositeEventSink, DebateController,
    DecisionRepository, GenerateSynopsisUseCase, LlmGateway, NoEvents, RunBoomerangInput,
    RunBoomerangUseCase,
};
use boomerang_domain::{AgentRegistry, BoomerangOutcome, FailureClass, RunStatus};
use boomerang_infrastructure::{
    AnthropicGateway, ConfigLoader, DecisionStore, FileConfig, FileStorageConfig, JsonlEventLog,
};
use boomerang_presentation::{
    ChatSession, Cli, Command, ConfigAction, ConsoleFormatter, ContextArgs, OutputFormat,
    ProgressReporter, SimpleProgress, TurnEnd,
};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_tracing(cli.verbose, cli.log_dir.as_deref());

    info!("Starting Boomerang");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    if let Command::Config { action } = &cli.command {
        return show_config(*action, &cli, &config);
    }

    // === Dependency Injection ===
    let registry = Arc::new(AgentRegistry::standard());
    let repository = open_store(&config.storage)?;

    if let Command::Audit { subject } = &cli.command {
        return audit(*subject, registry, repository, cli.output).await;
    }

    let api_key = match config.provider.resolve_api_key() {
        Some(key) => key,
        None => bail!(
            "No API key found. Set {} or provider.api_key in the configuration.",
            config.provider.api_key_env
        ),
    };
    let gateway: Arc<dyn LlmGateway> = Arc::new(
        AnthropicGateway::new(config.provider.anthropic_config(api_key))
            .context("Failed to create the model provider client")?,
    );
    let pool = Arc::new(AgentPool::new(
        Arc::clone(&registry),
        gateway,
        repository,
        config.agent_settings(),
    ));

    match cli.command {
        Command::Run {
            prompt,
            context,
            events,
        } => {
            let event_log = events.or_else(|| config.events.log.clone());
            run(pool, prompt, &context, event_log, cli.output, cli.quiet).await
        }
        Command::Chat {
            agent,
            message,
            context,
        } => chat(&pool, &agent, message, &context, cli.output).await,
        Command::Challenge { context } => challenge(pool, &context, cli.output, cli.quiet).await,
        Command::Synopsis { context } => synopsis(pool, &context, cli.output).await,
        Command::Audit { .. } | Command::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}

/// Console diagnostics by verbosity (RUST_LOG wins), plus an optional
/// daily-rotated log file
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "boomerang.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .init();
            None
        }
    }
}

fn open_store(storage: &FileStorageConfig) -> Result<Arc<dyn DecisionRepository>> {
    let store = match storage.journal_path() {
        Some(path) => DecisionStore::open(&path)
            .with_context(|| format!("Failed to open decision journal {}", path.display()))?,
        None => {
            info!("Decision store is in-memory; nothing survives this process");
            DecisionStore::in_memory()
        }
    };
    Ok(Arc::new(store))
}

/// Live event renderer for text output; silent for JSON or `--quiet`
fn event_renderer(
    registry: &AgentRegistry,
    output: OutputFormat,
    quiet: bool,
) -> Box<dyn BoomerangEventSink> {
    if quiet || output == OutputFormat::Json {
        Box::new(NoEvents)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new(registry.clone()))
    } else {
        Box::new(SimpleProgress::new(registry.clone()))
    }
}

/// Cancel the token on Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling the run");
            trigger.cancel();
        }
    });
    token
}

fn print_banner(title: &str) {
    println!();
    println!("+============================================================+");
    println!("|{:^60}|", title);
    println!("+============================================================+");
    println!();
}

/// Subject id that must already have history behind it
fn require_subject(context: &ContextArgs) -> Result<()> {
    if context.subject.is_none() {
        bail!("--subject is required; it names the run to read back");
    }
    Ok(())
}

async fn run(
    pool: Arc<AgentPool>,
    prompt: String,
    context: &ContextArgs,
    event_log: Option<PathBuf>,
    output: OutputFormat,
    quiet: bool,
) -> Result<ExitCode> {
    let context = context.to_context();

    if output == OutputFormat::Text && !quiet {
        print_banner("Boomerang - Specialist Panel");
        println!("Prompt: {}", prompt);
        println!("Panel: {}", pool.registry().specialist_names().join(", "));
        println!("Reviewer: {}", pool.registry().reviewer().name);
        println!();
    }

    let renderer = event_renderer(pool.registry(), output, quiet);
    let log = event_log.and_then(JsonlEventLog::new);
    let mut sinks: Vec<&dyn BoomerangEventSink> = vec![renderer.as_ref()];
    if let Some(log) = &log {
        info!("Writing events to {}", log.path().display());
        sinks.push(log);
    }

    let input = RunBoomerangInput::new(context, prompt).with_cancellation(cancel_on_interrupt());
    let use_case = RunBoomerangUseCase::new(pool);
    let outcome = use_case
        .execute(input, &CompositeEventSink::new(sinks))
        .await;

    match output {
        OutputFormat::Text => println!("{}", ConsoleFormatter::format_outcome(&outcome)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&outcome)),
    }

    Ok(exit_code(&outcome))
}

fn exit_code(outcome: &BoomerangOutcome) -> ExitCode {
    match outcome.status {
        RunStatus::Completed | RunStatus::DebateFailed => ExitCode::SUCCESS,
        RunStatus::Aborted | RunStatus::NoOutputs => ExitCode::FAILURE,
    }
}

async fn chat(
    pool: &AgentPool,
    agent: &str,
    message: Option<String>,
    context: &ContextArgs,
    output: OutputFormat,
) -> Result<ExitCode> {
    let context = context.to_context();

    if output == OutputFormat::Json {
        let Some(message) = message else {
            bail!("Interactive chat needs text output; pass a message with --output json");
        };
        let events = pool.get(agent)?.chat(message, &context).collect().await;
        println!("{}", ConsoleFormatter::format_json(&events));
        return Ok(ExitCode::SUCCESS);
    }

    let session = ChatSession::new(pool, agent, context)?;
    match message {
        Some(message) => {
            let turn = session.send(&message, &mut std::io::stdout()).await?;
            Ok(match turn.end {
                TurnEnd::Done { .. } => ExitCode::SUCCESS,
                TurnEnd::Failed(_) | TurnEnd::Interrupted => ExitCode::FAILURE,
            })
        }
        None => {
            session.run_interactive().await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn challenge(
    pool: Arc<AgentPool>,
    context: &ContextArgs,
    output: OutputFormat,
    quiet: bool,
) -> Result<ExitCode> {
    require_subject(context)?;
    let context = context.to_context();
    let renderer = event_renderer(pool.registry(), output, quiet);
    let controller = DebateController::new(pool);

    let debate = match controller
        .challenge_from_history(&context, renderer.as_ref())
        .await
    {
        Ok(debate) => debate,
        Err(e) => {
            if let FailureClass::Fatal(kind) = e.classify() {
                bail!("{}", kind.user_message());
            }
            return Err(e.into());
        }
    };

    match output {
        OutputFormat::Text => println!(
            "{} challenges raised for {}",
            debate.challenge_count(),
            context.subject_id
        ),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&debate)),
    }
    Ok(ExitCode::SUCCESS)
}

async fn audit(
    subject: Uuid,
    registry: Arc<AgentRegistry>,
    repository: Arc<dyn DecisionRepository>,
    output: OutputFormat,
) -> Result<ExitCode> {
    let use_case = AssessUseCase::new(Arc::clone(&registry), repository);
    let report = use_case
        .execute(subject)
        .await
        .context("Failed to read the decision store")?;

    match output {
        OutputFormat::Text => println!("{}", ConsoleFormatter::format_audit(&report, &registry)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&report)),
    }
    Ok(ExitCode::SUCCESS)
}

async fn synopsis(
    pool: Arc<AgentPool>,
    context: &ContextArgs,
    output: OutputFormat,
) -> Result<ExitCode> {
    require_subject(context)?;
    let context = context.to_context();
    let use_case = GenerateSynopsisUseCase::new(pool);

    let synopsis = match use_case.execute(&context).await {
        Ok(synopsis) => synopsis,
        Err(e) => {
            if let FailureClass::Fatal(kind) = e.classify() {
                bail!("{}", kind.user_message());
            }
            return Err(e.into());
        }
    };

    match output {
        OutputFormat::Text => println!("{}", ConsoleFormatter::format_synopsis(&synopsis)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&synopsis)),
    }
    Ok(ExitCode::SUCCESS)
}

fn show_config(action: ConfigAction, cli: &Cli, config: &FileConfig) -> Result<ExitCode> {
    match action {
        ConfigAction::Show => {
            let rendered = config
                .to_toml()
                .context("Failed to render the configuration")?;
            println!("{}", rendered);
        }
        ConfigAction::Paths => {
            if cli.no_config {
                println!("Configuration files are disabled (--no-config)");
            } else {
                for source in ConfigLoader::describe_sources(cli.config.as_deref()) {
                    println!("{}", source);
                }
            }
            match config.storage.journal_path() {
                Some(path) => println!("Journal: {}", path.display()),
                None => println!("Journal: in-memory"),
            }
            if let Some(log) = &config.events.log {
                println!("Event log: {}", log.display());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
