//! CLI command definitions

use boomerang_domain::{Dimension, ExecutionContext, ProcessPhase};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Coloured, human-readable output
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for boomerang
#[derive(Parser, Debug)]
#[command(name = "boomerang")]
#[command(author, version, about = "Specialist agent panel with adversarial review")]
#[command(long_about = r#"
Boomerang asks a panel of specialist agents the same question, then lets the
Axiom reviewer challenge their answers.

The process has three phases:
1. Specialists: every specialist answers your prompt in parallel
2. Challenge: Axiom raises challenges against the collective output
3. Response and verdict: targeted specialists respond, Axiom rules on each

Everything is recorded under a subject id, so the panel can be audited,
re-challenged or summarized later.

Configuration files are loaded from (in priority order):
1. BOOMERANG_* environment variables (e.g. BOOMERANG_PROVIDER__MODEL)
2. --config <path>     Explicit config file
3. ./boomerang.toml    Project-level config
4. ~/.config/boomerang/config.toml   Global config

Example:
  boomerang run "Should we move billing to usage-based pricing?"
  boomerang run --dimension design --phase review "Review the onboarding flow"
  boomerang challenge --subject <uuid>
  boomerang chat vela "What is the payback period?"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write diagnostics to a daily-rotated file in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full panel and the Axiom debate on a prompt
    Run {
        /// The prompt every specialist answers
        prompt: String,

        #[command(flatten)]
        context: ContextArgs,

        /// Write the event stream to this JSONL file
        #[arg(long, value_name = "PATH")]
        events: Option<PathBuf>,
    },

    /// Talk to a single agent, streaming its answer
    Chat {
        /// Agent name (e.g. lyra, vela, axiom)
        agent: String,

        /// Message to send; reads lines from stdin when omitted
        message: Option<String>,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Re-run the Axiom debate over the latest persisted opinions
    Challenge {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Show agent assessments and the decision trail of a subject
    Audit {
        /// Subject to audit
        #[arg(long, value_name = "UUID")]
        subject: Uuid,
    },

    /// Summarize the persisted analysis of a subject
    Synopsis {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// List configuration file locations
    Paths,
}

/// Options that make up the execution context of a call
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Subject id; a new one is generated when omitted
    #[arg(long, value_name = "UUID")]
    pub subject: Option<Uuid>,

    /// Dimension (architecture, design, engineering)
    #[arg(long)]
    pub dimension: Option<Dimension>,

    /// Process phase (generate, review, validate, summarize)
    #[arg(long)]
    pub phase: Option<ProcessPhase>,

    /// Goal statement shown to every agent
    #[arg(long)]
    pub goal: Option<String>,

    /// Organization to attribute usage to (requires --user)
    #[arg(long, value_name = "UUID", requires = "user")]
    pub organization: Option<Uuid>,

    /// User to attribute usage to (requires --organization)
    #[arg(long, value_name = "UUID", requires = "organization")]
    pub user: Option<Uuid>,
}

impl ContextArgs {
    /// Build the execution context; `subject` falls back to a fresh id
    pub fn to_context(&self) -> ExecutionContext {
        let mut context = ExecutionContext::new(self.subject.unwrap_or_else(Uuid::new_v4));
        context.dimension = self.dimension;
        context.phase = self.phase;
        context.goal_statement = self.goal.clone();
        context.organization_id = self.organization;
        context.user_id = self.user;
        context
    }
}
