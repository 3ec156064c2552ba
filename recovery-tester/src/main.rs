mod checks;
mod reports;
mod snapshot;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use recovery_profiles::{
    ConsumableValues, LogNotifier, MemorySettingsStore, Profile, ProfileManager, SettingsSchema,
    set_consumable_values,
};
use serde_json::Value;

use checks::{expand_selection, list_checks, run_checks};
use snapshot::{FileActor, load_store, save_store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable, colored output
    Console,
    /// Machine-readable JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "recovery-tester", version = "0.1.0")]
#[command(about = "QA and admin tooling for Rest Recovery settings profiles")]
struct Args {
    /// Settings snapshot file standing in for the host store
    #[arg(long, default_value = "rest-recovery-settings.json")]
    store: PathBuf,

    /// Alternative default-settings schema (JSON object of key -> { default })
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List stored profiles, marking the active one
    List,
    /// Print a stored profile
    Show { name: String },
    /// Print the active profile
    Active,
    /// Activate a profile and project it onto the live settings
    Activate { name: String },
    /// Create a profile from key=value overrides
    Create { name: String, assignments: Vec<String> },
    /// Apply key=value overrides to an existing profile
    Update { name: String, assignments: Vec<String> },
    /// Set consumable flags on an actor document
    Consumables {
        /// Actor JSON document ({ "kind": "Actor", "flags": { ... } })
        actor: PathBuf,
        #[arg(long)]
        food: Option<f64>,
        #[arg(long)]
        water: Option<f64>,
        #[arg(long)]
        starvation: Option<f64>,
    },
    /// Run behavioural checks against a fresh in-memory store
    Check {
        /// Checks to run (comma-separated, or "all")
        #[arg(long, default_value = "all")]
        checks: String,
        /// List all available checks and exit
        #[arg(long)]
        list: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut output_target = OutputTarget::new(args.output.clone())?;

    let passed = match &args.command {
        Command::Check { checks, list } => {
            run_check_command(&args, &mut output_target, checks, *list).await?
        }
        Command::Consumables {
            actor,
            food,
            water,
            starvation,
        } => {
            let values = ConsumableValues {
                food: *food,
                water: *water,
                starvation: *starvation,
            };
            let mut actor = FileActor::open(actor)?;
            let updated = set_consumable_values(&mut actor, &values)
                .await
                .context("failed to set consumable values")?;
            serde_json::to_writer_pretty(output_target.writer(), &updated)?;
            writeln!(output_target.writer())?;
            true
        }
        _ => {
            run_profile_command(&args, &mut output_target).await?;
            true
        }
    };

    output_target.flush_inner()?;
    if !passed {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_check_command(
    args: &Args,
    output_target: &mut OutputTarget,
    selection: &str,
    list: bool,
) -> Result<bool> {
    if list {
        writeln!(output_target.writer(), "Available checks:")?;
        for (key, description) in list_checks() {
            writeln!(output_target.writer(), "  {key:25} - {description}")?;
        }
        return Ok(true);
    }

    if args.report == ReportFormat::Console {
        announce_banner();
    }
    let start_time = Instant::now();
    let results = run_checks(&expand_selection(selection)).await;
    match args.report {
        ReportFormat::Json => reports::generate_json_report(output_target.writer(), &results)?,
        ReportFormat::Console => reports::generate_console_report(
            output_target.writer(),
            &results,
            start_time.elapsed(),
        )?,
    }
    Ok(!results.is_empty() && results.iter().all(|r| r.passed))
}

async fn run_profile_command(args: &Args, output_target: &mut OutputTarget) -> Result<()> {
    let schema = load_schema(args.schema.as_deref())?;
    let store = load_store(&args.store)?;
    let manager = ProfileManager::new(store, LogNotifier, schema);
    // Writes already applied by a failed command still land in the snapshot.
    let outcome = execute_profile_command(args, &manager, output_target).await;
    let saved = save_store(&args.store, manager.store());
    match (outcome, saved) {
        (Ok(()), saved) => saved,
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(save_err)) => {
            log::error!("failed to save settings snapshot: {save_err:#}");
            Err(err)
        }
    }
}

async fn execute_profile_command(
    args: &Args,
    manager: &ProfileManager<MemorySettingsStore>,
    output_target: &mut OutputTarget,
) -> Result<()> {
    manager.initialize().await?;
    let json = args.report == ReportFormat::Json;

    match &args.command {
        Command::List => {
            let profiles = manager.all_profiles()?;
            let active = manager.active_profile_name()?;
            reports::write_profile_names(output_target.writer(), &profiles, &active, json)?;
        }
        Command::Show { name } => {
            let profile = manager.profile(name)?;
            reports::write_profile(output_target.writer(), name, &profile, json)?;
        }
        Command::Active => {
            let name = manager.active_profile_name()?;
            let profile = manager.active_profile()?;
            reports::write_profile(output_target.writer(), &name, &profile, json)?;
        }
        Command::Activate { name } => {
            let profile = manager
                .set_active_profile(name)
                .await
                .with_context(|| format!("failed to activate \"{name}\""))?;
            reports::write_profile(output_target.writer(), name, &profile, json)?;
        }
        Command::Create { name, assignments } => {
            let patch = parse_assignments(manager, assignments)?;
            let profile = manager.create_profile(name, &patch).await?;
            reports::write_profile(output_target.writer(), name, &profile, json)?;
        }
        Command::Update { name, assignments } => {
            let patch = parse_assignments(manager, assignments)?;
            manager.update_profile(name, &patch).await?;
            let profile = manager.profile(name)?;
            reports::write_profile(output_target.writer(), name, &profile, json)?;
        }
        Command::Consumables { .. } | Command::Check { .. } => {}
    }
    Ok(())
}

fn load_schema(path: Option<&Path>) -> Result<SettingsSchema> {
    let Some(path) = path else {
        return Ok(SettingsSchema::builtin());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    SettingsSchema::from_json(&raw)
        .with_context(|| format!("schema {} is not a settings registration map", path.display()))
}

/// Parse `key=value` pairs; values are read as JSON and fall back to plain strings.
fn parse_assignments(
    manager: &ProfileManager<MemorySettingsStore>,
    assignments: &[String],
) -> Result<Profile> {
    let mut patch = Profile::new();
    for assignment in assignments {
        let Some((key, raw)) = assignment.split_once('=') else {
            bail!("expected key=value, got \"{assignment}\"");
        };
        let key = key.trim();
        if !manager.schema().contains(key) {
            eprintln!("⚠️  Unknown setting {} will be ignored", key.yellow());
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        patch.insert(key, value);
    }
    Ok(patch)
}

fn announce_banner() {
    println!("{}", "🛌 Rest Recovery Profile Checks".bright_cyan().bold());
    println!("{}", "===============================".cyan());
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
