use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use eyre::Result;
use medcalc_cli::config::{self, MedcalcConfig};
use medcalc_cli::library::{Library, Origin, check_file};
use medcalc_cli::terminal::{
    Bell, PrintReference, StdoutClipboard, TerminalNotifier, format_form, format_panel,
};
use medcalc_core::schema::Action;
use medcalc_engine::{CalculateOutcome, CalculatorInstance, Collaborators};
use medcalc_export::{FileExporter, ReportFormat};

#[derive(Parser, Debug)]
#[command(name = "medcalc")]
#[command(about = "Schema-driven clinical calculators", long_about = None)]
#[command(version)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Extra directory of calculator schemas (repeatable)
    #[arg(long = "schema-dir", global = true)]
    schema_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available calculators
    List,
    /// Show a calculator's form with its current values
    Show {
        id: String,
        /// Set a field before rendering (`id=value`, repeatable)
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
        /// Print the rendered form as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fill a calculator and compute its result
    Calc {
        id: String,
        /// Field value (`id=value`, repeatable)
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
        /// Export a report after calculating
        #[arg(long)]
        export: bool,
        /// Report format (defaults to the configured one)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Report directory (defaults to the configured one)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the one-line result summary
        #[arg(long)]
        copy: bool,
        /// Open the calculator's reference topic
        #[arg(long)]
        reference: bool,
    },
    /// Validate schema files and their variant binding
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the active configuration
    Show,
    /// Write a default configuration file
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Docx,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Docx => ReportFormat::Docx,
        }
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected id=value, got '{raw}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing field id in '{raw}'"));
    }
    Ok((id.to_string(), value.to_string()))
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = config::load_or_default()?;
    let mut schema_dirs = config.schema_dirs.clone();
    schema_dirs.extend(cli.schema_dirs);

    match cli.command {
        Commands::List => {
            let library = Library::load(&schema_dirs)?;
            for entry in library.entries() {
                match &entry.origin {
                    Origin::Bundled => println!("{:<12} {}", entry.id, entry.title),
                    Origin::File(path) => {
                        println!("{:<12} {} ({})", entry.id, entry.title, path.display())
                    }
                }
            }
        }
        Commands::Show { id, set, json } => {
            let library = Library::load(&schema_dirs)?;
            let mut instance = library.open(&id, collaborators(&config, None, None))?;
            apply(&mut instance, &set)?;
            let form = instance.render()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&form)?);
            } else {
                print!("{}", format_form(&form));
            }
        }
        Commands::Calc {
            id,
            set,
            export,
            format,
            out,
            copy,
            reference,
        } => {
            let library = Library::load(&schema_dirs)?;
            let collaborators = collaborators(&config, format.map(Into::into), out);
            let mut instance = library.open(&id, collaborators)?;
            apply(&mut instance, &set)?;

            match instance.calculate() {
                CalculateOutcome::Displayed => {}
                CalculateOutcome::Invalid(issues) => {
                    eyre::bail!("{} campo(s) inválido(s)", issues.len());
                }
                CalculateOutcome::Failed(e) => return Err(e.into()),
            }
            if let Some(panel) = instance.panel() {
                print!("{}", format_panel(instance.schema(), panel));
            }

            if copy {
                run_action(&mut instance, |a| matches!(a, Action::CopyResult)).await?;
            }
            if export {
                run_action(&mut instance, |a| matches!(a, Action::GenerateReport)).await?;
            }
            if reference {
                run_action(&mut instance, |a| matches!(a, Action::OpenReference { .. })).await?;
            }
        }
        Commands::Check { files } => {
            let mut failed = 0;
            for path in &files {
                match check_file(path) {
                    Ok(schema) => println!(
                        "ok     {} ({} → {})",
                        path.display(),
                        schema.id,
                        schema.variant
                    ),
                    Err(e) => {
                        failed += 1;
                        println!("error  {}: {e}", path.display());
                    }
                }
            }
            if failed > 0 {
                eyre::bail!("{failed} of {} schema file(s) invalid", files.len());
            }
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigCommand::Init => {
                if config::has_config() {
                    eyre::bail!("config already exists at {}", config::config_path()?.display());
                }
                let path = config::save_config(&MedcalcConfig::default())?;
                println!("{}", path.display());
            }
        },
    }

    Ok(())
}

fn collaborators(
    config: &MedcalcConfig,
    format: Option<ReportFormat>,
    out: Option<PathBuf>,
) -> Collaborators {
    let exporter = FileExporter::new(
        out.unwrap_or_else(|| config.export_dir.clone()),
        format.unwrap_or(config.export_format),
    )
    .with_styles(config.styles.clone());
    Collaborators::default()
        .with_notifier(TerminalNotifier)
        .with_export(exporter)
        .with_clipboard(StdoutClipboard)
        .with_reference(PrintReference)
        .with_feedback(Bell::new(config.sound_cues))
}

fn apply(instance: &mut CalculatorInstance, assignments: &[(String, String)]) -> Result<()> {
    for (id, value) in assignments {
        instance.set_value(id, value.as_str())?;
    }
    Ok(())
}

/// Dispatch the first action button matching `wanted`. Only actions the
/// schema declares are available.
async fn run_action(
    instance: &mut CalculatorInstance,
    wanted: impl Fn(&Action) -> bool,
) -> Result<()> {
    let action = instance
        .schema()
        .calculation
        .action_buttons
        .iter()
        .map(|b| b.action.clone())
        .find(|a| wanted(a))
        .ok_or_else(|| eyre::eyre!("{} has no such action", instance.schema().id))?;
    instance.dispatch(&action).await?;
    Ok(())
}
