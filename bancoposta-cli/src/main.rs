use anyhow::{Context, Result, bail};
use bancoposta_classify::{classify, convert_all, convert_all_parallel, extract};
use bancoposta_ingest::{StatementKind, read_statement};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod ofx;
mod state;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BANCOPOSTA_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "bancoposta",
    version = VERSION,
    about = "Convert BancoPosta statements to OFX"
)]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a CSV export or PDF statement
    Convert(ConvertArgs),

    /// Show how a single narration is classified and split
    Classify {
        narration: String,

        /// Signed amount, decides generic credit/debit for unknown text
        #[arg(long, default_value_t = Decimal::ZERO, allow_negative_numbers = true)]
        amount: Decimal,
    },

    /// Manage ~/.bancoposta/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Statement file (.csv or .pdf)
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Ofx)]
    format: OutputFormat,

    /// Input kind (default: from the file extension)
    #[arg(long, value_enum)]
    kind: Option<InputKind>,

    /// Account id written to the statement (overrides config)
    #[arg(long)]
    account: Option<String>,

    #[arg(long)]
    currency: Option<String>,

    /// chrono format of the date columns, e.g. %d/%m/%Y
    #[arg(long)]
    date_format: Option<String>,

    /// Classify records on all cores
    #[arg(long)]
    parallel: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Ofx,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputKind {
    Csv,
    Pdf,
}

impl From<InputKind> for StatementKind {
    fn from(kind: InputKind) -> Self {
        match kind {
            InputKind::Csv => StatementKind::Csv,
            InputKind::Pdf => StatementKind::Pdf,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Convert(args) => {
            let cfg = config::load_config()?;
            convert(args, cfg)?;
        }

        Command::Classify { narration, amount } => {
            let category = classify(&narration, amount);
            let extraction = extract(category, &narration);
            if category.is_generic() {
                println!("category:  {category} (no keyword matched, chosen by amount sign)");
            } else {
                println!("category:  {category}");
            }
            println!("type:      {}", category.trn_type());
            println!("payee:     {}", extraction.payee);
            println!("memo:      {}", extraction.memo);
            if let Some(reference) = extraction.reference {
                println!("reference: {reference}");
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let p = config::config_path()?;
                let cfg = config::load_config()?;
                println!("# {}", p.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for the statement
fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn convert(args: ConvertArgs, cfg: config::Config) -> Result<()> {
    if !args.input.exists() {
        bail!("statement not found: {}", args.input.display());
    }

    let cfg = cfg.with_overrides(args.account, args.currency, args.date_format);
    let opts = cfg.reader_options()?;

    let raws = read_statement(&args.input, args.kind.map(StatementKind::from), &opts)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let txns = if args.parallel {
        convert_all_parallel(&raws)
    } else {
        convert_all(&raws)
    };

    let rendered = match args.format {
        OutputFormat::Ofx => ofx::render_ofx(&txns, &cfg.account(), Utc::now().naive_utc()),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&txns).context("serialize transactions")?;
            json.push('\n');
            json
        }
    };

    match args.output {
        Some(path) => {
            fs::write(&path, rendered).with_context(|| format!("write {}", path.display()))?;
            info!(count = txns.len(), path = %path.display(), "wrote statement");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
