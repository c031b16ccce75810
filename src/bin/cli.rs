use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use brewtap::config::{Config, DEFAULT_CONFIG_FILE};
use brewtap::digest::{self, ChecksumEntry, CHECKSUM_FILE};
use brewtap::error::BrewtapError;
use brewtap::render::{self, OutputFormat, ReportFormat};
use brewtap::validator::Validator;
use brewtap::GenerateOptions;

#[derive(Parser)]
#[command(
    name = "brewtap",
    about = "Generate Homebrew formulas from release metadata",
    version,
    author
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, global = true, env = "BREWTAP_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate formulas for every release in the config file
    Generate {
        /// Config file path
        #[arg(long, short = 'c', env = "BREWTAP_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Output format (formula, json)
        #[arg(long, short = 'f', default_value = "formula")]
        format: String,

        /// Write formulas here instead of the configured formula folder
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print formulas to stdout instead of writing files
        #[arg(long)]
        stdout: bool,

        /// Reject unverified checksums
        #[arg(long)]
        strict: bool,
    },

    /// Validate every release in the config file and report all failures
    Check {
        /// Config file path
        #[arg(long, short = 'c', env = "BREWTAP_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Reject unverified checksums
        #[arg(long)]
        strict: bool,
    },

    /// Compute SHA-256 digests of release archives
    Digest {
        /// Archives to digest
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Also write a checksum file
        #[arg(long, short = 'o', num_args = 0..=1, default_missing_value = CHECKSUM_FILE)]
        output: Option<PathBuf>,
    },

    /// Print the fields of a generated formula as JSON
    Inspect {
        /// Formula file
        path: PathBuf,
    },

    /// List all validation rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter brewtap.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Generate {
            config,
            format,
            output,
            stdout,
            strict,
        } => cmd_generate(config, format, output, stdout, strict),
        Commands::Check {
            config,
            format,
            strict,
        } => cmd_check(config, format, strict),
        Commands::Digest { files, output } => cmd_digest(files, output),
        Commands::Inspect { path } => cmd_inspect(path),
        Commands::ListRules { format } => cmd_list_rules(format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "brewtap=debug" } else { "brewtap=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_generate(
    config: PathBuf,
    format_str: String,
    output_dir: Option<PathBuf>,
    stdout: bool,
    strict: bool,
) -> Result<i32, BrewtapError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        tracing::warn!(format = %format_str, "unknown format, using formula");
        OutputFormat::Formula
    });

    let options = GenerateOptions { format, strict };
    let formulas = brewtap::generate_all(&config, &options)?;

    if stdout {
        for formula in &formulas {
            print!("{}", formula.contents);
        }
        return Ok(0);
    }

    for path in brewtap::write_formulas(&formulas, output_dir.as_deref())? {
        println!("Wrote {}", path.display());
    }

    Ok(0)
}

fn cmd_check(config: PathBuf, format_str: String, strict: bool) -> Result<i32, BrewtapError> {
    let format = ReportFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        tracing::warn!(format = %format_str, "unknown format, using console");
        ReportFormat::Console
    });

    let options = GenerateOptions {
        strict,
        ..Default::default()
    };
    let report = brewtap::check(&config, &options)?;
    print!("{}", render::render_report(&report, format)?);

    // Exit code: 0 = every formula valid, 1 = at least one failure
    Ok(if report.pass() { 0 } else { 1 })
}

fn cmd_digest(files: Vec<PathBuf>, output: Option<PathBuf>) -> Result<i32, BrewtapError> {
    let computer = digest::computer_for(Default::default());
    let entries = files
        .iter()
        .map(|path| ChecksumEntry::from_file(computer.as_ref(), path))
        .collect::<Result<Vec<_>, _>>()?;

    let rendered = digest::render_checksum_file(&entries);
    print!("{}", rendered);

    if let Some(out) = output {
        std::fs::write(&out, &rendered)?;
        eprintln!("Wrote {}", out.display());
    }

    Ok(0)
}

fn cmd_inspect(path: PathBuf) -> Result<i32, BrewtapError> {
    let text = std::fs::read_to_string(&path)?;
    let parsed = render::parse_formula(&text)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(0)
}

fn cmd_list_rules(format_str: String) -> Result<i32, BrewtapError> {
    let validator = Validator::default();
    let rules = validator.list_rules();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!("{:<12} {:<20} KINDS", "ID", "NAME");
            println!("{}", "-".repeat(72));
            for rule in &rules {
                let kinds: Vec<String> = rule.kinds.iter().map(|k| k.to_string()).collect();
                println!("{:<12} {:<20} {}", rule.id, rule.name, kinds.join(", "));
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, BrewtapError> {
    let path = PathBuf::from(DEFAULT_CONFIG_FILE);

    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", DEFAULT_CONFIG_FILE);
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {}", DEFAULT_CONFIG_FILE);

    Ok(0)
}
