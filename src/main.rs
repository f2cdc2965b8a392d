use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use idcard::{IdentityCodec, IdentityRecord, LocationQuery, Sex, checksum, config};
use serde_json::json;

#[derive(Parser)]
#[command(
    name = "idcard",
    version,
    about = "Chinese resident identity number toolkit"
)]
struct Cli {
    /// Reference table (location.json); defaults to the bundled table
    #[arg(long, global = true, env = config::LOCATION_FILE_ENV)]
    location: Option<PathBuf>,

    /// Print sex and constellation labels in Chinese
    #[arg(long, global = true)]
    zh: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode an 18-character (or 15-digit) number → JSON
    Parse { id: String },
    /// Synthesize a valid number
    Generate {
        /// 6-digit district code, e.g. "110101" or "441900"
        location: String,
        /// Birth date, YYYYMMDD
        date: String,
        /// Random when omitted
        #[arg(long, value_enum)]
        sex: Option<SexArg>,
    },
    /// Convert a 15-digit number to 18 characters
    Upgrade { id: String },
    /// Check format and check character only (no reference table)
    Check { id: String },
    /// Dump the loaded reference table as JSON
    Location,
}

#[derive(Clone, Copy, ValueEnum)]
enum SexArg {
    Male,
    Female,
}

impl From<SexArg> for Sex {
    fn from(arg: SexArg) -> Self {
        match arg {
            SexArg::Male => Sex::Male,
            SexArg::Female => Sex::Female,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = config::resolve_location_path(cli.location.as_deref());
    let load = || {
        let codec = IdentityCodec::load(&path)
            .with_context(|| format!("cannot load reference table {}", path.display()))?;
        tracing::debug!(path = %path.display(), "reference table ready");
        anyhow::Ok(codec)
    };

    match cli.command {
        Command::Parse { id } => {
            let record = load()?
                .parse(&id)
                .with_context(|| format!("cannot parse {id}"))?;
            print_json(&record_json(&record, cli.zh))?;
        }
        Command::Generate {
            location,
            date,
            sex,
        } => {
            let query = LocationQuery::from(location.as_str());
            let id = load()?
                .generate(&query, &date, sex.map(Sex::from))
                .with_context(|| format!("cannot generate for {location} born {date}"))?;
            println!("{id}");
        }
        Command::Upgrade { id } => {
            let long = load()?
                .upgrade_to_eighteen(&id)
                .with_context(|| format!("cannot upgrade {id}"))?;
            println!("{long}");
        }
        Command::Check { id } => {
            let valid = checksum::check_id_card(&id);
            println!("{}", if valid { "valid" } else { "invalid" });
            if !valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Location => print_json(load()?.table())?,
    }

    Ok(ExitCode::SUCCESS)
}

// ═══════════════════════════════════════════════════════════════════════
//  Output
// ═══════════════════════════════════════════════════════════════════════

fn record_json(record: &IdentityRecord, zh: bool) -> serde_json::Value {
    let mut value = json!(record);
    if zh {
        value["sex"] = json!(record.sex.as_chinese());
        value["constellation"] = json!(record.constellation.as_chinese());
    }
    value
}

fn print_json<T: serde::Serialize>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data).context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}
