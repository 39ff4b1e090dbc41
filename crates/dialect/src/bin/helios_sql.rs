//! helios-sql
//!
//! Renders report templates and bucketing fragments for a SQL dialect.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use helios_dialect::dialect::{self, DateUnit, Fragments};
use helios_dialect::types::{ParamMap, SqlValue};
use helios_dialect::{DialectConfig, Template, init_logging};
use tracing::{debug, error};

#[derive(Debug, Parser)]
#[command(name = "helios-sql")]
#[command(about = "Render dialect-specific SQL")]
struct Cli {
    #[command(flatten)]
    config: DialectConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bind a template and print the SQL and its parameters as JSON.
    Render {
        /// Template text; read from --file or stdin when omitted.
        template: Option<String>,

        /// Read the template from a file.
        #[arg(long, conflicts_with = "template")]
        file: Option<PathBuf>,

        /// Parameter as name=value; values are parsed as JSON, falling back to text.
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Print a date bucketing fragment.
    Bucket {
        /// Column to bucket.
        #[arg(long, default_value = "website_event.created_at")]
        field: String,

        /// minute, hour, day, month or year.
        #[arg(long, default_value = "day")]
        unit: String,

        /// Timezone to shift to before truncating.
        #[arg(long)]
        timezone: Option<String>,

        /// Print the day-of-week:hour bucket instead (requires --timezone).
        #[arg(long)]
        weekly: bool,
    },
}

fn parse_param(raw: &str) -> anyhow::Result<(String, SqlValue)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("parameter '{}' is not name=value", raw))?;
    let value = serde_json::from_str::<SqlValue>(value).unwrap_or_else(|_| SqlValue::text(value));
    Ok((name.trim().to_string(), value))
}

fn read_template(template: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(template) = template {
        return Ok(template);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read template {}", path.display()));
    }
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("failed to read template from stdin")?;
    Ok(source)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.config.log_level);

    if let Err(errors) = cli.config.validate() {
        for e in &errors {
            error!("Configuration error: {}", e);
        }
        std::process::exit(1);
    }

    let dialect = dialect::install(cli.config.dialect()?)?;
    debug!(dialect = %dialect, "Resolved SQL dialect");

    match cli.command {
        Command::Render {
            template,
            file,
            params,
        } => {
            let source = read_template(template, file)?;
            let params = params
                .iter()
                .map(|p| parse_param(p))
                .collect::<anyhow::Result<ParamMap>>()?;

            let bound = Template::parse(&source).bind(dialect, &params, cli.config.bind_mode())?;
            println!("{}", serde_json::to_string_pretty(&bound)?);
        }
        Command::Bucket {
            field,
            unit,
            timezone,
            weekly,
        } => {
            let fragments = Fragments::fixed_offsets(dialect);
            let sql = if weekly {
                let timezone = timezone.context("--weekly requires --timezone")?;
                fragments.weekly_bucket(&field, &timezone)?
            } else {
                let unit: DateUnit = unit.parse()?;
                fragments.date_bucket(&field, unit, timezone.as_deref())?
            };
            println!("{}", sql);
        }
    }

    Ok(())
}
