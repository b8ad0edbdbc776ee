mod config;
mod ddl;
mod entity;
mod error;
mod generator;
mod mysql;
mod render;
mod schema;
mod typemap;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{GeneratorConfig, DEFAULT_OUTPUT_PATH, DEFAULT_PACKAGE};

/// MySQL schema to requery Kotlin entities.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["datasource", "ddl"])))]
struct Args {
    /// Kotlin package
    #[arg(short, long, default_value = DEFAULT_PACKAGE)]
    package: String,

    /// Database connection string (user:pass@/database or mysql://...)
    #[arg(short, long)]
    datasource: Option<String>,

    /// Read the schema from a MySQL DDL script instead of a database
    #[arg(long)]
    ddl: Option<PathBuf>,

    /// Generate Kotlin interfaces, otherwise it will generate Kotlin data classes
    #[arg(short, long)]
    interface: bool,

    /// Output path
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    path: PathBuf,

    /// Skip tables with unsupported column types instead of aborting
    #[arg(long)]
    skip_unsupported: bool,
}

impl Args {
    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            package: self.package.clone(),
            interface: self.interface,
            output_dir: self.path.clone(),
            skip_unsupported: self.skip_unsupported,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "requery_gen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let tables = match (&args.ddl, &args.datasource) {
        (Some(script), _) => {
            let sql = std::fs::read_to_string(script)
                .with_context(|| format!("reading {}", script.display()))?;
            ddl::parse_ddl(&sql).with_context(|| format!("parsing {}", script.display()))?
        }
        (None, Some(datasource)) => {
            let options = config::connect_options(datasource).context("reading datasource")?;
            mysql::load_schema(&options)
                .await
                .context("loading schema from database")?
        }
        (None, None) => anyhow::bail!("either --datasource or --ddl is required"),
    };

    let config = args.generator_config();
    let written = generator::generate(&tables, &config).context("generating entities")?;
    tracing::info!(files = written.len(), path = %config.output_dir.display(), "done");
    Ok(())
}
