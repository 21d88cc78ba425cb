//! Outland Reports - quarterly trend reports for the Outland Adventures database.

use chrono::{Local, NaiveDate};
use outland_reports::cli::{Cli, Command};
use outland_reports::config::Config;
use outland_reports::db::{self, DatabaseClient};
use outland_reports::error::Result;
use outland_reports::quarter::build_quarter_template;
use outland_reports::render::{self, OutputFormat};
use outland_reports::{logging, report};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let logs_to_file = cli.log_file.is_some();
    match &cli.log_file {
        Some(path) => logging::init_file_logging(path.as_deref()),
        None => logging::init_stderr_logging(),
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        if logs_to_file {
            eprintln!("{}: {}", e.category(), e);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Quarter templates need no database.
    if let Command::Quarters { start, end } = &cli.command {
        print!("{}", quarters_output(*start, *end, cli.output)?);
        return Ok(());
    }

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let connection = cli.resolve_connection(&config)?;
    info!("Connection: {}", connection.display_string());

    let client = db::connect(&connection).await?;
    let outcome = run_command(client.as_ref(), &cli.command, &config, cli.output).await;

    if let Err(e) = client.close().await {
        warn!("Failed to close connection: {e}");
    }

    print!("{}", outcome?);
    Ok(())
}

fn quarters_output(start: NaiveDate, end: NaiveDate, format: OutputFormat) -> Result<String> {
    let (cutoffs, template) = build_quarter_template(start, end)?;
    Ok(render::render_quarters(&cutoffs, &template, format))
}

async fn run_command(
    client: &dyn DatabaseClient,
    command: &Command,
    config: &Config,
    format: OutputFormat,
) -> Result<String> {
    let today = Local::now().date_naive();
    let output = match command {
        Command::Quarters { start, end } => quarters_output(*start, *end, format)?,
        Command::Trips => render::render_quarterly(&report::trip_report(client, today).await?, format),
        Command::Equipment => {
            render::render_quarterly(&report::equipment_report(client, today).await?, format)
        }
        Command::Inventory => {
            let inventory = report::inventory_report(client, &config.reports, today).await?;
            render::render_inventory(&inventory, format)
        }
        Command::Dump { tables } => {
            render::render_dumps(&report::dump_tables(client, tables).await?, format)
        }
        Command::Query { sql } => {
            render::render_query(&report::run_read_only(client, sql).await?, format)
        }
    };
    Ok(output)
}
