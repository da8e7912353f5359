use anyhow::Result;
use clap::Parser;

use careflow::cli::commands::book::BookCommand;
use careflow::cli::commands::calendar::CalendarCommand;
use careflow::cli::commands::catalog::CatalogCommand;
use careflow::cli::commands::config::ConfigCommand;
use careflow::cli::commands::emergency::EmergencyCommand;
use careflow::cli::commands::profile::ProfileCommand;
use careflow::cli::commands::show_how_to_get_started;
use careflow::cli::{Cli, Commands};
use careflow::{init_telemetry, CareflowConfig, PatientSession};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_loaded = CareflowConfig::load_env_file()?;
    let config = CareflowConfig::load()?;
    init_telemetry(&config.observability)?;
    if env_loaded {
        tracing::info!("Loaded environment variables from .env file");
    }

    tokio::runtime::Runtime::new()?.block_on(run(cli, config))
}

async fn run(cli: Cli, config: CareflowConfig) -> Result<()> {
    let mut session = PatientSession::demo(config);

    match cli.command {
        None => show_how_to_get_started(),
        Some(Commands::Catalog { kind, json, sort }) => CatalogCommand::new(kind)
            .with_json(json)
            .with_sort(sort)
            .execute(session.catalog().as_ref()),
        Some(Commands::Calendar { days }) => CalendarCommand::new(days).execute(&session.config().booking),
        Some(Commands::Book {
            facility,
            department,
            date,
            slot,
            json,
        }) => BookCommand::new(facility, department)
            .with_date(date)
            .with_slot(slot)
            .with_json(json)
            .execute(&mut session),
        Some(Commands::Emergency {
            cancel,
            close_after,
            json,
        }) => {
            EmergencyCommand::new()
                .with_cancel(cancel)
                .with_close_after(close_after)
                .with_json(json)
                .execute(&session)
                .await
        }
        Some(Commands::Profile { json }) => ProfileCommand::new().with_json(json).execute(session.profile()),
        Some(Commands::Config) => ConfigCommand.execute(session.config()),
    }
}
