use serde::Serialize;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use svcready::{
    Context,
    cli::{Cli, Commands, UnitArgs, parse_args},
    config::{Config, Settings, load_config},
    context::CancelToken,
    ensure_running,
    runner::CommandRunner,
    service::ServiceManager,
};

#[derive(Serialize)]
struct StatusReport<'a> {
    service: &'a str,
    active: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args();
    init_logging(&args);

    let cancel = CancelToken::new();
    register_signal_handler(cancel.clone())?;
    let ctx = Context::with_cancel(cancel);

    match args.command {
        Commands::Ensure {
            unit,
            timeout,
            poll_interval,
        } => {
            let mut config = base_config(&unit)?;
            config.timeout = timeout.or(config.timeout);
            config.poll_interval = poll_interval.or(config.poll_interval);
            let settings = Settings::from_config(&config)?;

            debug!(
                "Ensuring '{}' is active via {} (timeout {:?}, interval {:?})",
                settings.service, settings.manager, settings.timeout, settings.poll_interval
            );
            if let Err(err) = ensure_running(&ctx, &settings) {
                error!("{err}");
                std::process::exit(1);
            }
        }
        Commands::Status { unit, json } => {
            let settings = Settings::from_config(&base_config(&unit)?)?;
            let runner = CommandRunner;
            let manager = ServiceManager::new(&runner, &settings.manager, &settings.service);
            let ctx = ctx.with_timeout(std::time::Instant::now(), settings.timeout);
            let active = manager.is_active(&ctx);

            if json {
                let report = StatusReport {
                    service: &settings.service,
                    active,
                };
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!("{}", if active { "active" } else { "inactive" });
            }
        }
    }

    Ok(())
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Loads the configuration file and applies unit overrides from the command line.
fn base_config(unit: &UnitArgs) -> Result<Config, Box<dyn Error>> {
    let mut config = load_config(unit.config.as_deref())?;
    config.service = unit.service.clone().or(config.service);
    config.manager = unit.manager.clone().or(config.manager);
    Ok(config)
}

fn register_signal_handler(cancel: CancelToken) -> Result<(), Box<dyn Error>> {
    ctrlc::set_handler(move || {
        info!("Interrupted; abandoning readiness check");
        cancel.cancel();
    })?;

    Ok(())
}
