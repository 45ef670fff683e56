mod config;
mod display;
mod error;
mod form;
mod schedule;
mod service;
mod store;
mod web;

use log::info;
use std::sync::Arc;

use config::{Config, StoreConfig};
use display::{format_schedule_line, print_schedule};
use service::ScheduleService;
use store::{AmplifyStore, MemoryStore, Store};

const USAGE: &str = "usage: schedule-poll [web [port] | list | show <schedule-id>]";

/// Builds the one store client for this process
fn build_store(config: &Config) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    Ok(match &config.store {
        StoreConfig::Amplify(settings) => {
            info!("Using Amplify Data at {}", settings.endpoint);
            Arc::new(AmplifyStore::connect(settings)?)
        }
        StoreConfig::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Configuration problems stop the process before anything is served
    let config = Config::from_env()?;
    let service = ScheduleService::new(build_store(&config)?);

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None | Some("web") => {
            let port = match args.get(2) {
                Some(raw) => raw.parse::<u16>().map_err(|_| format!("invalid port: {}", raw))?,
                None => config.port,
            };

            info!("Starting web server on {}:{}", config.bind_address, port);
            println!("Access the site at http://localhost:{}", port);

            web::start_server(&config.bind_address, port, service).await?;
        }
        Some("list") => {
            let schedules = service.list_schedules().await?;
            println!("{} schedule(s)", schedules.len());
            for schedule in &schedules {
                println!("  {}", format_schedule_line(schedule));
            }
        }
        Some("show") => {
            let id = args.get(2).ok_or(USAGE)?;
            match service.get_schedule_by_id(id).await? {
                Some(schedule) => print_schedule(&schedule),
                None => return Err(format!("Schedule not found: {}", id).into()),
            }
        }
        Some(_) => return Err(USAGE.into()),
    }

    Ok(())
}
