use client_http::HttpEmployeeDirectory;
use roster::events::CompartmentEvent;
use roster::ports::EmployeeDirectory;
use roster::{CompartmentManager, EmployeeService};
use shared::Result;
use shared::config::Config;
use std::sync::Arc;
use storage_engine::MokaStorageFactory;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Everything the transport layer needs, wired once per process.
#[derive(Clone)]
pub struct Gateway {
    pub config: Arc<Config>,
    pub employees: EmployeeService,
    pub event_channel: broadcast::Sender<CompartmentEvent>,
}

impl Gateway {
    /// Loads `.env` if present, then builds from environment variables.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(_) => info!("Loaded environment variables from .env file"),
            Err(_) => info!("No .env file found, using system environment variables"),
        }
        Self::from_config(Config::from_env())
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let directory = Arc::new(HttpEmployeeDirectory::new(&config)?);
        info!("Employee directory at {}", config.upstream_url);
        Ok(Self::with_directory(config, directory))
    }

    /// Builds around any directory implementation.
    pub fn with_directory(config: Config, directory: Arc<dyn EmployeeDirectory>) -> Self {
        let (event_tx, _event_rx) = broadcast::channel(config.event_buffer.max(1));
        let compartments = CompartmentManager::new(&MokaStorageFactory);
        let employees =
            EmployeeService::with_event_broadcaster(directory, compartments, event_tx.clone());

        Self {
            config: Arc::new(config),
            employees,
            event_channel: event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CompartmentEvent> {
        self.event_channel.subscribe()
    }
}

/// Installs a fmt subscriber filtered by `RUST_LOG` (default `info`).
/// Later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
