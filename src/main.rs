use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::io;
use tracing::{info, warn};
use tripledger::application::service::TripService;
use tripledger::config::{AppConfig, StorageType};
use tripledger::domain::access::Session;
use tripledger::domain::ports::{CustomerStoreBox, SettingsStoreBox};
use tripledger::error::LedgerError;
use tripledger::infrastructure::cached::CachedStore;
use tripledger::infrastructure::json_file::JsonFileStore;
use tripledger::infrastructure::sheets::{CsvSheetClient, SheetStore};
use tripledger::interfaces::cli::{self, Cli};
use tripledger::telemetry;

fn open_stores(config: &AppConfig) -> Result<(CustomerStoreBox, SettingsStoreBox)> {
    let storage = &config.storage;
    match storage.storage_type {
        StorageType::Json => {
            let store = JsonFileStore::open(&storage.json.path).into_diagnostic()?;
            info!(path = %store.path().display(), "Using JSON file storage");
            Ok((Box::new(store.clone()), Box::new(store)))
        }
        StorageType::Sheets => {
            let tables = SheetStore::new(CsvSheetClient::new(&storage.sheets.dir));
            info!(dir = %storage.sheets.dir.display(), "Using sheet storage");
            let cached = CachedStore::new(tables.clone(), storage.sheets.cache_ttl());
            Ok((Box::new(cached), Box::new(tables)))
        }
        #[cfg(feature = "storage-rocksdb")]
        StorageType::Rocksdb => {
            use tripledger::infrastructure::rocksdb::RocksDBStore;
            let store = RocksDBStore::open(&storage.rocksdb.path).into_diagnostic()?;
            info!(path = %storage.rocksdb.path.display(), "Using RocksDB storage");
            Ok((Box::new(store.clone()), Box::new(store)))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        StorageType::Rocksdb => {
            warn!(
                "RocksDB storage requested, but 'storage-rocksdb' feature is not enabled. Falling back to JSON file storage."
            );
            let store = JsonFileStore::open(&storage.json.path).into_diagnostic()?;
            Ok((Box::new(store.clone()), Box::new(store)))
        }
    }
}

fn open_session(cli: &Cli, config: &AppConfig) -> Result<Session> {
    if !config.auth.enabled {
        return Ok(Session::local_admin());
    }
    let (Some(user), Some(password)) = (cli.user.as_deref(), cli.password.as_deref()) else {
        return Err::<Session, _>(LedgerError::InvalidCredentials).into_diagnostic();
    };
    if config.auth.uses_default_users() {
        warn!("Built-in accounts are active; define auth.users in the configuration");
    }
    config
        .auth
        .directory()
        .verify(user, password)
        .into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).into_diagnostic()?;
    if let Some(storage_type) = cli.storage {
        config.storage.storage_type = storage_type;
    }
    if let Some(path) = cli.data.clone() {
        match config.storage.storage_type {
            StorageType::Json => config.storage.json.path = path,
            StorageType::Sheets => config.storage.sheets.dir = path,
            StorageType::Rocksdb => config.storage.rocksdb.path = path,
        }
    }

    let session = open_session(&cli, &config)?;
    let (customer_store, settings_store) = open_stores(&config)?;
    let service = TripService::new(customer_store, settings_store, session)
        .with_trip_title(config.trip.title.clone())
        .with_bus_capacity(config.trip.bus_capacity);

    let stdout = io::stdout();
    cli::run(&service, cli.command, stdout.lock())
        .await
        .into_diagnostic()?;

    Ok(())
}
