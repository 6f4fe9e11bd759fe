use std::time::Duration;

use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_sesv2::{
    config::{Credentials, Region},
    Client as SesClient,
};
use log::{error, info, warn};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::mail::Mailer;
use crate::store::{MemoryStore, MongoStore, Store};

/// Which storage backend to use. Selected once at launch; the backend
/// never changes per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageMode {
    /// Transient in-process collections.
    Memory,
    /// MongoDB; launch fails if it is unreachable.
    Mongodb,
    /// Try MongoDB once at launch, degrade to memory if unreachable.
    MongodbOrMemory,
}

/// Storage configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables.
#[derive(Deserialize)]
struct StorageConfig {
    // non-secrets
    storage: StorageMode,
    #[serde(default = "default_db_timeout")]
    db_timeout: u64,
    // secrets
    #[serde(default)]
    db_uri: Option<String>,
}

fn default_db_timeout() -> u64 {
    5
}

#[derive(Debug, Error)]
enum ConnectError {
    #[error("`db_uri` is not set")]
    MissingUri,
    #[error(transparent)]
    Db(#[from] mongodb::error::Error),
}

/// Connect the persistent backend using the storage config.
async fn connect(config: &StorageConfig) -> Result<MongoStore, ConnectError> {
    let uri = config.db_uri.as_deref().ok_or(ConnectError::MissingUri)?;
    let store = MongoStore::connect(uri, Duration::from_secs(config.db_timeout)).await?;
    info!("Database connection online");
    Ok(store)
}

/// A fairing that selects the storage backend once, connects it, and places
/// it in managed state as a `Box<dyn Store>`.
pub struct StorageFairing;

#[rocket::async_trait]
impl Fairing for StorageFairing {
    fn info(&self) -> Info {
        Info {
            name: "Storage",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StorageConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load storage config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let store: Box<dyn Store> = match config.storage {
            StorageMode::Memory => {
                info!("Using transient in-memory storage");
                Box::new(MemoryStore::new())
            }
            StorageMode::Mongodb => match connect(&config).await {
                Ok(store) => Box::new(store),
                Err(e) => {
                    error!("Failed to connect to database: {e}");
                    return Err(rocket);
                }
            },
            StorageMode::MongodbOrMemory => match connect(&config).await {
                Ok(store) => Box::new(store),
                Err(e) => {
                    warn!("Database unavailable, degrading to in-memory storage: {e}");
                    Box::new(MemoryStore::new())
                }
            },
        };

        // Manage the state.
        Ok(rocket.manage(store))
    }
}

/// Mail configuration. Everything beyond `public_url` is optional: leave
/// the rest out to run without outbound email (invitations are then only
/// logged).
#[derive(Deserialize)]
struct MailConfig {
    // non-secrets
    public_url: String,
    #[serde(default)]
    mail_from: Option<String>,
    #[serde(default = "default_mail_timeout")]
    mail_timeout: u64,
    #[serde(default)]
    aws_region: Option<String>,
    #[serde(default)]
    aws_access_key_id: Option<String>,
    // secrets
    #[serde(default)]
    aws_secret_access_key: Option<String>,
}

fn default_mail_timeout() -> u64 {
    10
}

/// A fairing that builds the invitation mailer (Amazon SES) and places it
/// in managed state.
pub struct MailerFairing;

#[rocket::async_trait]
impl Fairing for MailerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Mailer",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<MailConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load mail config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let public_url = match Url::parse(&config.public_url) {
            Ok(url) => url,
            Err(e) => {
                error!("Invalid `public_url` {:?}: {e}", config.public_url);
                return Err(rocket);
            }
        };

        let mailer = match (
            config.mail_from,
            config.aws_region,
            config.aws_access_key_id,
            config.aws_secret_access_key,
        ) {
            (Some(from), Some(region), Some(key_id), Some(secret)) => {
                // Construct the connection.
                let aws_config = SdkConfig::builder()
                    .region(Region::new(region))
                    .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                        key_id,
                        secret,
                        None,
                        None,
                        "rocket config",
                    )))
                    .behavior_version(BehaviorVersion::latest())
                    .build();
                let client = SesClient::new(&aws_config);
                info!("Loaded Amazon SES config");
                Mailer::ses(
                    client,
                    from,
                    Duration::from_secs(config.mail_timeout),
                    public_url,
                )
            }
            _ => {
                warn!("Mail config incomplete; invitations will be logged, not sent");
                Mailer::disabled(public_url)
            }
        };

        // Manage the state.
        Ok(rocket.manage(mailer))
    }
}
