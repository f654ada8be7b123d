//! Client configuration.
//!
//! The project ID and credential file are supplied explicitly at
//! construction time, or read from the environment via
//! [`ClientConfig::from_env`].

use crate::error::{BqClientError, Result};

/// Credential file used when `BQCLIENT_CREDENTIALS_FILE` is not set
pub const DEFAULT_CREDENTIALS_FILE: &str = "client_secret.json";

/// Dataset location used when `BQCLIENT_LOCATION` is not set
pub const DEFAULT_LOCATION: &str = "US";

/// Connection settings for a [`WarehouseClient`](crate::WarehouseClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Google Cloud project that owns the datasets
    pub project_id: String,
    /// Path to the service-account key file
    pub credentials_file: String,
    /// Location newly created datasets are placed in
    pub location: String,
}

impl ClientConfig {
    pub fn new(project_id: impl Into<String>, credentials_file: impl Into<String>) -> ClientConfig {
        ClientConfig {
            project_id: project_id.into(),
            credentials_file: credentials_file.into(),
            location: DEFAULT_LOCATION.to_string(),
        }
    }

    /// Builder-style override of the dataset location
    pub fn with_location(mut self, location: impl Into<String>) -> ClientConfig {
        self.location = location.into();
        self
    }

    /// Read configuration from environment variables
    ///
    /// - `BQCLIENT_PROJECT_ID`: the project identifier (required)
    /// - `BQCLIENT_CREDENTIALS_FILE`: service-account key path
    ///   (default `client_secret.json`)
    /// - `BQCLIENT_LOCATION`: dataset location (default `US`)
    pub fn from_env() -> Result<ClientConfig> {
        let project_id = std::env::var("BQCLIENT_PROJECT_ID").map_err(|_| {
            BqClientError::Config("BQCLIENT_PROJECT_ID environment variable not set".into())
        })?;

        let credentials_file = std::env::var("BQCLIENT_CREDENTIALS_FILE")
            .unwrap_or_else(|_| DEFAULT_CREDENTIALS_FILE.to_string());

        let location =
            std::env::var("BQCLIENT_LOCATION").unwrap_or_else(|_| DEFAULT_LOCATION.to_string());

        Ok(ClientConfig {
            project_id,
            credentials_file,
            location,
        })
    }
}
