use std::{sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{auth::oauth::GoogleClient, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub http_client: reqwest::Client,
    pub google: Option<GoogleClient>,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn init(config: Config) -> Result<Self, anyhow::Error> {
        let state = Self::new_lazy(config)?;

        if state.config.application.run_migration {
            tracing::warn!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&state.pool)
                .await
                .context("Failed to run database migrations.")?;
        }

        Ok(state)
    }

    /// Builds the state without touching the database; connections are opened on first use.
    pub fn new_lazy(config: Config) -> Result<Self, anyhow::Error> {
        let pool = PgPoolOptions::new()
            .min_connections(5)
            .max_connections(30)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(config.database.with_db());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client.")?;

        let google = match &config.oauth.google {
            Some(google) => Some(GoogleClient::new(google.clone())?),
            None => None,
        };

        Ok(AppState {
            pool,
            config,
            http_client,
            google,
        })
    }
}
