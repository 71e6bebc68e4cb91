// API server implementation using actix-web

use crate::api::{middleware, routes};
use crate::db::Db;
use crate::ledger::EngagementLedger;
use crate::mailer::Mailer;
use crate::storage::ObjectStorage;
use crate::store::PgStore;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use std::env;

/// Per-request configuration shared with handlers.
#[derive(Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
}

pub struct ApiServer {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub allowed_origins: String,
    pub storage_url: String,
    pub storage_bucket: String,
    pub storage_key: String,
    pub mail_recipient: String,
    pub comment_max_len: usize,
}

impl ApiServer {
    /// Create server from environment variables
    pub fn from_env() -> Result<Self> {
        crate::util::env::init_env();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("Invalid API_PORT")?;

        let jwt_secret =
            env::var("JWT_SECRET").context("JWT_SECRET environment variable is required")?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let storage_url = env::var("STORAGE_URL")
            .unwrap_or_else(|_| "http://localhost:54321".to_string());
        let storage_bucket = env::var("STORAGE_BUCKET").unwrap_or_else(|_| "tucheki".to_string());
        let storage_key = env::var("STORAGE_SERVICE_KEY").unwrap_or_default();

        let mail_recipient =
            env::var("MAIL_RECIPIENT").unwrap_or_else(|_| "admin@tucheki.example".to_string());

        let comment_max_len = crate::util::env::env_parse(
            "COMMENT_MAX_LEN",
            crate::ledger::DEFAULT_COMMENT_MAX_LEN,
        );

        Ok(Self {
            host,
            port,
            jwt_secret,
            allowed_origins,
            storage_url,
            storage_bucket,
            storage_key,
            mail_recipient,
            comment_max_len,
        })
    }

    /// Start the HTTP server
    pub async fn run(self, db: Db) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);

        tracing::info!(
            host = %self.host,
            port = %self.port,
            "Starting tucheki API server"
        );

        let ledger = EngagementLedger::new(PgStore::new(db.clone()))
            .with_comment_max_len(self.comment_max_len);
        let storage =
            ObjectStorage::new(self.storage_url, self.storage_bucket, self.storage_key);
        let mailer = Mailer::new(self.mail_recipient);
        let config = ApiConfig {
            jwt_secret: self.jwt_secret,
        };

        let db_data = web::Data::new(db);
        let ledger_data = web::Data::new(ledger);
        let storage_data = web::Data::new(storage);
        let mailer_data = web::Data::new(mailer);
        let config_data = web::Data::new(config);
        let allowed_origins = self.allowed_origins.clone();

        HttpServer::new(move || {
            let (logger, compress) = middleware::setup_middleware();
            let cors = middleware::setup_cors(&allowed_origins);

            App::new()
                .app_data(db_data.clone())
                .app_data(ledger_data.clone())
                .app_data(storage_data.clone())
                .app_data(mailer_data.clone())
                .app_data(config_data.clone())
                .wrap(logger)
                .wrap(compress)
                .wrap(cors)
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind to {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

        Ok(())
    }
}
