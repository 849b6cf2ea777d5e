//! Server State
//!
//! Shared handles for every request handler and background task.

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_sesv2::Client as SesClient;

use crate::auth::{JwtService, hash_password};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::employee;
use crate::services::{CallAnalyticsClient, Mailer, TalkTimeSource};
use crate::utils::{AppError, AppResult};

use shared::models::EmployeeCreate;

/// Server state, cheap to clone
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | immutable runtime configuration |
/// | db | SQLite pool + migrations |
/// | jwt | token generation and validation |
/// | talk_time | call-analytics vendor (trait object, stubbed in tests) |
/// | mailer | outgoing email; None when SES is not configured |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub jwt: Arc<JwtService>,
    pub talk_time: Arc<dyn TalkTimeSource>,
    pub mailer: Option<Mailer>,
}

impl ServerState {
    /// Manual construction; tests use this to swap in a stub vendor
    pub fn new(
        config: Config,
        db: DbService,
        jwt: Arc<JwtService>,
        talk_time: Arc<dyn TalkTimeSource>,
        mailer: Option<Mailer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            db,
            jwt,
            talk_time,
            mailer,
        }
    }

    /// Initialize all services from configuration
    ///
    /// Opens the database (running migrations), seeds the first admin
    /// account when the employee table is empty, builds the vendor
    /// client, and wires up SES when a sender address is configured.
    pub async fn initialize(config: Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| AppError::internal(format!("Cannot create data dir: {e}")))?;

        let db = DbService::new(&config.db_path()).await?;
        seed_admin_if_empty(&db, &config).await?;

        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        let talk_time: Arc<dyn TalkTimeSource> =
            Arc::new(CallAnalyticsClient::new(config.call.clone(), config.timezone)?);

        let mailer = match config.ses_from_email.clone() {
            Some(from) => {
                let ses = build_ses_client(config.ses_region.clone()).await;
                tracing::info!(from = %from, "Mailer enabled (SES)");
                Some(Mailer::new(ses, from, config.hr_notify_email.clone()))
            }
            None => {
                tracing::info!("SES_FROM_EMAIL not set; email notifications disabled");
                None
            }
        };

        Ok(Self::new(config, db, jwt, talk_time, mailer))
    }
}

async fn build_ses_client(region: Option<String>) -> SesClient {
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    match region {
        Some(region) => {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(region))
                .build();
            SesClient::new(&ses_config)
        }
        None => SesClient::new(&aws_config),
    }
}

/// First-run bootstrap: without at least one admin nobody can create
/// employees, so an empty table gets the configured admin account.
async fn seed_admin_if_empty(db: &DbService, config: &Config) -> AppResult<()> {
    let existing = employee::count(&db.pool).await?;
    if existing > 0 {
        return Ok(());
    }

    let password_hash = hash_password(&config.admin_password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    let seed = EmployeeCreate {
        emp_id: "ADMIN".to_string(),
        name: "Administrator".to_string(),
        email: config.admin_email.clone(),
        password: String::new(),
        role: Some("admin".to_string()),
        department: "Management".to_string(),
        alias_name: "Administrator".to_string(),
    };
    employee::create(&db.pool, &seed, &password_hash).await?;

    tracing::warn!(
        email = %config.admin_email,
        "Seeded first admin account; change ADMIN_PASSWORD after first login"
    );
    Ok(())
}
