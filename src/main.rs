//! Graph demo - client-credentials console application.
//!
//! Authenticates as a daemon application against Azure AD and issues the same
//! directory read twice: once through the typed Graph client and once through
//! a raw bearer-authorized HTTP call.

#![deny(clippy::all)]

mod auth;
mod error;
mod graph;
mod http;
mod settings;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use auth::{ClientCredential, ConfidentialClient, TokenProvider};
use graph::models::GroupSummary;
use graph::GraphClient;
use http::AuthorizedHttpClient;
use settings::{AppSettings, REMEDIATION_MESSAGE};

/// Endpoint bases for the identity provider and the Graph API.
///
/// Defaults to the production URLs; tests point both at a mock server.
#[derive(Debug, Clone)]
struct Endpoints {
    login_base: String,
    graph_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login_base: auth::LOGIN_BASE_URL.to_string(),
            graph_base: graph::GRAPH_BASE_URL.to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        // .env file is optional - only log if it's not a "file not found" error
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    init_logging();

    info!("Starting graphdemo v{}", env!("CARGO_PKG_VERSION"));

    let settings = match AppSettings::load(Path::new("."))? {
        Some(settings) => settings,
        None => {
            println!("{}", REMEDIATION_MESSAGE);
            return Ok(());
        }
    };

    run(settings, Endpoints::default()).await
}

/// Initialize tracing/logging.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

/// Linear driver: typed first-user query, full group listing, raw first-user
/// query. Any failure past configuration loading aborts the run.
async fn run(settings: AppSettings, endpoints: Endpoints) -> Result<()> {
    let credential = ClientCredential::from_settings(&settings.azure_ad)?;
    let token_provider: Arc<dyn TokenProvider> = Arc::new(ConfidentialClient::with_login_base(
        credential,
        endpoints.login_base.clone(),
    )?);

    let graph_client =
        GraphClient::with_base_url(Arc::clone(&token_provider), endpoints.graph_base.clone())?;

    let users = graph_client
        .list_users(1)
        .await
        .context("Failed to list users")?;
    let first_user = users
        .first()
        .ok_or_else(|| anyhow!("Directory returned no users"))?;

    println!("Graph SDK Result");
    println!("{}", first_user.display_name_or_upn());
    debug!("First user (typed): {}", first_user.display_name_or_upn());

    let groups = graph_client
        .list_groups()
        .await
        .context("Failed to list groups")?;
    for summary in groups.iter().map(GroupSummary::from) {
        debug!("groupId:{}, GroupName:{}", summary.group_id, summary.group_name);
    }

    let http_client = AuthorizedHttpClient::new(Arc::clone(&token_provider))?;
    let body = http_client
        .get_text(&format!("{}/users?$top=1", endpoints.graph_base))
        .await
        .context("Failed to query first user over raw HTTP")?;

    println!("HTTP Result");
    println!("{}", body);

    Ok(())
}
