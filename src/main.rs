mod db;
mod rate_limit;
mod render;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use services::admin::AdminCredentials;
use services::cloudinary::{CloudinaryClient, CloudinaryConfig, ImageHost};
use services::emailjs::{EmailJsClient, EmailJsConfig, Mailer};
use services::store::CatalogStore;
use state::{AppState, SiteConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::connect_from_env().await.expect("database init failed");
    if pool.is_none() {
        tracing::warn!("DATABASE_URL not set; catalog edits will not survive a restart");
    }

    let seed = services::seed::load_seed_catalog().expect("seed catalog failed to load");
    let store = CatalogStore::hydrate(pool, seed).await.expect("catalog hydrate failed");

    let mailer: Option<Arc<dyn Mailer>> = match EmailJsConfig::from_env() {
        Some(config) => Some(Arc::new(EmailJsClient::new(config).expect("emailjs client init failed"))),
        None => {
            tracing::warn!("EMAILJS_* not set; enquiries will only offer the WhatsApp hand-off");
            None
        }
    };

    let images: Option<Arc<dyn ImageHost>> = match CloudinaryConfig::from_env() {
        Some(config) => Some(Arc::new(CloudinaryClient::new(config).expect("cloudinary client init failed"))),
        None => {
            tracing::warn!("CLOUDINARY_* not set; admin image uploads disabled");
            None
        }
    };

    let admin_credentials = AdminCredentials::from_env();
    if admin_credentials.is_none() && store.pool().is_none() {
        tracing::warn!("no ADMIN_USERNAME/ADMIN_PASSWORD and no database; admin sign-in disabled");
    }

    let state = AppState::new(store, SiteConfig::from_env(), mailer, images, admin_credentials);
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "wayfarer listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("server failed");
}
