use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use diesel_async::{
    AsyncPgConnection,
    pooled_connection::{AsyncDieselConnectionManager, deadpool::Pool},
};
use dotenv::dotenv;
use tower_http::{cors, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod community;
mod config;
mod error;
mod events;
mod identity;
mod json;
mod mentions;
mod policy;
mod profile;
mod schema;

use config::ServerConfig;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Clone)]
pub struct App {
    pub diesel: Pool<AsyncPgConnection>,
    pub http: reqwest::Client,
    pub config: Arc<ServerConfig>,
    pub events: events::EventBus,
    pub mentions: mentions::MentionQueue,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(ServerConfig::new_from_env());
    tracing::info!("Starting in {} environment", config.env.as_str());

    let manager =
        AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url.clone());
    let diesel = Pool::builder(manager)
        .max_size(10)
        .build()
        .expect("couldn't build the database pool");

    let events = events::EventBus::new();
    events::spawn_event_logger(&events);

    let mentions = mentions::spawn_worker(diesel.clone());

    let app = App {
        diesel,
        http: reqwest::Client::new(),
        config: config.clone(),
        events,
        mentions,
    };

    let router = Router::new()
        .nest("/community", community::routes::route())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .with_state(app);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("couldn't bind the listen address");

    axum::serve(listener, router).await.unwrap();
}

fn cors_layer(config: &ServerConfig) -> cors::CorsLayer {
    let layer = cors::CorsLayer::new()
        .allow_methods(cors::AllowMethods::mirror_request())
        .allow_headers(cors::AllowHeaders::mirror_request())
        .allow_credentials(true);

    match &config.cors_allowed_origin {
        Some(origin) => layer.allow_origin(
            origin
                .parse::<axum::http::HeaderValue>()
                .expect("CORS_ALLOWED_ORIGIN is not a valid header value"),
        ),
        None => layer,
    }
}
