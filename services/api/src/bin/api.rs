//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::PgNoteStore, memory::MemoryNoteStore},
    config::Config,
    error::ApiError,
    reaper::run_reaper_loop,
    web::{
        create_note_handler, delete_note_handler, get_note_handler, list_notes_handler,
        rest::ApiDoc, state::AppState, update_note_handler,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use notes_core::gateway::NoteGateway;
use notes_core::ports::NoteStore;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Note Store ---
    let store: Arc<dyn NoteStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let store = PgNoteStore::new(db_pool);
            info!("Running database migrations...");
            store.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store. Notes will not survive a restart.");
            Arc::new(MemoryNoteStore::new())
        }
    };

    // --- 3. Build the Gateway & Shared AppState ---
    let gateway = Arc::new(NoteGateway::with_max_content_chars(
        store,
        config.max_note_chars,
    ));
    let app_state = Arc::new(AppState {
        gateway: gateway.clone(),
        config: config.clone(),
    });

    // --- 4. Start the Background Reaper ---
    info!(
        "Starting reaper with a {}s interval",
        config.reaper_interval_secs
    );
    tokio::spawn(run_reaper_loop(gateway, config.reaper_interval_secs));

    // --- 5. Create the Web Router ---
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let api_router = Router::new()
        .route("/notes", post(create_note_handler).get(list_notes_handler))
        .route(
            "/notes/{id}",
            get(get_note_handler)
                .patch(update_note_handler)
                .delete(delete_note_handler),
        )
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
