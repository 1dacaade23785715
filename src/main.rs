use actix_web::{App, HttpServer, web};
use notes_api::application::auth_service::AuthService;
use notes_api::application::note_service::NoteService;
use notes_api::data::memory::InMemoryNoteRepository;
use notes_api::data::sqlite::{SqliteNoteRepository, SqliteUserRepository};
use notes_api::data::user_repository::InMemoryUserRepository;
use notes_api::domain::repository::{NoteRepository, UserRepository};
use notes_api::domain::spelling::AcceptAllSpellChecker;
use notes_api::infrastructure::config::{AppConfig, Storage};
use notes_api::infrastructure::database::{create_pool, create_schema};
use notes_api::infrastructure::logging::init_logging;
use notes_api::infrastructure::security::TokenIssuer;
use notes_api::presentation::handlers::AppState;
use notes_api::presentation::middleware::{RequestIdMiddleware, TimingMiddleware};
use notes_api::presentation::routes::{ROUTES, configure};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_logging(&config.log_level);
    info!(config = ?config, "Configuration loaded");

    let (users, notes): (Arc<dyn UserRepository>, Arc<dyn NoteRepository>) = match &config.storage
    {
        Storage::Memory => {
            info!("Using in-memory storage");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryNoteRepository::new()),
            )
        }
        Storage::Sqlite(url) => {
            let pool = create_pool(url).await.map_err(|e| {
                error!(error = %e, "Failed to open database");
                std::io::Error::other(e)
            })?;
            create_schema(&pool).await.map_err(|e| {
                error!(error = %e, "Failed to create schema");
                std::io::Error::other(e)
            })?;
            (
                Arc::new(SqliteUserRepository::new(pool.clone())),
                Arc::new(SqliteNoteRepository::new(pool)),
            )
        }
    };

    let token_issuer = TokenIssuer::from_settings(&config.auth);
    let state = web::Data::new(AppState {
        auth_service: Arc::new(AuthService::new(users, token_issuer)),
        note_service: Arc::new(NoteService::new(notes, Arc::new(AcceptAllSpellChecker))),
    });
    info!("Application state initialized");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .configure(configure)
    });

    let server = server.bind(config.bind_addr.as_str())?;
    info!(address = %config.bind_addr, routes = %ROUTES, "Starting HTTP server");
    server.run().await
}
