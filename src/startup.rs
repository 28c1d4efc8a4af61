//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{AuthProvider, ChatService, ChatServiceImpl, JwtAuthProvider};
use crate::config::{Settings, StorageBackend};
use crate::domain::ChatStore;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{InMemoryChatStore, PgChatStore};
use crate::presentation::http::handlers::health;
use crate::presentation::http::routes;
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<dyn ChatService>,
    pub auth: Arc<dyn AuthProvider>,
    /// Present when the Postgres store is in use
    pub db: Option<PgPool>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire services on top of an already constructed store.
    pub fn new(store: Arc<dyn ChatStore>, db: Option<PgPool>, settings: Settings) -> Self {
        Self {
            chat_service: Arc::new(ChatServiceImpl::new(store, settings.chat.clone())),
            auth: Arc::new(JwtAuthProvider::new(settings.jwt.clone())),
            db,
            settings: Arc::new(settings),
        }
    }
}

/// Build the full router, middleware included.
pub fn build_router(state: AppState) -> Router {
    let cors = create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        settings.validate()?;
        health::init_server_start();

        let (store, db): (Arc<dyn ChatStore>, Option<PgPool>) = match settings.storage.backend {
            StorageBackend::Postgres => {
                let db = database::create_pool(&settings.database).await?;
                tracing::info!("Database connection pool created");

                if settings.database.run_migrations {
                    database::run_migrations(&db).await?;
                    tracing::info!("Database migrations applied");
                }

                (Arc::new(PgChatStore::new(db.clone())), Some(db))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory chat store; data is lost on restart");
                (Arc::new(InMemoryChatStore::new()), None)
            }
        };

        let addr: SocketAddr = settings.server_addr().parse()?;
        let router = build_router(AppState::new(store, db, settings));

        // Bind to address
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
