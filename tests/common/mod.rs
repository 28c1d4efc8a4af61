//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use chat_rooms::application::services::{ChatService, ChatServiceImpl, JwtAuthProvider};
use chat_rooms::config::{
    ChatSettings, CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, Settings,
    StorageBackend, StorageSettings,
};
use chat_rooms::infrastructure::repositories::InMemoryChatStore;
use chat_rooms::startup::{build_router, AppState};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-with-32-plus-bytes";

/// Settings for the in-memory backend
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: String::new(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: 1,
            run_migrations: false,
        },
        storage: StorageSettings {
            backend: StorageBackend::Memory,
        },
        jwt: JwtSettings {
            secret: TEST_JWT_SECRET.into(),
            access_token_expiry_minutes: 60,
            refresh_window_minutes: 5,
        },
        chat: ChatSettings::default(),
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        log_format: "pretty".into(),
        environment: "test".into(),
    }
}

/// Chat service over a fresh in-memory store
pub fn test_service() -> (Arc<dyn ChatService>, Arc<InMemoryChatStore>) {
    let store = Arc::new(InMemoryChatStore::new());
    let service = Arc::new(ChatServiceImpl::new(store.clone(), ChatSettings::default()));
    (service, store)
}

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryChatStore>,
    issuer: JwtAuthProvider,
}

impl TestApp {
    /// Create a new test application backed by the in-memory store
    pub fn new() -> Self {
        let settings = test_settings();
        let store = Arc::new(InMemoryChatStore::new());
        let issuer = JwtAuthProvider::new(settings.jwt.clone());
        let router = build_router(AppState::new(store.clone(), None, settings));

        Self {
            router,
            store,
            issuer,
        }
    }

    /// Signed bearer token for `user_id`
    pub fn token_for(&self, user_id: Uuid) -> String {
        self.issuer.issue_token(user_id).unwrap()
    }

    /// Send a request, optionally authenticated and with a JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user {
            builder = builder.header("Authorization", format!("Bearer {}", self.token_for(user_id)));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.send("GET", uri, None, None).await
    }

    /// Create a direct chat owned by `creator` and return its JSON
    pub async fn create_chat(&self, creator: Uuid, participants: &[Uuid], is_channel: bool) -> Value {
        let response = self
            .send(
                "POST",
                "/chat/room",
                Some(creator),
                Some(serde_json::json!({
                    "name": "test room",
                    "description": "integration",
                    "participants_ids": participants,
                    "is_channel": is_channel,
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await
    }
}

/// Read a response body as JSON
pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Parse a JSON array of UUID strings
pub fn ids(value: &Value) -> Vec<Uuid> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().parse().unwrap())
        .collect()
}

pub fn users(n: usize) -> Vec<Uuid> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}
