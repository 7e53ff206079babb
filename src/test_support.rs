use crate::auth::jwt::generate_token;
use crate::config::Config;
use crate::state::AppState;
use crate::storage::{KeyValueStore, MemoryStore};
use actix_web::web::Data;
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// In-memory state with the seed directory and an empty submission list.
pub fn test_state() -> (Data<AppState>, Config) {
    let config = Config::for_tests();
    let durable: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new(Duration::from_secs(3600)));
    let ephemeral: Arc<dyn KeyValueStore> =
        Arc::new(MemoryStore::new(Duration::from_secs(3600)));

    let state = AppState::with_stores(&config, durable, ephemeral).unwrap();
    (Data::new(state), config)
}

/// Rate limiting keys on the peer IP, so every test request needs one.
pub fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

/// Opens a session for a directory user and returns its `Authorization` header value.
pub fn bearer(state: &AppState, config: &Config, user_id: u64, remember: bool) -> String {
    let user = state.directory.find_by_id(user_id).unwrap().unwrap();
    let session = state.sessions.start(user.clone(), remember, Utc::now()).unwrap();
    let token = generate_token(&user, &session.id, &config.jwt_secret, 3600).unwrap();
    format!("Bearer {token}")
}

/// Builds the full application (routes, middleware, rate limits) around test state.
#[macro_export]
macro_rules! test_app {
    ($state:expr, $config:expr) => {{
        let config = $config.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .app_data(actix_web::web::Data::new(config.clone()))
                .configure(|cfg| $crate::routes::configure(cfg, config.clone())),
        )
        .await
    }};
}
