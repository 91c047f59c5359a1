//! Application setup and server configuration.

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    add_contact_handler, chat_channel_handler, chat_channels_handler, chat_token_handler,
    check_session_handler, contacts_handler, create_profile_handler, get_profile_handler,
    health_handler, search_user_handler, send_code_handler, update_profile_handler,
    verify_code_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: ServerDeps,
}

/// Build the Axum application router.
///
/// `allowed_origins` empty means any origin. Rate limiting is left to the
/// caller (see `server::middleware::with_rate_limit`) since it needs the
/// peer address.
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let state = AppState { deps };

    let api = Router::new()
        // Phone verification
        .route("/auth/send-code", post(send_code_handler))
        .route("/auth/verify-code", post(verify_code_handler))
        .route("/auth/check-session/:session_id", get(check_session_handler))
        // Profile
        .route("/profile/create", post(create_profile_handler))
        .route(
            "/profile/:session_id",
            get(get_profile_handler).put(update_profile_handler),
        )
        // Users and contacts
        .route("/users/search", post(search_user_handler))
        .route("/users/add-contact", post(add_contact_handler))
        .route("/users/contacts/:session_id", get(contacts_handler))
        // Chat
        .route("/chat/token", post(chat_token_handler))
        .route("/chat/channel", post(chat_channel_handler))
        .route("/chat/channels/:session_id", get(chat_channels_handler));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
