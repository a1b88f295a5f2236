//! lcm-admin library - lesson content admin service
//!
//! HTTP API over the lesson repository: catalog browsing, hierarchical CRUD,
//! reordering, student books and announcement generation.

use axum::Router;
use lcm_common::db::SqliteDocumentStore;
use lcm_common::LessonRepository;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod status;

pub use error::{ApiError, ApiResult};
pub use status::StatusBoard;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Admin operations over the document store
    pub repository: LessonRepository,
    /// Shared admin password; `None` disables authentication
    pub admin_password: Option<Arc<String>>,
    /// Issued session tokens (no expiry)
    pub sessions: Arc<RwLock<HashSet<String>>>,
    /// Per-target action status
    pub status: StatusBoard,
}

impl AppState {
    pub fn new(repository: LessonRepository, admin_password: Option<String>) -> Self {
        Self {
            repository,
            admin_password: admin_password.map(Arc::new),
            sessions: Arc::new(RwLock::new(HashSet::new())),
            status: StatusBoard::new(),
        }
    }

    /// State over the SQLite document store
    pub fn from_pool(pool: SqlitePool, admin_password: Option<String>) -> Self {
        let store = Arc::new(SqliteDocumentStore::new(pool));
        Self::new(LessonRepository::new(store), admin_password)
    }
}

/// Build application router
///
/// `/health` and `/api/auth` are public; everything else under `/api`
/// requires a session token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};

    let protected = Router::new()
        .route("/api/catalog", get(api::get_catalog))
        .route("/api/subjects", post(api::create_subject))
        .route(
            "/api/subjects/:code",
            put(api::rename_subject).delete(api::delete_subject),
        )
        .route("/api/subjects/:code/levels", post(api::create_level))
        .route("/api/subjects/:code/levels/:level", delete(api::delete_level))
        .route(
            "/api/subjects/:code/levels/:level/lessons",
            post(api::create_lesson),
        )
        .route(
            "/api/subjects/:code/levels/:level/lessons/:number",
            put(api::save_lesson).delete(api::delete_lesson),
        )
        .route("/api/student-books/:level", put(api::save_student_book))
        .route("/api/order/subjects", post(api::reorder_subjects))
        .route("/api/order/subjects/:code/levels", post(api::reorder_levels))
        .route("/api/form", get(api::get_form))
        .route("/api/generate", post(api::generate))
        .route("/api/status", get(api::get_status))
        .route("/api/save-data", post(api::save_data))
        .route("/api/save-student-book", post(api::save_student_book_by_sheet))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/api/auth", post(api::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
