mod health;
mod research;

use axum::Router;
use health::health_router;
use research::research_router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use research::ResearchRequest;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_router())
        .nest("/api", research_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
