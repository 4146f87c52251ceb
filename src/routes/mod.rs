use axum::Router;

use crate::Dashboard;

mod api;
mod health;

// ---

pub fn router(dashboard: Dashboard) -> Router {
    // ---
    Router::new()
        .merge(api::router())
        .merge(health::router())
        .with_state(dashboard)
}
