use axum::{routing::get, Router};

pub mod bills;
pub mod customers;
pub mod inventory;
pub mod reconcile;
pub mod statements;
pub mod system;

/// Router for all endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/customers", customers::router())
        .nest("/inventory", inventory::router())
        .nest("/bills", bills::router())
        .nest("/statements", statements::router())
        .nest("/reconcile", reconcile::router())
}
