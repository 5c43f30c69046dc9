use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/items", post(create_item).get(list_items))
        .route("/items/:name/defaults", get(item_defaults))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    match services
        .create_item(
            &body.name,
            body.hsn,
            body.unit_price,
            body.stock.unwrap_or(Decimal::ZERO),
            body.tax_percent,
        )
        .await
    {
        Ok(item) => (StatusCode::CREATED, Json(dto::item_to_json(&item))).into_response(),
        Err(e) => errors::op_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ListQuery>,
) -> axum::response::Response {
    match services.search_items(params.q.as_deref()).await {
        Ok(items) => {
            let items: Vec<_> = items.iter().map(dto::item_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::op_error_to_response(e),
    }
}

/// Price/tax defaults the bill editor pre-fills when a known item name is
/// typed.
pub async fn item_defaults(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match services.item_defaults(&name).await {
        Ok(defaults) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "unit_price": defaults.unit_price,
                "tax_percent": defaults.tax_percent,
            })),
        )
            .into_response(),
        Err(e) => errors::op_error_to_response(e),
    }
}
