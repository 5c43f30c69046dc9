use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route("/:phone", get(get_customer))
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> axum::response::Response {
    let details = body.details();
    match services
        .create_customer(&body.name, body.phone.as_deref(), details)
        .await
    {
        Ok(customer) => {
            (StatusCode::CREATED, Json(dto::customer_to_json(&customer))).into_response()
        }
        Err(e) => errors::op_error_to_response(e),
    }
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ListQuery>,
) -> axum::response::Response {
    let limit = params.limit.unwrap_or(100);
    match services.search_customers(params.q.as_deref(), limit).await {
        Ok(customers) => {
            let items: Vec<_> = customers.iter().map(dto::customer_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::op_error_to_response(e),
    }
}

/// Lookup by phone number (or generated `ID-NNNNNN` reference).
pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(phone): Path<String>,
) -> axum::response::Response {
    match services.customer_by_phone(&phone).await {
        Ok(customer) => (StatusCode::OK, Json(dto::customer_to_json(&customer))).into_response(),
        Err(e) => errors::op_error_to_response(e),
    }
}
