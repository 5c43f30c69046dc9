//! Stateless line-item reconciliation endpoint used by the bill editor.

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use pressbill_billing::{LineItem, ReconcileError};

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(reconcile))
}

pub async fn reconcile(Json(body): Json<dto::ReconcileRequest>) -> axum::response::Response {
    let previous = LineItem {
        quantity: body.quantity,
        unit_rate: body.unit_rate,
        tax_percent: body.tax_percent,
        line_total: body.line_total,
        last_edited: body.last_edited,
    };

    match previous.reconcile(body.field, body.value) {
        Ok(next) => {
            let mut payload = serde_json::json!({
                "quantity": next.quantity,
                "unit_rate": next.unit_rate,
                "tax_percent": next.tax_percent,
                "line_total": next.line_total,
                "last_edited": next.last_edited,
            });
            // Display rounding is opt-in per request; line_total stays exact.
            if body.rounding {
                payload["rounded_total"] = serde_json::json!(next.rounded_total());
            }
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err @ ReconcileError::InvalidInput { .. }) => {
            errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        Err(err @ ReconcileError::DivisionByZero) => errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "division_by_zero",
            err.to_string(),
        ),
    }
}
