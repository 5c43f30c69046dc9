use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Utc};

use pressbill_statements::{render_csv, StatementScope};

use crate::app::routes::bills::parse_date;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(statement))
}

pub async fn statement(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::StatementQuery>,
) -> axum::response::Response {
    let scope = match parse_scope(&params) {
        Ok(scope) => scope,
        Err(resp) => return resp,
    };

    let report = match services.statement(scope, params.phone.as_deref()).await {
        Ok(report) => report,
        Err(e) => return errors::op_error_to_response(e),
    };

    match params.format.as_deref().unwrap_or("json") {
        "json" => {
            let (rows, page, per_page) =
                report.page(params.page.unwrap_or(1), params.per_page.unwrap_or(100));
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "range": report.range,
                    "invoice_count": report.invoice_count,
                    "total_amount": report.total_amount,
                    "per_company": report.per_company,
                    "per_day": report.per_day,
                    "per_month": report.per_month,
                    "rows": rows,
                    "page": page,
                    "per_page": per_page,
                })),
            )
                .into_response()
        }
        "csv" => match render_csv(&report) {
            Ok(csv) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
                csv,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(err = %e, "statement csv export failed");
                errors::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "export_error",
                    "failed to render csv",
                )
            }
        },
        other => errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("unknown format {other:?}, expected json or csv"),
        ),
    }
}

/// Default scope is the current month.
fn parse_scope(params: &dto::StatementQuery) -> Result<StatementScope, axum::response::Response> {
    let today = Utc::now().date_naive();
    match params.scope.as_deref().unwrap_or("month") {
        "month" => Ok(StatementScope::Month {
            year: params.year.unwrap_or_else(|| today.year()),
            month: params.month.unwrap_or_else(|| today.month()),
        }),
        "year" => Ok(StatementScope::Year {
            year: params.year.unwrap_or_else(|| today.year()),
        }),
        "custom" => match (params.start.as_deref(), params.end.as_deref()) {
            (Some(start), Some(end)) => Ok(StatementScope::Custom {
                start: parse_date(start)?,
                end: parse_date(end)?,
            }),
            _ => Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "custom scope requires start and end dates",
            )),
        },
        other => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("unknown scope {other:?}, expected month, year or custom"),
        )),
    }
}
