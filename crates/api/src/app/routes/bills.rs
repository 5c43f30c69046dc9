use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::NaiveDate;

use pressbill_billing::TotalsPolicy;
use pressbill_statements::{DateRange, StatementScope};

use crate::app::services::{AppServices, BillQuery, BillSort, SortOrder};
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_bill).get(list_bills))
        .route("/:number", get(get_bill))
        .route("/:number", put(update_bill))
        .route("/:number", delete(delete_bill))
}

pub async fn create_bill(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateBillRequest>,
) -> axum::response::Response {
    let policy: Option<TotalsPolicy> = match body.totals_policy.as_deref().map(str::parse) {
        Some(Ok(p)) => Some(p),
        Some(Err(e)) => return errors::domain_error_to_response(e),
        None => None,
    };
    let lines = body.lines.into_iter().map(Into::into).collect();

    match services
        .create_bill(&body.customer_phone, lines, policy)
        .await
    {
        Ok(invoice) => match services.get_bill(invoice.number().as_str()).await {
            Ok(listing) => (
                StatusCode::CREATED,
                Json(dto::bill_detail_json(&listing.invoice, &listing.customer)),
            )
                .into_response(),
            Err(e) => errors::op_error_to_response(e),
        },
        Err(e) => errors::op_error_to_response(e),
    }
}

pub async fn get_bill(
    Extension(services): Extension<Arc<AppServices>>,
    Path(number): Path<String>,
) -> axum::response::Response {
    match services.get_bill(&number).await {
        Ok(listing) => (
            StatusCode::OK,
            Json(dto::bill_detail_json(&listing.invoice, &listing.customer)),
        )
            .into_response(),
        Err(e) => errors::op_error_to_response(e),
    }
}

pub async fn update_bill(
    Extension(services): Extension<Arc<AppServices>>,
    Path(number): Path<String>,
    Json(body): Json<dto::UpdateBillRequest>,
) -> axum::response::Response {
    let lines = body.lines.into_iter().map(Into::into).collect();
    match services.update_bill(&number, lines).await {
        Ok(_) => match services.get_bill(&number).await {
            Ok(listing) => (
                StatusCode::OK,
                Json(dto::bill_detail_json(&listing.invoice, &listing.customer)),
            )
                .into_response(),
            Err(e) => errors::op_error_to_response(e),
        },
        Err(e) => errors::op_error_to_response(e),
    }
}

pub async fn delete_bill(
    Extension(services): Extension<Arc<AppServices>>,
    Path(number): Path<String>,
) -> axum::response::Response {
    match services.delete_bill(&number).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::op_error_to_response(e),
    }
}

pub async fn list_bills(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ListBillsQuery>,
) -> axum::response::Response {
    let range = match parse_range(params.start.as_deref(), params.end.as_deref()) {
        Ok(range) => range,
        Err(resp) => return resp,
    };
    let sort = match params.sort.as_deref().map(str::parse::<BillSort>) {
        Some(Ok(s)) => s,
        Some(Err(e)) => return errors::domain_error_to_response(e),
        None => BillSort::Date,
    };
    let order = match params.order.as_deref().map(str::parse::<SortOrder>) {
        Some(Ok(o)) => o,
        Some(Err(e)) => return errors::domain_error_to_response(e),
        None => SortOrder::Desc,
    };

    let query = BillQuery {
        query: params.q,
        phone: params.phone,
        range,
        sort,
        order,
    };
    match services.list_bills(&query).await {
        Ok(listings) => {
            let items: Vec<_> = listings.iter().map(dto::bill_summary_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::op_error_to_response(e),
    }
}

/// Both bounds or none; dates are `YYYY-MM-DD` and the end is inclusive.
pub(crate) fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<DateRange>, axum::response::Response> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => {
            let start = parse_date(start)?;
            let end = parse_date(end)?;
            let range = StatementScope::Custom { start, end }
                .resolve()
                .map_err(errors::domain_error_to_response)?;
            Ok(Some(range))
        }
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "start and end must be provided together",
        )),
    }
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, axum::response::Response> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("invalid date {s:?}, expected YYYY-MM-DD"),
        )
    })
}
