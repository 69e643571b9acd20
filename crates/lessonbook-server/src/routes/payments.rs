use axum::{extract::State, Json};
use serde::Deserialize;

use crate::db::with_conn;
use crate::error::{AppError, AppResult};
use crate::extract::{lenient_i64, ApiJson, ApiPath, ApiQuery, OwnerQuery};
use crate::models::PaymentRecord;
use crate::routes::lessons::MonthQuery;
use crate::routes::{message, AppState, MessageResponse};
use crate::services::ledger;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub user_id: String,
    pub name: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub pay: i64,
}

/// POST /api/payList
pub async fn record(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RecordPaymentRequest>,
) -> AppResult<Json<MessageResponse>> {
    if body.user_id.is_empty() || body.name.is_empty() {
        return Err(AppError::BadRequest("userId and name are required".into()));
    }

    let RecordPaymentRequest { user_id, name, pay } = body;
    let (owner, member) = (user_id.clone(), name.clone());
    let pay_id = with_conn(&state.db, move |conn| {
        ledger::record_payment(conn, &owner, &member, pay)
    })
    .await?;

    tracing::info!(%user_id, %name, pay, pay_id, "Payment data saved");
    Ok(message("Payment data saved successfully"))
}

/// GET /api/payList/detail/{name}?userId=
pub async fn for_member(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> AppResult<Json<Vec<PaymentRecord>>> {
    let payments = with_conn(&state.db, move |conn| {
        ledger::payments_for_member(conn, &name, &owner.user_id)
    })
    .await?;
    Ok(Json(payments))
}

/// GET /api/payListmonth?month=&userId=
pub async fn for_month(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MonthQuery>,
) -> AppResult<Json<Vec<PaymentRecord>>> {
    let payments = with_conn(&state.db, move |conn| {
        ledger::payments_for_month(conn, query.month, &query.user_id)
    })
    .await?;
    Ok(Json(payments))
}
