//! Finance endpoints.
//!
//! - `GET /api/finance/transactions?type=`: ledger, newest first
//! - `GET /api/finance/summary`: income, expense and profit totals
//! - `GET /api/finance/export?type=`: CSV download

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::filters::{finance_summary, parse_tab, transactions_csv, FinanceSummary, TransactionFilter};
use crate::models::Transaction;

/// Spreadsheet apps need the byte-order mark to detect UTF-8.
const UTF8_BOM: &str = "\u{FEFF}";

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl TransactionQuery {
    fn filter(&self) -> Result<TransactionFilter, ApiError> {
        Ok(TransactionFilter {
            kind: parse_tab(self.kind.as_deref())?,
        })
    }
}

#[derive(Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

/// `GET /api/finance/transactions`
pub async fn transactions(
    State(ctx): State<ApiContext>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let filter = query.filter()?;

    let clinic = ctx.core.read_clinic()?;
    let transactions = filter
        .apply(&clinic.transactions)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(TransactionsResponse { transactions }))
}

/// `GET /api/finance/summary`: totals over the whole ledger.
pub async fn summary(State(ctx): State<ApiContext>) -> Result<Json<FinanceSummary>, ApiError> {
    let clinic = ctx.core.read_clinic()?;
    Ok(Json(finance_summary(&clinic.transactions)))
}

/// `GET /api/finance/export`: `transactions_<date>.csv` attachment.
pub async fn export(
    State(ctx): State<ApiContext>,
    Query(query): Query<TransactionQuery>,
) -> Result<Response, ApiError> {
    let filter = query.filter()?;

    let csv = {
        let clinic = ctx.core.read_clinic()?;
        let selected: Vec<Transaction> = filter
            .apply(&clinic.transactions)
            .into_iter()
            .cloned()
            .collect();
        transactions_csv(&selected)
    };

    let filename = format!("transactions_{}.csv", Utc::now().date_naive());
    tracing::info!(%filename, "Transactions exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        format!("{UTF8_BOM}{csv}"),
    )
        .into_response())
}
