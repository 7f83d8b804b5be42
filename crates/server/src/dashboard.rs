use api_types::dashboard::{
    DailyTotalsView, DashboardQuery, DashboardResponse, IncomeSourceView, KindSummaryView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{Datelike, Utc};

use crate::{
    ServerError,
    convert::{map_transaction_kind, net_worth_view, transaction_view},
    server::{ServerState, Session},
};

/// Month summary; defaults to the current month. The engine rejects months
/// outside 1-12 with a field error.
pub async fn get(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ServerError> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let dashboard = state
        .engine
        .dashboard(year, month, session.user_id())
        .await?;

    Ok(Json(DashboardResponse {
        year: dashboard.year,
        month: dashboard.month,
        first_name: dashboard.first_name,
        summaries: dashboard
            .summaries
            .into_iter()
            .map(|summary| KindSummaryView {
                kind: map_transaction_kind(summary.kind),
                current: summary.current,
                previous: summary.previous,
                change_percent: summary.change_percent,
            })
            .collect(),
        daily: dashboard
            .daily
            .into_iter()
            .map(|day| DailyTotalsView {
                day: day.day,
                income: day.income,
                expense: day.expense,
                saving: day.saving,
            })
            .collect(),
        income_breakdown: dashboard
            .income_breakdown
            .into_iter()
            .map(|source| IncomeSourceView {
                source: source.source,
                amount: source.amount,
            })
            .collect(),
        net_worth: net_worth_view(dashboard.net_worth),
        recent: dashboard
            .recent
            .into_iter()
            .map(transaction_view)
            .collect(),
    }))
}
