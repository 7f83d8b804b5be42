use api_types::net_worth::{
    AllocationSliceView, NetWorthAtQuery, NetWorthChangeView, NetWorthPointView, NetWorthQuery,
    NetWorthResponse, NetWorthView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{Datelike, NaiveTime, Utc};

use crate::{
    ServerError,
    convert::{allocation_source, net_worth_view},
    server::{ServerState, Session},
};

const DEFAULT_SERIES_MONTHS: u32 = 12;

pub async fn get(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<NetWorthQuery>,
) -> Result<Json<NetWorthResponse>, ServerError> {
    let now = Utc::now();
    let today = now.date_naive();
    let months = query.months.unwrap_or(DEFAULT_SERIES_MONTHS);

    let current = state.engine.net_worth(session.user_id()).await?;
    let change = state
        .engine
        .net_worth_change(now, session.user_id())
        .await?;
    let series = state
        .engine
        .net_worth_series(today.year(), today.month(), months, session.user_id())
        .await?;

    let allocation = current
        .allocation()
        .into_iter()
        .map(|slice| AllocationSliceView {
            source: allocation_source(slice.source),
            value: slice.value,
        })
        .collect();

    Ok(Json(NetWorthResponse {
        current: net_worth_view(current),
        change: NetWorthChangeView {
            previous: change.previous,
            absolute: change.absolute,
            percent: change.percent,
        },
        allocation,
        series: series
            .into_iter()
            .map(|point| NetWorthPointView {
                year: point.year,
                month: point.month,
                assets_total: point.assets_total,
                accounts_total: point.accounts_total,
                net_worth: point.net_worth,
            })
            .collect(),
    }))
}

/// Net worth at the end of the given day (UTC).
pub async fn at(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<NetWorthAtQuery>,
) -> Result<Json<NetWorthView>, ServerError> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)
        .ok_or_else(|| ServerError::Generic("invalid time".to_string()))?;
    let at = query.date.and_time(end_of_day).and_utc();

    let net_worth = state
        .engine
        .net_worth_at(at, session.user_id())
        .await?;
    Ok(Json(net_worth_view(net_worth)))
}
