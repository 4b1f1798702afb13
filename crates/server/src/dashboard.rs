use api_types::{
    Amount,
    dashboard::{CategoryTotal, Dashboard, DashboardQuery, MonthSummary, MonthTrend},
};
use axum::{Extension, Json, extract::State};
use engine::{Money, Month, User};

use crate::{
    ServerError,
    entries::{map_kind_back, parse_month},
    extract::ValidQuery,
    server::ServerState,
};

fn amount(value: Money) -> Amount {
    Amount::new(value.to_string())
}

/// Month summary, per-category totals and the trend. `mes` defaults to the
/// current month.
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ValidQuery(query): ValidQuery<DashboardQuery>,
) -> Result<Json<Dashboard>, ServerError> {
    let month = match query.month.as_deref() {
        Some(value) => parse_month(value)?,
        None => Month::current(),
    };
    let dashboard = state.engine.dashboard(user.id, month).await?;
    let totals = dashboard.totals;

    Ok(Json(Dashboard {
        month: dashboard.month.to_string(),
        summary: MonthSummary {
            income: amount(totals.income),
            expense: amount(totals.expense),
            balance: amount(totals.balance()),
            income_completed: amount(totals.income_completed),
            income_pending: amount(totals.income_pending),
            expense_completed: amount(totals.expense_completed),
            expense_pending: amount(totals.expense_pending),
            entries: totals.entries,
        },
        categories: dashboard
            .categories
            .into_iter()
            .map(|total| CategoryTotal {
                category_id: total.category_id,
                name: total.name,
                kind: map_kind_back(total.kind),
                total: amount(total.total),
            })
            .collect(),
        trend: dashboard
            .trend
            .into_iter()
            .map(|point| MonthTrend {
                month: point.month.to_string(),
                income: amount(point.income),
                expense: amount(point.expense),
                balance: amount(point.balance()),
            })
            .collect(),
    }))
}
