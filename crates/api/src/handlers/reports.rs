//! Sales dashboards for managers and instructors.
//!
//! Handlers load paid-order facts for the requested range (widened to
//! cover the month-over-month window) and hand them to
//! `coursely_core::reporting`, which does all the bucketing and
//! attribution.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use coursely_core::commission::{split_sale, SaleSplit};
use coursely_core::error::CoreError;
use coursely_core::payments::Currency;
use coursely_core::reporting::{
    build_overview, facts_window, month_over_month, summarize_courses, summarize_resellers,
    ChannelTotals, CourseSummary, DateRange, Granularity, MonthOverMonth, OrderFact, Overview,
    ResellerKey, ResellerSummary,
};
use coursely_core::types::DbId;
use coursely_db::models::report::{FactQuery, ReportScope};
use coursely_db::repositories::{CourseRepo, IncomeRateRepo, ReportRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireInstructor, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters shared by every report (`?start=&end=&currency=&granularity=`).
///
/// Without dates the report covers the current month to date. ETB is the
/// default currency; the two currencies are never mixed.
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub currency: Option<String>,
    pub granularity: Option<Granularity>,
}

/// Parsed report parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReportWindow {
    pub currency: Currency,
    pub range: DateRange,
    pub granularity: Option<Granularity>,
    pub today: NaiveDate,
}

impl ReportParams {
    pub(crate) fn resolve(&self, today: NaiveDate) -> AppResult<ReportWindow> {
        let range = match (self.start.as_deref(), self.end.as_deref()) {
            (Some(start), Some(end)) => DateRange::parse(start, end)?,
            (None, None) => DateRange::month_to_date(today),
            _ => {
                return Err(AppError::Core(CoreError::Validation(
                    "Provide both start and end, or neither".into(),
                )))
            }
        };
        range.ensure_reportable(self.granularity)?;
        let currency = match self.currency.as_deref() {
            Some(code) => Currency::parse(code)?,
            None => Currency::Etb,
        };
        Ok(ReportWindow {
            currency,
            range,
            granularity: self.granularity,
            today,
        })
    }
}

/// Resolve `params` against today's date and load the facts in `scope`.
pub(crate) async fn load_report(
    state: &AppState,
    params: &ReportParams,
    scope: ReportScope,
) -> AppResult<(ReportWindow, Vec<OrderFact>)> {
    let window = params.resolve(Utc::now().date_naive())?;
    let query = FactQuery {
        currency: window.currency,
        range: facts_window(&window.range, window.today),
        scope,
    };
    let facts = ReportRepo::load_facts(&state.pool, &query).await?;
    Ok((window, facts))
}

/// Sum the commission split of every fact inside `range`.
pub(crate) fn range_split(
    facts: &[OrderFact],
    range: &DateRange,
    rates: &coursely_core::commission::Rates,
) -> SaleSplit {
    facts
        .iter()
        .filter(|f| range.contains(f.date()))
        .map(|f| split_sale(f.amount, f.channel(), rates))
        .fold(SaleSplit::default(), |acc, s| SaleSplit {
            seller: acc.seller + s.seller,
            affiliate: acc.affiliate + s.affiliate,
            instructor: acc.instructor + s.instructor,
            platform: acc.platform + s.platform,
        })
}

/// Headline figures for the manager dashboard.
#[derive(Debug, Serialize)]
pub struct OverviewSummary {
    pub currency: Currency,
    pub range: DateRange,
    pub totals: ChannelTotals,
    pub month_over_month: MonthOverMonth,
    pub split: SaleSplit,
}

/// GET /api/v1/manager/overview
pub async fn manager_overview(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DataResponse<OverviewSummary>>> {
    let (window, facts) = load_report(&state, &params, ReportScope::All).await?;
    let rates = IncomeRateRepo::current(&state.pool).await?;

    let mut totals = ChannelTotals::default();
    for fact in facts.iter().filter(|f| window.range.contains(f.date())) {
        totals.add_fact(fact);
    }

    Ok(Json(DataResponse {
        data: OverviewSummary {
            currency: window.currency,
            range: window.range,
            totals,
            month_over_month: month_over_month(&facts, window.today),
            split: range_split(&facts, &window.range, &rates),
        },
    }))
}

/// An overview tagged with its currency.
#[derive(Debug, Serialize)]
pub struct OverviewData {
    pub currency: Currency,
    #[serde(flatten)]
    pub overview: Overview,
}

/// GET /api/v1/manager/overview/data
pub async fn manager_overview_data(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DataResponse<OverviewData>>> {
    let (window, facts) = load_report(&state, &params, ReportScope::All).await?;
    let overview = build_overview(&facts, &window.range, window.granularity, window.today);
    Ok(Json(DataResponse {
        data: OverviewData {
            currency: window.currency,
            overview,
        },
    }))
}

/// A sellers-table row with the reseller's display name.
#[derive(Debug, Serialize)]
pub struct SellerRow {
    #[serde(flatten)]
    pub summary: ResellerSummary,
    pub user_id: Option<DbId>,
    pub name: Option<String>,
}

/// Attach names to reseller rows: sellers by id, affiliates by code owner.
pub(crate) async fn label_resellers(
    state: &AppState,
    rows: Vec<ResellerSummary>,
) -> AppResult<Vec<SellerRow>> {
    let mut seller_ids = Vec::new();
    let mut codes = Vec::new();
    for row in &rows {
        match &row.key {
            ResellerKey::Seller { seller_id } => seller_ids.push(*seller_id),
            ResellerKey::Affiliate { code } => codes.push(code.clone()),
        }
    }

    let names: HashMap<DbId, String> = ReportRepo::seller_names(&state.pool, &seller_ids)
        .await?
        .into_iter()
        .map(|n| (n.id, n.name))
        .collect();
    let owners: HashMap<String, (DbId, String)> = ReportRepo::code_owners(&state.pool, &codes)
        .await?
        .into_iter()
        .map(|o| (o.code, (o.user_id, o.name)))
        .collect();

    Ok(rows
        .into_iter()
        .map(|summary| {
            let (user_id, name) = match &summary.key {
                ResellerKey::Seller { seller_id } => {
                    (Some(*seller_id), names.get(seller_id).cloned())
                }
                ResellerKey::Affiliate { code } => match owners.get(code) {
                    Some((id, name)) => (Some(*id), Some(name.clone())),
                    None => (None, None),
                },
            };
            SellerRow {
                summary,
                user_id,
                name,
            }
        })
        .collect())
}

/// GET /api/v1/manager/sellers
pub async fn manager_sellers(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DataResponse<Vec<SellerRow>>>> {
    let (window, facts) = load_report(&state, &params, ReportScope::All).await?;
    let rates = IncomeRateRepo::current(&state.pool).await?;
    let rows = summarize_resellers(&facts, &window.range, &rates, window.today);
    let rows = label_resellers(&state, rows).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// A courses-table row with the course title.
#[derive(Debug, Serialize)]
pub struct CourseRow {
    #[serde(flatten)]
    pub summary: CourseSummary,
    pub title: String,
}

async fn course_rows(state: &AppState, rows: Vec<CourseSummary>) -> AppResult<Vec<CourseRow>> {
    let ids: Vec<DbId> = rows.iter().map(|r| r.course_id).collect();
    let titles: HashMap<DbId, String> = CourseRepo::titles(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|n| (n.id, n.name))
        .collect();
    Ok(rows
        .into_iter()
        .map(|summary| CourseRow {
            title: titles.get(&summary.course_id).cloned().unwrap_or_default(),
            summary,
        })
        .collect())
}

/// GET /api/v1/manager/courses
pub async fn manager_courses(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DataResponse<Vec<CourseRow>>>> {
    let (window, facts) = load_report(&state, &params, ReportScope::All).await?;
    let rates = IncomeRateRepo::current(&state.pool).await?;
    let rows = course_rows(&state, summarize_courses(&facts, &window.range, &rates)).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// Instructor dashboard: sales of the caller's own courses.
#[derive(Debug, Serialize)]
pub struct InstructorOverview {
    pub currency: Currency,
    pub overview: Overview,
    pub courses: Vec<CourseRow>,
    /// The instructor's share of sales in range.
    pub earnings: i64,
}

/// GET /api/v1/instructor/overview
///
/// Managers see the same view scoped to their own courses.
pub async fn instructor_overview(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DataResponse<InstructorOverview>>> {
    let (window, facts) =
        load_report(&state, &params, ReportScope::Instructor(user.user_id)).await?;
    let rates = IncomeRateRepo::current(&state.pool).await?;

    let overview = build_overview(&facts, &window.range, window.granularity, window.today);
    let courses = course_rows(&state, summarize_courses(&facts, &window.range, &rates)).await?;
    let earnings = courses.iter().map(|c| c.summary.instructor_share).sum();

    Ok(Json(DataResponse {
        data: InstructorOverview {
            currency: window.currency,
            overview,
            courses,
            earnings,
        },
    }))
}
