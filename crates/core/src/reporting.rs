//! Sales reporting for the manager, instructor and seller dashboards.
//!
//! Everything here is pure: the caller loads [`OrderFact`]s (paid orders
//! only) and this module buckets them over a date range, attributes each
//! sale to a channel, and computes month-over-month deltas. The `core`
//! crate contains no database dependencies.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::commission::{commission, Rates};
use crate::error::CoreError;
use crate::types::{DbId, MinorUnits, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Ranges spanning at most this many days are bucketed per day.
pub const DAILY_BUCKET_MAX_DAYS: i64 = 31;

/// Longest range any report covers, in days.
pub const MAX_RANGE_DAYS: i64 = 3_660;

/// Longest range that may be bucketed per day when daily buckets are
/// requested explicitly.
pub const MAX_DAILY_RANGE_DAYS: i64 = 366;

/// Date format accepted in query strings and used for daily labels.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Label format for monthly buckets.
pub const MONTH_FORMAT: &str = "%Y-%m";

// ---------------------------------------------------------------------------
// Date ranges
// ---------------------------------------------------------------------------

/// An inclusive calendar date range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range from two dates in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Parse a range from two `YYYY-MM-DD` strings in either order.
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    /// From the first day of `today`'s month up to `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            start: month_start(today),
            end: today,
        }
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Reject ranges too long to report on at `granularity`.
    ///
    /// `None` means the granularity is picked by [`Granularity::for_range`],
    /// which never chooses daily buckets for long ranges.
    pub fn ensure_reportable(&self, granularity: Option<Granularity>) -> Result<(), CoreError> {
        let days = self.days();
        if days > MAX_RANGE_DAYS {
            return Err(CoreError::Validation(format!(
                "Date range covers {days} days; at most {MAX_RANGE_DAYS} are allowed"
            )));
        }
        if granularity == Some(Granularity::Day) && days > MAX_DAILY_RANGE_DAYS {
            return Err(CoreError::Validation(format!(
                "Daily buckets cover at most {MAX_DAILY_RANGE_DAYS} days; use monthly granularity"
            )));
        }
        Ok(())
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::Validation(format!("Invalid date '{value}', expected YYYY-MM-DD")))
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// First day of the month before the one containing `date`.
pub fn previous_month_start(date: NaiveDate) -> NaiveDate {
    let first = month_start(date);
    first.checked_sub_months(Months::new(1)).unwrap_or(first)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

// ---------------------------------------------------------------------------
// Granularity and bucket walking
// ---------------------------------------------------------------------------

/// Size of a reporting bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Month,
}

impl Granularity {
    /// Daily buckets for short ranges, monthly buckets otherwise.
    pub fn for_range(range: &DateRange) -> Self {
        if range.days() <= DAILY_BUCKET_MAX_DAYS {
            Self::Day
        } else {
            Self::Month
        }
    }

    /// Start date of the bucket that `date` falls into.
    pub fn bucket_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Month => month_start(date),
        }
    }
}

/// Walk `range` and return the start date of every bucket it touches.
///
/// Daily walks yield each date from `start` to `end`. Monthly walks yield
/// the first day of every month that overlaps the range, so the first
/// entry may precede `range.start`.
pub fn bucket_starts(range: &DateRange, granularity: Granularity) -> Vec<NaiveDate> {
    let mut starts = Vec::new();
    let mut cursor = granularity.bucket_of(range.start);
    while cursor <= range.end {
        starts.push(cursor);
        let next = match granularity {
            Granularity::Day => cursor.succ_opt(),
            Granularity::Month => cursor.checked_add_months(Months::new(1)),
        };
        match next {
            Some(n) => cursor = n,
            None => break,
        }
    }
    starts
}

/// Display label for the bucket starting at `date`.
pub fn bucket_label(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => date.format(DATE_FORMAT).to_string(),
        Granularity::Month => date.format(MONTH_FORMAT).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Sale attribution
// ---------------------------------------------------------------------------

/// Where a sale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleChannel {
    /// Recorded directly by a seller account; no gateway transaction.
    Seller,
    /// Paid online with someone's referral code.
    Affiliate,
    /// Paid online without a referral code.
    Own,
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Attribute an order to a channel from its `tx_ref` and `code` fields.
///
/// Blank strings count as absent.
pub fn classify_sale(tx_ref: Option<&str>, code: Option<&str>) -> SaleChannel {
    if !present(tx_ref) {
        SaleChannel::Seller
    } else if present(code) {
        SaleChannel::Affiliate
    } else {
        SaleChannel::Own
    }
}

/// A paid order reduced to what the reports need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFact {
    pub order_id: DbId,
    pub course_id: DbId,
    pub seller_id: Option<DbId>,
    pub tx_ref: Option<String>,
    pub code: Option<String>,
    pub amount: MinorUnits,
    /// When the sale counts: payment time, or creation time for offline sales.
    pub occurred_at: Timestamp,
}

impl OrderFact {
    pub fn channel(&self) -> SaleChannel {
        classify_sale(self.tx_ref.as_deref(), self.code.as_deref())
    }

    /// UTC calendar date of the sale.
    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }

    fn normalized_code(&self) -> Option<String> {
        self.code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
    }
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Amounts per channel plus the order count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelTotals {
    pub seller: MinorUnits,
    pub affiliate: MinorUnits,
    pub own: MinorUnits,
    pub total: MinorUnits,
    pub count: i64,
}

impl ChannelTotals {
    pub fn add(&mut self, channel: SaleChannel, amount: MinorUnits) {
        match channel {
            SaleChannel::Seller => self.seller += amount,
            SaleChannel::Affiliate => self.affiliate += amount,
            SaleChannel::Own => self.own += amount,
        }
        self.total += amount;
        self.count += 1;
    }

    pub fn add_fact(&mut self, fact: &OrderFact) {
        self.add(fact.channel(), fact.amount);
    }
}

/// One point of the dashboard series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub start: NaiveDate,
    #[serde(flatten)]
    pub totals: ChannelTotals,
}

/// Current calendar month compared with the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthOverMonth {
    pub current: MinorUnits,
    pub previous: MinorUnits,
    pub percent_change: f64,
    pub current_count: i64,
    pub previous_count: i64,
    pub count_percent_change: f64,
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage change from `previous` to `current`, rounded to two decimals.
///
/// Growth from nothing counts as +100%; no activity in either period is 0%.
pub fn percent_change(previous: i64, current: i64) -> f64 {
    if previous == 0 {
        return if current == 0 { 0.0 } else { 100.0 };
    }
    round2((current - previous) as f64 / previous.abs() as f64 * 100.0)
}

/// Compare the calendar month of `today` with the month before it.
///
/// Facts outside those two months are ignored.
pub fn month_over_month(facts: &[OrderFact], today: NaiveDate) -> MonthOverMonth {
    month_over_month_of(facts.iter(), today)
}

fn month_over_month_of<'a>(
    facts: impl IntoIterator<Item = &'a OrderFact>,
    today: NaiveDate,
) -> MonthOverMonth {
    let current_range = DateRange {
        start: month_start(today),
        end: month_end(today),
    };
    let previous_start = previous_month_start(today);
    let previous_range = DateRange {
        start: previous_start,
        end: month_end(previous_start),
    };

    let mut current = ChannelTotals::default();
    let mut previous = ChannelTotals::default();
    for fact in facts {
        let date = fact.date();
        if current_range.contains(date) {
            current.add_fact(fact);
        } else if previous_range.contains(date) {
            previous.add_fact(fact);
        }
    }

    MonthOverMonth {
        current: current.total,
        previous: previous.total,
        percent_change: percent_change(previous.total, current.total),
        current_count: current.count,
        previous_count: previous.count,
        count_percent_change: percent_change(previous.count, current.count),
    }
}

/// Range of facts a dashboard needs: the requested range plus the two
/// calendar months used by [`month_over_month`].
pub fn facts_window(range: &DateRange, today: NaiveDate) -> DateRange {
    range.union(&DateRange {
        start: previous_month_start(today),
        end: month_end(today),
    })
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Full dashboard overview: bucketed series, range totals, and MoM delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub range: DateRange,
    pub granularity: Granularity,
    pub buckets: Vec<Bucket>,
    pub totals: ChannelTotals,
    pub month_over_month: MonthOverMonth,
}

/// Bucket `facts` over `range`.
///
/// Every bucket in the range is present even when empty, and facts dated
/// outside the range are skipped.
pub fn bucket_series(
    facts: &[OrderFact],
    range: &DateRange,
    granularity: Granularity,
) -> (Vec<Bucket>, ChannelTotals) {
    let mut slots: BTreeMap<NaiveDate, ChannelTotals> = bucket_starts(range, granularity)
        .into_iter()
        .map(|start| (start, ChannelTotals::default()))
        .collect();
    let mut totals = ChannelTotals::default();

    for fact in facts {
        let date = fact.date();
        if !range.contains(date) {
            continue;
        }
        if let Some(slot) = slots.get_mut(&granularity.bucket_of(date)) {
            slot.add_fact(fact);
            totals.add_fact(fact);
        }
    }

    let buckets = slots
        .into_iter()
        .map(|(start, totals)| Bucket {
            label: bucket_label(start, granularity),
            start,
            totals,
        })
        .collect();
    (buckets, totals)
}

/// Build the overview shown on the manager and instructor dashboards.
pub fn build_overview(
    facts: &[OrderFact],
    range: &DateRange,
    granularity: Option<Granularity>,
    today: NaiveDate,
) -> Overview {
    let granularity = granularity.unwrap_or_else(|| Granularity::for_range(range));
    let (buckets, totals) = bucket_series(facts, range, granularity);
    Overview {
        range: *range,
        granularity,
        buckets,
        totals,
        month_over_month: month_over_month(facts, today),
    }
}

// ---------------------------------------------------------------------------
// Per-seller and per-course tables
// ---------------------------------------------------------------------------

/// Identifies who a reseller row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResellerKey {
    Seller { seller_id: DbId },
    Affiliate { code: String },
}

/// One row of the sellers table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResellerSummary {
    #[serde(flatten)]
    pub key: ResellerKey,
    pub count: i64,
    pub gross: MinorUnits,
    pub commission: MinorUnits,
    pub current_month: MinorUnits,
    pub previous_month: MinorUnits,
    pub percent_change: f64,
}

/// Aggregate seller and affiliate sales within `range`.
///
/// Seller sales group by `seller_id`, affiliate sales by referral code
/// (case-insensitive). Own sales have no reseller and are skipped.
/// Month-over-month figures use all facts, not just those in `range`.
/// Rows are ordered by gross descending.
pub fn summarize_resellers(
    facts: &[OrderFact],
    range: &DateRange,
    rates: &Rates,
    today: NaiveDate,
) -> Vec<ResellerSummary> {
    let mut groups: HashMap<ResellerKey, Vec<&OrderFact>> = HashMap::new();
    for fact in facts {
        let key = match fact.channel() {
            SaleChannel::Seller => match fact.seller_id {
                Some(seller_id) => ResellerKey::Seller { seller_id },
                None => continue,
            },
            SaleChannel::Affiliate => match fact.normalized_code() {
                Some(code) => ResellerKey::Affiliate { code },
                None => continue,
            },
            SaleChannel::Own => continue,
        };
        groups.entry(key).or_default().push(fact);
    }

    let mut rows: Vec<ResellerSummary> = groups
        .into_iter()
        .filter_map(|(key, group)| {
            let mut in_range = ChannelTotals::default();
            let mut earned = 0;
            for fact in group.iter().filter(|f| range.contains(f.date())) {
                in_range.add_fact(fact);
                earned += commission(fact.amount, rates.for_channel(fact.channel()));
            }
            let mom = month_over_month_of(group.iter().copied(), today);
            if in_range.count == 0 && mom.current == 0 && mom.previous == 0 {
                return None;
            }
            Some(ResellerSummary {
                key,
                count: in_range.count,
                gross: in_range.total,
                commission: earned,
                current_month: mom.current,
                previous_month: mom.previous,
                percent_change: mom.percent_change,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.gross.cmp(&a.gross).then_with(|| a.key.cmp(&b.key)));
    rows
}

/// One row of the courses table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    pub course_id: DbId,
    #[serde(flatten)]
    pub totals: ChannelTotals,
    pub instructor_share: MinorUnits,
    pub reseller_commission: MinorUnits,
}

/// Aggregate sales per course within `range`, ordered by total descending.
pub fn summarize_courses(
    facts: &[OrderFact],
    range: &DateRange,
    rates: &Rates,
) -> Vec<CourseSummary> {
    let mut by_course: BTreeMap<DbId, CourseSummary> = BTreeMap::new();
    for fact in facts.iter().filter(|f| range.contains(f.date())) {
        let row = by_course
            .entry(fact.course_id)
            .or_insert_with(|| CourseSummary {
                course_id: fact.course_id,
                totals: ChannelTotals::default(),
                instructor_share: 0,
                reseller_commission: 0,
            });
        let channel = fact.channel();
        row.totals.add(channel, fact.amount);
        row.instructor_share += commission(fact.amount, rates.instructor_bps);
        row.reseller_commission += commission(fact.amount, rates.for_channel(channel));
    }

    let mut rows: Vec<CourseSummary> = by_course.into_values().collect();
    rows.sort_by(|a, b| {
        b.totals
            .total
            .cmp(&a.totals.total)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fact(
        id: DbId,
        date: NaiveDate,
        amount: MinorUnits,
        tx_ref: Option<&str>,
        code: Option<&str>,
    ) -> OrderFact {
        OrderFact {
            order_id: id,
            course_id: 1,
            seller_id: if tx_ref.is_none() { Some(7) } else { None },
            tx_ref: tx_ref.map(str::to_string),
            code: code.map(str::to_string),
            amount,
            occurred_at: Utc
                .from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()),
        }
    }

    // -- DateRange ----------------------------------------------------------

    #[test]
    fn reversed_range_is_normalized() {
        let range = DateRange::new(d(2024, 3, 10), d(2024, 3, 1));
        assert_eq!(range.start, d(2024, 3, 1));
        assert_eq!(range.end, d(2024, 3, 10));
        assert_eq!(range.days(), 10);
    }

    #[test]
    fn parse_accepts_either_order() {
        let a = DateRange::parse("2024-01-31", "2024-01-01").unwrap();
        let b = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_matches!(
            DateRange::parse("2024-13-01", "2024-01-01"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            DateRange::parse("yesterday", "2024-01-01"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn oversized_ranges_are_not_reportable() {
        let year = DateRange::new(d(2024, 1, 1), d(2024, 12, 31));
        assert!(year.ensure_reportable(Some(Granularity::Day)).is_ok());
        assert!(year.ensure_reportable(None).is_ok());

        let two_years = DateRange::new(d(2023, 1, 1), d(2024, 12, 31));
        assert_matches!(
            two_years.ensure_reportable(Some(Granularity::Day)),
            Err(CoreError::Validation(_))
        );
        assert!(two_years.ensure_reportable(Some(Granularity::Month)).is_ok());

        let everything = DateRange::parse("0001-01-01", "9999-12-31").unwrap();
        assert_matches!(everything.ensure_reportable(None), Err(CoreError::Validation(_)));
        assert_matches!(
            everything.ensure_reportable(Some(Granularity::Month)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn month_helpers_handle_year_boundaries() {
        assert_eq!(month_start(d(2024, 2, 29)), d(2024, 2, 1));
        assert_eq!(month_end(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(month_end(d(2023, 12, 5)), d(2023, 12, 31));
        assert_eq!(previous_month_start(d(2024, 1, 15)), d(2023, 12, 1));
    }

    // -- Granularity & walking ---------------------------------------------

    #[test]
    fn short_ranges_use_days() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31));
        assert_eq!(Granularity::for_range(&range), Granularity::Day);
        let range = DateRange::new(d(2024, 1, 1), d(2024, 2, 1));
        assert_eq!(Granularity::for_range(&range), Granularity::Month);
    }

    #[test]
    fn daily_walk_is_inclusive() {
        let range = DateRange::new(d(2024, 2, 27), d(2024, 3, 2));
        let starts = bucket_starts(&range, Granularity::Day);
        assert_eq!(
            starts,
            vec![
                d(2024, 2, 27),
                d(2024, 2, 28),
                d(2024, 2, 29),
                d(2024, 3, 1),
                d(2024, 3, 2)
            ]
        );
    }

    #[test]
    fn monthly_walk_covers_partial_months() {
        let range = DateRange::new(d(2023, 11, 20), d(2024, 2, 3));
        let starts = bucket_starts(&range, Granularity::Month);
        assert_eq!(
            starts,
            vec![d(2023, 11, 1), d(2023, 12, 1), d(2024, 1, 1), d(2024, 2, 1)]
        );
    }

    #[test]
    fn reversed_range_walks_the_same_buckets() {
        let forward = DateRange::new(d(2024, 1, 1), d(2024, 6, 30));
        let backward = DateRange::new(d(2024, 6, 30), d(2024, 1, 1));
        assert_eq!(
            bucket_starts(&forward, Granularity::Month),
            bucket_starts(&backward, Granularity::Month)
        );
    }

    #[test]
    fn single_day_range_has_one_bucket() {
        let range = DateRange::new(d(2024, 5, 5), d(2024, 5, 5));
        assert_eq!(bucket_starts(&range, Granularity::Day).len(), 1);
        assert_eq!(bucket_starts(&range, Granularity::Month).len(), 1);
    }

    #[test]
    fn labels_match_granularity() {
        assert_eq!(bucket_label(d(2024, 7, 4), Granularity::Day), "2024-07-04");
        assert_eq!(bucket_label(d(2024, 7, 1), Granularity::Month), "2024-07");
    }

    // -- classify_sale ------------------------------------------------------

    #[test]
    fn missing_tx_ref_is_seller_sale() {
        assert_eq!(classify_sale(None, None), SaleChannel::Seller);
        assert_eq!(classify_sale(None, Some("ABC")), SaleChannel::Seller);
        assert_eq!(classify_sale(Some("  "), None), SaleChannel::Seller);
    }

    #[test]
    fn tx_ref_with_code_is_affiliate_sale() {
        assert_eq!(classify_sale(Some("tx-1"), Some("ABC")), SaleChannel::Affiliate);
    }

    #[test]
    fn tx_ref_without_code_is_own_sale() {
        assert_eq!(classify_sale(Some("tx-1"), None), SaleChannel::Own);
        assert_eq!(classify_sale(Some("tx-1"), Some("")), SaleChannel::Own);
    }

    // -- percent_change -----------------------------------------------------

    #[test]
    fn percent_change_from_zero() {
        assert_eq!(percent_change(0, 0), 0.0);
        assert_eq!(percent_change(0, 500), 100.0);
    }

    #[test]
    fn percent_change_growth_and_decline() {
        assert_eq!(percent_change(200, 300), 50.0);
        assert_eq!(percent_change(300, 200), -33.33);
        assert_eq!(percent_change(300, 0), -100.0);
    }

    // -- Overview -----------------------------------------------------------

    #[test]
    fn overview_zero_fills_and_splits_channels() {
        let range = DateRange::new(d(2024, 3, 3), d(2024, 3, 1));
        let facts = vec![
            fact(1, d(2024, 3, 1), 1_000, None, None),
            fact(2, d(2024, 3, 1), 2_000, Some("tx-2"), Some("AFF")),
            fact(3, d(2024, 3, 3), 4_000, Some("tx-3"), None),
            // Outside the range.
            fact(4, d(2024, 2, 28), 8_000, Some("tx-4"), None),
        ];
        let overview = build_overview(&facts, &range, None, d(2024, 3, 15));

        assert_eq!(overview.granularity, Granularity::Day);
        assert_eq!(overview.buckets.len(), 3);
        let first = &overview.buckets[0];
        assert_eq!(first.label, "2024-03-01");
        assert_eq!(first.totals.seller, 1_000);
        assert_eq!(first.totals.affiliate, 2_000);
        assert_eq!(first.totals.count, 2);
        assert_eq!(overview.buckets[1].totals, ChannelTotals::default());
        assert_eq!(overview.buckets[2].totals.own, 4_000);

        assert_eq!(overview.totals.total, 7_000);
        let bucket_sum: MinorUnits = overview.buckets.iter().map(|b| b.totals.total).sum();
        assert_eq!(bucket_sum, overview.totals.total);
    }

    #[test]
    fn overview_monthly_buckets_group_by_month() {
        let range = DateRange::new(d(2024, 1, 15), d(2024, 3, 15));
        let facts = vec![
            fact(1, d(2024, 1, 20), 100, Some("a"), None),
            fact(2, d(2024, 1, 31), 100, Some("b"), None),
            fact(3, d(2024, 3, 1), 50, None, None),
            // Same month as the first bucket but before the range start.
            fact(4, d(2024, 1, 2), 999, Some("c"), None),
        ];
        let overview = build_overview(&facts, &range, None, d(2024, 3, 15));
        assert_eq!(overview.granularity, Granularity::Month);
        let labels: Vec<&str> = overview.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(overview.buckets[0].totals.total, 200);
        assert_eq!(overview.buckets[1].totals.total, 0);
        assert_eq!(overview.buckets[2].totals.seller, 50);
    }

    #[test]
    fn explicit_granularity_overrides_default() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 10));
        let overview = build_overview(&[], &range, Some(Granularity::Month), d(2024, 1, 10));
        assert_eq!(overview.buckets.len(), 1);
        assert_eq!(overview.buckets[0].label, "2024-01");
    }

    #[test]
    fn month_over_month_wraps_january() {
        let facts = vec![
            fact(1, d(2023, 12, 10), 1_000, Some("a"), None),
            fact(2, d(2024, 1, 5), 1_500, Some("b"), None),
            fact(3, d(2024, 1, 6), 500, None, None),
            fact(4, d(2023, 11, 30), 10_000, Some("c"), None),
        ];
        let mom = month_over_month(&facts, d(2024, 1, 20));
        assert_eq!(mom.previous, 1_000);
        assert_eq!(mom.current, 2_000);
        assert_eq!(mom.percent_change, 100.0);
        assert_eq!(mom.current_count, 2);
        assert_eq!(mom.previous_count, 1);
    }

    #[test]
    fn facts_window_covers_comparison_months() {
        let range = DateRange::new(d(2024, 5, 1), d(2024, 5, 7));
        let window = facts_window(&range, d(2024, 5, 20));
        assert_eq!(window.start, d(2024, 4, 1));
        assert_eq!(window.end, d(2024, 5, 31));
    }

    // -- Resellers & courses ------------------------------------------------

    #[test]
    fn resellers_group_by_seller_and_code() {
        let rates = Rates {
            seller_bps: 1_000,
            affiliate_bps: 500,
            instructor_bps: 5_000,
        };
        let range = DateRange::new(d(2024, 4, 1), d(2024, 4, 30));
        let facts = vec![
            fact(1, d(2024, 4, 2), 10_000, None, None),
            fact(2, d(2024, 4, 3), 10_000, None, None),
            fact(3, d(2024, 4, 4), 4_000, Some("t3"), Some("abc")),
            fact(4, d(2024, 4, 5), 4_000, Some("t4"), Some(" ABC ")),
            fact(5, d(2024, 4, 6), 9_000, Some("t5"), None),
        ];
        let rows = summarize_resellers(&facts, &range, &rates, d(2024, 4, 30));
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].key, ResellerKey::Seller { seller_id: 7 });
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].gross, 20_000);
        assert_eq!(rows[0].commission, 2_000);

        assert_eq!(
            rows[1].key,
            ResellerKey::Affiliate {
                code: "ABC".to_string()
            }
        );
        assert_eq!(rows[1].gross, 8_000);
        assert_eq!(rows[1].commission, 400);
        assert_eq!(rows[1].percent_change, 100.0);
    }

    #[test]
    fn courses_are_sorted_by_total() {
        let rates = Rates {
            seller_bps: 1_000,
            affiliate_bps: 0,
            instructor_bps: 5_000,
        };
        let range = DateRange::new(d(2024, 4, 1), d(2024, 4, 30));
        let mut big = fact(1, d(2024, 4, 2), 10_000, None, None);
        big.course_id = 2;
        let small = fact(2, d(2024, 4, 2), 1_000, Some("t"), None);
        let rows = summarize_courses(&[small, big], &range, &rates);
        assert_eq!(rows[0].course_id, 2);
        assert_eq!(rows[0].instructor_share, 5_000);
        assert_eq!(rows[0].reseller_commission, 1_000);
        assert_eq!(rows[1].course_id, 1);
        assert_eq!(rows[1].totals.own, 1_000);
        assert_eq!(rows[1].reseller_commission, 0);
    }
}
