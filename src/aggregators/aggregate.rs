use std::collections::BTreeMap;

use chrono::Weekday;
use itertools::Itertools;

use crate::aggregators::types::{
    MonthlyTotalRow, MunicipalityTotal, RatioScale, WeekdayRatioDiff, WeekdayRatioRow,
    YearlyTotalRow, YoyWeekdayDiff,
};
use crate::aggregators::utility::{share, sum_by};
use crate::dataset::Dataset;

/// Monday-first, indexed by `Weekday::num_days_from_monday`.
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Sums tons per (year, weekday) and expresses each sum as a share of its
/// year's total.
///
/// Rows are ordered by year, then Monday-first. A weekday with no records
/// in a year has no row.
pub fn weekday_ratio_by_year(dataset: &Dataset, scale: RatioScale) -> Vec<WeekdayRatioRow> {
    let sums = sum_by(
        dataset.records(),
        |r| (r.year, r.weekday.num_days_from_monday()),
        |r| r.tons,
    );
    let year_totals = sum_by(dataset.records(), |r| r.year, |r| r.tons);

    sums.into_iter()
        .map(|((year, day), tons)| {
            let total = year_totals.get(&year).copied().unwrap_or_default();
            WeekdayRatioRow {
                year,
                weekday: WEEKDAYS[day as usize],
                tons,
                ratio: share(tons, total, scale),
            }
        })
        .collect()
}

/// Tons per calendar month, always twelve rows with zero for empty months.
pub fn monthly_totals(dataset: &Dataset) -> Vec<MonthlyTotalRow> {
    let mut tons = [0.0_f64; 12];
    for record in dataset.records() {
        // month is 1..=12 for every record holding a valid date
        tons[(record.month - 1) as usize] += record.tons;
    }

    (1..=12)
        .zip(tons)
        .map(|(month, tons)| MonthlyTotalRow { month, tons })
        .collect()
}

/// Tons per year present in the data, ascending.
pub fn yearly_totals(dataset: &Dataset) -> Vec<YearlyTotalRow> {
    sum_by(dataset.records(), |r| r.year, |r| r.tons)
        .into_iter()
        .map(|(year, tons)| YearlyTotalRow { year, tons })
        .collect()
}

/// Tons per municipality, largest first; equal totals sort by name.
pub fn municipality_totals(dataset: &Dataset) -> Vec<MunicipalityTotal> {
    sum_by(dataset.records(), |r| r.municipality.clone(), |r| r.tons)
        .into_iter()
        .map(|(municipality, tons)| MunicipalityTotal { municipality, tons })
        .sorted_by(|a, b| {
            b.tons
                .total_cmp(&a.tons)
                .then_with(|| a.municipality.cmp(&b.municipality))
        })
        .collect()
}

/// The `k` municipalities with the largest totals.
pub fn top_municipalities(dataset: &Dataset, k: usize) -> Vec<MunicipalityTotal> {
    let mut totals = municipality_totals(dataset);
    totals.truncate(k);
    totals
}

/// Successive differences of each weekday's yearly share (as a fraction).
///
/// Years are paired in the order they occur in the data, so a gap year is
/// skipped rather than treated as zero. A weekday missing from either year
/// of a pair gets no row for that pair.
pub fn weekday_ratio_diffs(dataset: &Dataset) -> Vec<WeekdayRatioDiff> {
    let ratios: BTreeMap<(u32, i32), f64> = weekday_ratio_by_year(dataset, RatioScale::Fraction)
        .into_iter()
        .map(|row| ((row.weekday.num_days_from_monday(), row.year), row.ratio))
        .collect();

    let years = dataset.years();
    let mut diffs = Vec::new();
    for day in 0..7u32 {
        for (&from_year, &to_year) in years.iter().tuple_windows() {
            let (Some(&from_ratio), Some(&to_ratio)) = (
                ratios.get(&(day, from_year)),
                ratios.get(&(day, to_year)),
            ) else {
                continue;
            };
            diffs.push(WeekdayRatioDiff {
                weekday: WEEKDAYS[day as usize],
                from_year,
                to_year,
                from_ratio,
                to_ratio,
                diff: to_ratio - from_ratio,
            });
        }
    }
    diffs
}

/// Weekday share differences between the two most recent years.
///
/// Returns `None` when the data covers fewer than two years.
pub fn yoy_weekday_diff(dataset: &Dataset) -> Option<YoyWeekdayDiff> {
    let years = dataset.years();
    let &[.., from_year, to_year] = years.as_slice() else {
        return None;
    };

    let rows = weekday_ratio_diffs(dataset)
        .into_iter()
        .filter(|row| row.to_year == to_year)
        .collect();

    Some(YoyWeekdayDiff {
        from_year,
        to_year,
        rows,
    })
}

/// The weekday with the largest share in each year.
pub fn busiest_weekday_per_year(rows: &[WeekdayRatioRow]) -> Vec<(i32, Weekday, f64)> {
    rows.iter()
        .chunk_by(|row| row.year)
        .into_iter()
        .filter_map(|(year, group)| {
            group
                .fold(None, |best: Option<&WeekdayRatioRow>, row| match best {
                    Some(b) if b.ratio >= row.ratio => Some(b),
                    _ => Some(row),
                })
                .map(|row| (year, row.weekday, row.ratio))
        })
        .collect()
}
