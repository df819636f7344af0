use chrono::Utc;
use tracing::info;

use crate::aggregators::aggregate::{
    monthly_totals, top_municipalities, weekday_ratio_by_year, yearly_totals, yoy_weekday_diff,
};
use crate::aggregators::placement::{geo_view, label_cloud};
use crate::aggregators::types::{DashboardReport, RatioScale};
use crate::config::DashboardConfig;
use crate::dataset::Dataset;

/// Computes every dashboard table from `dataset`.
#[tracing::instrument(skip_all, fields(records = dataset.records().len()))]
pub fn build_report(dataset: &Dataset, config: &DashboardConfig) -> DashboardReport {
    let cloud_top = top_municipalities(dataset, config.label_cloud.top_k);
    let geo_top = top_municipalities(dataset, config.geo.top_k);

    let report = DashboardReport {
        generated_at: Utc::now(),
        source: dataset.source().display().to_string(),
        encoding: dataset.encoding().to_string(),
        normalize: dataset.report(),
        weekday_ratio: weekday_ratio_by_year(dataset, RatioScale::Percent),
        monthly: monthly_totals(dataset),
        yearly: yearly_totals(dataset),
        label_cloud: label_cloud(&cloud_top, config.label_cloud.seed),
        geo: geo_view(&geo_top, &config.geo),
        yoy_weekday: yoy_weekday_diff(dataset),
    };

    info!(
        weekday_rows = report.weekday_ratio.len(),
        years = report.yearly.len(),
        cloud = report.label_cloud.len(),
        sites = report.geo.sites.len(),
        yoy = report.yoy_weekday.is_some(),
        "Report built"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DisposalRecord;

    fn dataset() -> Dataset {
        let mut records = Vec::new();
        for (i, name) in ["수원시", "성남시", "용인시", "고양시"].iter().enumerate() {
            let day = 1 + i as u32;
            let grams = 1000.0 * (i + 1) as f64;
            records.push(DisposalRecord::new(*name, 2023, 5, day, grams).unwrap());
            records.push(DisposalRecord::new(*name, 2024, 6, day, 500.0).unwrap());
        }
        Dataset::from_records(records)
    }

    #[test]
    fn test_report_respects_top_k() {
        let mut config = DashboardConfig::default();
        config.label_cloud.top_k = 3;
        config.geo.top_k = 2;

        let report = build_report(&dataset(), &config);
        assert_eq!(report.label_cloud.len(), 3);
        assert_eq!(report.geo.sites.len(), 2);
        assert_eq!(report.monthly.len(), 12);
        assert_eq!(report.yearly.len(), 2);
        assert_eq!(report.normalize.rows_kept, 8);
        assert_eq!(report.geo.recommended.as_ref().unwrap().municipality, "고양시");
    }

    #[test]
    fn test_report_yoy_pair() {
        let report = build_report(&dataset(), &DashboardConfig::default());
        let yoy = report.yoy_weekday.unwrap();
        assert_eq!((yoy.from_year, yoy.to_year), (2023, 2024));
    }

    #[test]
    fn test_report_serializes_weekday_labels() {
        let report = build_report(&dataset(), &DashboardConfig::default());
        let json = serde_json::to_value(&report).unwrap();
        let first = &json["weekday_ratio"][0];
        assert_eq!(first["year"], 2023);
        // 2023-05-01 is a Monday
        assert_eq!(first["weekday"], "월");
    }

    #[test]
    fn test_empty_dataset_report() {
        let report = build_report(&Dataset::from_records(vec![]), &DashboardConfig::default());
        assert!(report.weekday_ratio.is_empty());
        assert_eq!(report.monthly.len(), 12);
        assert!(report.label_cloud.is_empty());
        assert!(report.geo.recommended.is_none());
        assert!(report.yoy_weekday.is_none());
    }
}
