//! Synthetic placement for the label cloud and the map view.
//!
//! The source data carries no coordinates, so every municipality gets a
//! reproducible pseudo-random position derived from a seed and its rank.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::aggregators::types::{GeoSite, GeoView, LabelCloudEntry, MunicipalityTotal};
use crate::config::GeoConfig;

pub const MIN_FONT_SIZE: f64 = 10.0;
pub const FONT_SIZE_RANGE: f64 = 60.0;

/// Unit-square position of the entry at `rank` under `seed`.
///
/// Both coordinates are in `[0, 1)`. Distinct `(seed, rank)` pairs seed
/// distinct generators.
pub fn position(seed: u64, rank: usize) -> (f64, f64) {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    bytes[8..16].copy_from_slice(&(rank as u64).to_le_bytes());

    let mut rng = StdRng::from_seed(bytes);
    (rng.random::<f64>(), rng.random::<f64>())
}

/// Index of the first entry holding the largest total.
fn first_max(top: &[MunicipalityTotal]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, entry) in top.iter().enumerate() {
        match best {
            Some(b) if top[b].tons >= entry.tons => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Lays out `top` as a word cloud: font size scales with tons and every
/// entry equal to the maximum is highlighted.
pub fn label_cloud(top: &[MunicipalityTotal], seed: u64) -> Vec<LabelCloudEntry> {
    let max = top.iter().map(|t| t.tons).fold(f64::NEG_INFINITY, f64::max);

    top.iter()
        .enumerate()
        .map(|(rank, total)| {
            let (x, y) = position(seed, rank);
            let font_size = if max > 0.0 {
                MIN_FONT_SIZE + total.tons / max * FONT_SIZE_RANGE
            } else {
                MIN_FONT_SIZE
            };
            LabelCloudEntry {
                rank,
                municipality: total.municipality.clone(),
                tons: total.tons,
                x,
                y,
                font_size,
                highlighted: total.tons == max,
            }
        })
        .collect()
}

/// Places `top` inside the configured coordinate box and flags the single
/// largest site as the recommended installation point.
pub fn geo_view(top: &[MunicipalityTotal], config: &GeoConfig) -> GeoView {
    let recommended_rank = first_max(top);

    let sites: Vec<GeoSite> = top
        .iter()
        .enumerate()
        .map(|(rank, total)| {
            let (u, v) = position(config.seed, rank);
            GeoSite {
                rank,
                municipality: total.municipality.clone(),
                tons: total.tons,
                lat: config.lat_origin + u * config.span,
                lon: config.lon_origin + v * config.span,
                recommended: Some(rank) == recommended_rank,
            }
        })
        .collect();

    let recommended = recommended_rank.map(|rank| sites[rank].clone());
    GeoView { sites, recommended }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(values: &[(&str, f64)]) -> Vec<MunicipalityTotal> {
        values
            .iter()
            .map(|(name, tons)| MunicipalityTotal {
                municipality: name.to_string(),
                tons: *tons,
            })
            .collect()
    }

    #[test]
    fn test_position_is_reproducible_and_in_unit_square() {
        for rank in 0..50 {
            let (x, y) = position(42, rank);
            assert_eq!((x, y), position(42, rank));
            assert!((0.0..1.0).contains(&x));
            assert!((0.0..1.0).contains(&y));
        }
    }

    #[test]
    fn test_position_depends_on_seed_and_rank() {
        assert_ne!(position(42, 0), position(42, 1));
        assert_ne!(position(42, 0), position(0, 0));
    }

    #[test]
    fn test_label_cloud_weights() {
        let top = totals(&[("수원시", 200.0), ("성남시", 100.0), ("용인시", 0.0)]);
        let cloud = label_cloud(&top, 42);
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud[0].font_size, 70.0);
        assert_eq!(cloud[1].font_size, 40.0);
        assert_eq!(cloud[2].font_size, 10.0);
        assert!(cloud[0].highlighted);
        assert!(!cloud[1].highlighted);
        assert_eq!(cloud[1].rank, 1);
    }

    #[test]
    fn test_label_cloud_all_zero() {
        let cloud = label_cloud(&totals(&[("a", 0.0), ("b", 0.0)]), 42);
        assert!(cloud.iter().all(|e| e.font_size == MIN_FONT_SIZE));
    }

    #[test]
    fn test_geo_view_recommends_single_maximum() {
        let config = GeoConfig::default();
        let top = totals(&[("수원시", 5.0), ("성남시", 5.0), ("용인시", 1.0)]);
        let view = geo_view(&top, &config);

        assert_eq!(view.sites.iter().filter(|s| s.recommended).count(), 1);
        assert!(view.sites[0].recommended);
        let recommended = view.recommended.unwrap();
        assert_eq!(recommended.municipality, "수원시");
        assert_eq!(recommended, view.sites[0]);

        for site in &view.sites {
            assert!(site.lat >= 37.2 && site.lat <= 37.7);
            assert!(site.lon >= 127.0 && site.lon <= 127.5);
        }
    }

    #[test]
    fn test_geo_view_is_deterministic() {
        let top = totals(&[("a", 3.0), ("b", 2.0)]);
        let config = GeoConfig::default();
        assert_eq!(geo_view(&top, &config), geo_view(&top, &config));
    }

    #[test]
    fn test_geo_view_empty() {
        let view = geo_view(&[], &GeoConfig::default());
        assert!(view.sites.is_empty());
        assert!(view.recommended.is_none());
    }
}
