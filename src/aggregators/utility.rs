use std::collections::BTreeMap;

use crate::aggregators::types::RatioScale;

/// Share of `part` within `total`. Returns 0.0 when `total` is zero.
pub fn share(part: f64, total: f64, scale: RatioScale) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    let fraction = part / total;
    match scale {
        RatioScale::Fraction => fraction,
        RatioScale::Percent => fraction * 100.0,
    }
}

/// Sums `value` per `key`, in ascending key order.
pub fn sum_by<T, K, FK, FV>(items: &[T], key: FK, value: FV) -> BTreeMap<K, f64>
where
    K: Ord,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> f64,
{
    let mut sums = BTreeMap::new();
    for item in items {
        *sums.entry(key(item)).or_insert(0.0) += value(item);
    }
    sums
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_scales() {
        assert_eq!(share(1.0, 4.0, RatioScale::Fraction), 0.25);
        assert_eq!(share(1.0, 4.0, RatioScale::Percent), 25.0);
    }

    #[test]
    fn test_share_zero_total_is_zero() {
        assert_eq!(share(0.0, 0.0, RatioScale::Percent), 0.0);
        assert_eq!(share(3.0, 0.0, RatioScale::Fraction), 0.0);
    }

    #[test]
    fn test_sum_by_groups_in_key_order() {
        let items = [("b", 1.0), ("a", 2.0), ("b", 3.0)];
        let sums = sum_by(&items, |(k, _)| *k, |(_, v)| *v);
        let pairs: Vec<_> = sums.into_iter().collect();
        assert_eq!(pairs, vec![("a", 2.0), ("b", 4.0)]);
    }
}
