use std::collections::BTreeSet;

use serde::Serialize;

use crate::TimestampValueMap;

/// A timestamp at which two aggregates disagree.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Divergence {
    pub timestamp: i64,
    pub left: f64,
    pub right: f64,
}

/// Finds the earliest timestamp at which the two maps disagree.
///
/// Every timestamp present in either map is compared, in ascending order.
/// A timestamp missing from one side reads as zero there, so it only counts
/// as a divergence when the other side is non-zero. The outcome does not
/// depend on argument order beyond which side is reported as `left`.
pub fn find_divergence(
    left: &TimestampValueMap,
    right: &TimestampValueMap,
) -> Option<Divergence> {
    let timestamps: BTreeSet<i64> = left.timestamps().chain(right.timestamps()).collect();

    timestamps.into_iter().find_map(|timestamp| {
        let (l, r) = (left.get(timestamp), right.get(timestamp));
        (l != r).then_some(Divergence {
            timestamp,
            left: l,
            right: r,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(i64, f64)]) -> TimestampValueMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn differing_value() {
        let a = map(&[(100, 5.0), (200, 5.0)]);
        let b = map(&[(100, 5.0), (200, 7.0)]);

        assert_eq!(
            find_divergence(&a, &b),
            Some(Divergence {
                timestamp: 200,
                left: 5.0,
                right: 7.0,
            })
        );
    }

    #[test]
    fn identical_maps() {
        let a = map(&[(100, 5.0)]);
        let b = map(&[(100, 5.0)]);
        assert_eq!(find_divergence(&a, &b), None);
    }

    #[test]
    fn absent_reads_as_zero() {
        let zero = map(&[(100, 0.0)]);
        let three = map(&[(100, 3.0)]);
        let empty = TimestampValueMap::new();

        assert_eq!(find_divergence(&zero, &empty), None);
        assert_eq!(find_divergence(&empty, &zero), None);
        assert_eq!(
            find_divergence(&three, &empty),
            Some(Divergence {
                timestamp: 100,
                left: 3.0,
                right: 0.0,
            })
        );
        assert_eq!(find_divergence(&empty, &empty), None);
    }

    #[test]
    fn reports_earliest_divergence() {
        let a = map(&[(100, 1.0), (200, 2.0), (300, 3.0), (400, 4.0)]);
        let b = map(&[(100, 1.0), (200, 2.5), (300, 3.0), (400, 0.0)]);

        assert_eq!(find_divergence(&a, &b).map(|d| d.timestamp), Some(200));
    }

    #[test]
    fn symmetric() {
        let cases = [
            (map(&[(100, 5.0), (200, 5.0)]), map(&[(100, 5.0), (200, 7.0)])),
            (map(&[(100, 5.0)]), map(&[(100, 5.0)])),
            (map(&[(100, 3.0)]), TimestampValueMap::new()),
            (map(&[(100, 1.0), (200, 1.0), (300, 1.0)]), map(&[(400, 2.0)])),
            (map(&[(100, 1.0), (200, 0.0)]), map(&[(100, 1.0), (300, 0.0)])),
        ];

        for (a, b) in &cases {
            let forward = find_divergence(a, b);
            let backward = find_divergence(b, a);

            assert_eq!(forward.is_some(), backward.is_some());
            if let (Some(f), Some(r)) = (forward, backward) {
                assert_eq!(f.timestamp, r.timestamp);
                assert_eq!((f.left, f.right), (r.right, r.left));
            }
        }
    }

    #[test]
    fn smaller_map_can_hold_the_divergence() {
        let larger = map(&[(100, 1.0), (200, 1.0), (300, 1.0)]);
        let smaller = map(&[(100, 1.0), (400, 2.0)]);

        let found = find_divergence(&larger, &smaller).unwrap();
        assert_eq!(found.timestamp, 200);
        assert_eq!((found.left, found.right), (1.0, 0.0));
    }
}
