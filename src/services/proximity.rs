//! Proximity search over the stops scheduled on one date

use chrono::NaiveDate;
use uuid::Uuid;

use crate::services::geo::planar_distance;
use crate::types::{Coordinates, NearbyStop, Stop};

/// Default number of results for "what else is nearby" lookups
pub const DEFAULT_NEARBY_LIMIT: usize = 5;

/// Return up to `limit` geocoded stops on `date` closest to `reference`.
///
/// The inspected stop is excluded by id only; two stops may legitimately
/// share coordinates. Results are sorted by distance, ties by stop id.
pub fn find_nearby(
    stops: &[Stop],
    reference: &Coordinates,
    date: NaiveDate,
    exclude_stop_id: Option<Uuid>,
    limit: usize,
) -> Vec<NearbyStop> {
    if limit == 0 {
        return vec![];
    }

    let mut hits: Vec<NearbyStop> = stops
        .iter()
        .filter(|s| s.date == date && Some(s.id) != exclude_stop_id)
        .filter_map(|s| {
            s.coordinates().map(|coords| NearbyStop {
                stop_id: s.id,
                distance: planar_distance(reference, &coords),
            })
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.stop_id.cmp(&b.stop_id)));
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn make_stop(n: u128, lat: Option<f64>, lng: Option<f64>, day: u32) -> Stop {
        Stop {
            id: Uuid::from_u128(n),
            route_id: Some(Uuid::from_u128(1000 + n % 3)),
            technician_id: Uuid::from_u128(2000 + n % 3),
            latitude: lat,
            longitude: lng,
            date: date(day),
            order: None,
        }
    }

    fn origin() -> Coordinates {
        Coordinates::new(0.0, 0.0)
    }

    #[test]
    fn test_limit_two_of_four() {
        let stops = vec![
            make_stop(1, Some(4.0), Some(0.0), 1),
            make_stop(2, Some(0.0), Some(2.0), 1),
            make_stop(3, Some(-3.0), Some(0.0), 1),
            make_stop(4, Some(0.0), Some(-1.0), 1),
        ];

        let result = find_nearby(&stops, &origin(), date(1), None, 2);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].stop_id, Uuid::from_u128(4));
        assert_eq!(result[0].distance, 1.0);
        assert_eq!(result[1].stop_id, Uuid::from_u128(2));
        assert_eq!(result[1].distance, 2.0);
    }

    #[test]
    fn test_filters_date_and_missing_coordinates() {
        let stops = vec![
            make_stop(1, Some(1.0), Some(0.0), 2),
            make_stop(2, None, Some(0.0), 1),
            make_stop(3, Some(f64::NAN), Some(0.0), 1),
            make_stop(4, Some(5.0), Some(5.0), 1),
        ];

        let result = find_nearby(&stops, &origin(), date(1), None, DEFAULT_NEARBY_LIMIT);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].stop_id, Uuid::from_u128(4));
    }

    #[test]
    fn test_excludes_by_id_not_by_coordinates() {
        // Duplex: two stops at the same address
        let stops = vec![
            make_stop(1, Some(1.0), Some(1.0), 1),
            make_stop(2, Some(1.0), Some(1.0), 1),
        ];
        let reference = Coordinates::new(1.0, 1.0);

        let result = find_nearby(&stops, &reference, date(1), Some(Uuid::from_u128(1)), 5);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].stop_id, Uuid::from_u128(2));
        assert_eq!(result[0].distance, 0.0);
    }

    #[test]
    fn test_no_excluded_stop_is_closer_than_last_result() {
        let stops: Vec<Stop> = (1..=20)
            .map(|n| make_stop(n, Some((n as f64 * 7.3) % 11.0), Some((n as f64 * 3.1) % 5.0), 1))
            .collect();
        let reference = Coordinates::new(4.0, 2.0);
        let excluded = Uuid::from_u128(5);

        let result = find_nearby(&stops, &reference, date(1), Some(excluded), 6);
        let kth = result.last().unwrap().distance;

        for stop in &stops {
            if stop.id == excluded || result.iter().any(|r| r.stop_id == stop.id) {
                continue;
            }
            let d = planar_distance(&reference, &stop.coordinates().unwrap());
            assert!(d >= kth, "stop {} at {} beats k-th distance {}", stop.id, d, kth);
        }
        assert!(result.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_ties_ordered_by_id() {
        let stops = vec![
            make_stop(7, Some(0.0), Some(1.0), 1),
            make_stop(3, Some(1.0), Some(0.0), 1),
            make_stop(5, Some(-1.0), Some(0.0), 1),
        ];

        let ids: Vec<u128> = find_nearby(&stops, &origin(), date(1), None, 3)
            .iter()
            .map(|r| r.stop_id.as_u128())
            .collect();

        assert_eq!(ids, vec![3, 5, 7]);
    }

    #[test]
    fn test_empty_date_returns_empty() {
        let stops = vec![make_stop(1, Some(1.0), Some(1.0), 3)];
        assert!(find_nearby(&stops, &origin(), date(1), None, 5).is_empty());
        assert!(find_nearby(&[], &origin(), date(1), None, 5).is_empty());
    }

    #[test]
    fn test_zero_limit_returns_empty() {
        let stops = vec![make_stop(1, Some(1.0), Some(1.0), 1)];
        assert!(find_nearby(&stops, &origin(), date(1), None, 0).is_empty());
    }
}
