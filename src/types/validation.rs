//! Boundary validation for incoming requests

use thiserror::Error;
use uuid::Uuid;

use super::{Coordinates, Stop};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("limit must be at least 1 (got {0})")]
    LimitTooSmall(i64),

    #[error("limit must not exceed {max} (got {got})")]
    LimitTooLarge { got: i64, max: usize },

    #[error("{field} coordinates are invalid: lat={lat}, lng={lng}")]
    InvalidCoordinates { field: &'static str, lat: f64, lng: f64 },

    #[error("stop {stop_id} does not belong to route {route_id}")]
    ForeignStop { stop_id: Uuid, route_id: Uuid },

    #[error("stop {0} appears more than once")]
    DuplicateStop(Uuid),
}

/// Resolve an optional result limit against the configured default and maximum
pub fn resolve_limit(limit: Option<i64>, default: usize, max: usize) -> Result<usize, ValidationError> {
    match limit {
        None => Ok(default.min(max)),
        Some(l) if l < 1 => Err(ValidationError::LimitTooSmall(l)),
        Some(l) if l as u64 > max as u64 => Err(ValidationError::LimitTooLarge { got: l, max }),
        Some(l) => Ok(l as usize),
    }
}

pub fn check_coordinates(field: &'static str, coords: &Coordinates) -> Result<(), ValidationError> {
    if coords.is_valid() {
        Ok(())
    } else {
        Err(ValidationError::InvalidCoordinates {
            field,
            lat: coords.lat,
            lng: coords.lng,
        })
    }
}

/// A caller-supplied route snapshot must only contain distinct members of the route
pub fn check_route_snapshot(route_id: Uuid, stops: &[Stop]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::with_capacity(stops.len());
    for stop in stops {
        if !stop.belongs_to(route_id) {
            return Err(ValidationError::ForeignStop { stop_id: stop.id, route_id });
        }
        if !seen.insert(stop.id) {
            return Err(ValidationError::DuplicateStop(stop.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn member(route_id: Uuid) -> Stop {
        Stop {
            id: Uuid::new_v4(),
            route_id: Some(route_id),
            technician_id: Uuid::nil(),
            latitude: Some(1.0),
            longitude: Some(1.0),
            date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            order: None,
        }
    }

    #[test]
    fn test_resolve_limit_default() {
        assert_eq!(resolve_limit(None, 5, 50), Ok(5));
        assert_eq!(resolve_limit(None, 5, 3), Ok(3));
    }

    #[test]
    fn test_resolve_limit_bounds() {
        assert_eq!(resolve_limit(Some(0), 5, 50), Err(ValidationError::LimitTooSmall(0)));
        assert_eq!(resolve_limit(Some(-2), 5, 50), Err(ValidationError::LimitTooSmall(-2)));
        assert_eq!(
            resolve_limit(Some(51), 5, 50),
            Err(ValidationError::LimitTooLarge { got: 51, max: 50 })
        );
        assert_eq!(resolve_limit(Some(50), 5, 50), Ok(50));
    }

    #[test]
    fn test_check_coordinates() {
        assert!(check_coordinates("reference", &Coordinates::new(27.9, -82.4)).is_ok());
        let err = check_coordinates("anchor", &Coordinates::new(f64::NAN, 0.0)).unwrap_err();
        assert!(err.to_string().starts_with("anchor coordinates are invalid"));
    }

    #[test]
    fn test_route_snapshot_rejects_foreign_stop() {
        let route_id = Uuid::new_v4();
        let mut other = member(route_id);
        other.route_id = None;
        let stops = vec![member(route_id), other.clone()];

        assert_eq!(
            check_route_snapshot(route_id, &stops),
            Err(ValidationError::ForeignStop { stop_id: other.id, route_id })
        );
    }

    #[test]
    fn test_route_snapshot_rejects_duplicates() {
        let route_id = Uuid::new_v4();
        let s = member(route_id);
        let stops = vec![s.clone(), s.clone()];
        assert_eq!(check_route_snapshot(route_id, &stops), Err(ValidationError::DuplicateStop(s.id)));
    }

    #[test]
    fn test_route_snapshot_accepts_members() {
        let route_id = Uuid::new_v4();
        assert!(check_route_snapshot(route_id, &[member(route_id), member(route_id)]).is_ok());
        assert!(check_route_snapshot(route_id, &[]).is_ok());
    }
}
