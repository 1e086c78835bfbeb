//! Stop types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Coordinates (latitude, longitude) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Finite and inside the WGS84 degree ranges
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A single scheduled visit to one location on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: Uuid,
    /// None while the stop is not assigned to any route
    pub route_id: Option<Uuid>,
    pub technician_id: Uuid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: NaiveDate,
    /// 1-based visiting position, None until sequenced
    #[sqlx(rename = "stop_order")]
    #[serde(default)]
    pub order: Option<i32>,
}

impl Stop {
    /// Coordinates usable for sequencing and proximity search.
    ///
    /// A stop is geocoded only when both values are present and finite;
    /// anything else is treated as missing.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => {
                let coords = Coordinates::new(lat, lng);
                coords.is_finite().then_some(coords)
            }
            _ => None,
        }
    }

    pub fn is_geocoded(&self) -> bool {
        self.coordinates().is_some()
    }

    pub fn belongs_to(&self, route_id: Uuid) -> bool {
        self.route_id == Some(route_id)
    }
}
