//! Route types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Coordinates, Stop};

/// Route entity (one technician, one day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub date: NaiveDate,
    pub optimized: bool,
    pub optimized_at: Option<DateTime<Utc>>,
}

/// How existing orders are treated when a route is sequenced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceMode {
    /// Keep already ordered stops, append the unordered ones greedily
    #[default]
    Extend,
    /// Discard existing orders and sequence the whole route again
    Rebuild,
}

impl SequenceMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            SequenceMode::Extend => "extend",
            SequenceMode::Rebuild => "rebuild",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStatus {
    Sequenced,
    /// No geocoded stop and no anchor: the route must not be marked optimized
    NothingToSequence,
}

/// An order written to a stop by the sequencer. `None` clears a stale order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAssignment {
    pub stop_id: Uuid,
    pub order: Option<i32>,
}

/// Result of sequencing one route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSequence {
    pub route_id: Uuid,
    pub status: SequenceStatus,
    /// Geocoded stops in visiting order (position i has order i + 1)
    pub ordered_stop_ids: Vec<Uuid>,
    /// Member stops lacking coordinates, never ordered
    pub unsequenceable: Vec<Uuid>,
    /// Orders that differ from what the stops carried before the run
    pub assignments: Vec<OrderAssignment>,
}

impl RouteSequence {
    pub fn is_sequenced(&self) -> bool {
        self.status == SequenceStatus::Sequenced
    }
}

/// One proximity search hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyStop {
    pub stop_id: Uuid,
    pub distance: f64,
}

/// Request to sequence a caller-supplied stop snapshot (no persistence)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRouteRequest {
    pub route_id: Uuid,
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub anchor: Option<Coordinates>,
    #[serde(default)]
    pub mode: SequenceMode,
}

/// Request to sequence a stored route and persist the orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteRequest {
    pub route_id: Uuid,
    #[serde(default)]
    pub anchor: Option<Coordinates>,
    #[serde(default)]
    pub mode: SequenceMode,
}

/// Request to sequence every stored route of a date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeDayRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub mode: SequenceMode,
}

/// Outcome of a per-date optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOptimizationSummary {
    pub date: NaiveDate,
    pub optimized: Vec<Uuid>,
    pub nothing_to_sequence: Vec<Uuid>,
    /// Route id and error code for routes that failed
    pub failed: Vec<(Uuid, String)>,
}

/// Proximity search around an explicit coordinate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindNearbyRequest {
    pub reference: Coordinates,
    pub date: NaiveDate,
    #[serde(default)]
    pub exclude_stop_id: Option<Uuid>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Proximity search around a stored stop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyForStopRequest {
    pub stop_id: Uuid,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Move a stop to another route (or unassign it with `routeId: null`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignStopRequest {
    pub stop_id: Uuid,
    #[serde(default)]
    pub route_id: Option<Uuid>,
}

/// Update a stop's coordinates (map drag)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveStopRequest {
    pub stop_id: Uuid,
    pub coordinates: Coordinates,
}
