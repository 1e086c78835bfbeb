//! Stop storage abstraction
//!
//! The planner loads a snapshot through this trait, runs the pure
//! algorithms and writes orders back. PostgreSQL in production, an
//! in-memory map in tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::types::{Coordinates, OrderAssignment, Route, Stop};

#[async_trait]
pub trait StopStore: Send + Sync {
    async fn get_route(&self, route_id: Uuid) -> Result<Option<Route>>;

    async fn routes_on_date(&self, date: NaiveDate) -> Result<Vec<Route>>;

    async fn route_stops(&self, route_id: Uuid) -> Result<Vec<Stop>>;

    async fn stops_on_date(&self, date: NaiveDate) -> Result<Vec<Stop>>;

    async fn get_stop(&self, stop_id: Uuid) -> Result<Option<Stop>>;

    /// Write sequencer orders for members of `route_id` in one transaction.
    /// Fails without writing anything if a stop is no longer a member.
    async fn save_orders(&self, route_id: Uuid, assignments: &[OrderAssignment]) -> Result<()>;

    /// Mark the route optimized at `at`, but only while every geocoded member
    /// has an order. Returns false when the route was left unmarked.
    async fn mark_route_optimized(&self, route_id: Uuid, at: DateTime<Utc>) -> Result<bool>;

    async fn clear_route_optimized(&self, route_id: Uuid) -> Result<()>;

    /// Change route membership and clear the stop's order
    async fn assign_stop(&self, stop_id: Uuid, route_id: Option<Uuid>) -> Result<Option<Stop>>;

    async fn move_stop(&self, stop_id: Uuid, coordinates: Coordinates) -> Result<Option<Stop>>;
}

#[cfg(test)]
pub use memory::MemoryStopStore;
