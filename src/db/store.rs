//! PostgreSQL-backed stop store

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::queries;
use crate::services::store::StopStore;
use crate::types::{Coordinates, OrderAssignment, Route, Stop};

pub struct PgStopStore {
    pool: PgPool,
}

impl PgStopStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StopStore for PgStopStore {
    async fn get_route(&self, route_id: Uuid) -> Result<Option<Route>> {
        queries::route::get_route(&self.pool, route_id).await
    }

    async fn routes_on_date(&self, date: NaiveDate) -> Result<Vec<Route>> {
        queries::route::list_routes_for_date(&self.pool, date).await
    }

    async fn route_stops(&self, route_id: Uuid) -> Result<Vec<Stop>> {
        queries::stop::list_route_stops(&self.pool, route_id).await
    }

    async fn stops_on_date(&self, date: NaiveDate) -> Result<Vec<Stop>> {
        queries::stop::list_stops_for_date(&self.pool, date).await
    }

    async fn get_stop(&self, stop_id: Uuid) -> Result<Option<Stop>> {
        queries::stop::get_stop(&self.pool, stop_id).await
    }

    async fn save_orders(&self, route_id: Uuid, assignments: &[OrderAssignment]) -> Result<()> {
        queries::stop::update_orders(&self.pool, route_id, assignments).await
    }

    async fn mark_route_optimized(&self, route_id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        queries::route::mark_optimized(&self.pool, route_id, at).await
    }

    async fn clear_route_optimized(&self, route_id: Uuid) -> Result<()> {
        if !queries::route::clear_optimized(&self.pool, route_id).await? {
            warn!("Route {} not found while clearing optimized flag", route_id);
        }
        Ok(())
    }

    async fn assign_stop(&self, stop_id: Uuid, route_id: Option<Uuid>) -> Result<Option<Stop>> {
        queries::stop::assign_route(&self.pool, stop_id, route_id).await
    }

    async fn move_stop(&self, stop_id: Uuid, coordinates: Coordinates) -> Result<Option<Stop>> {
        queries::stop::update_coordinates(&self.pool, stop_id, coordinates).await
    }
}
