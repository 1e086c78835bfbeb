//! Route planner
//!
//! Loads stop snapshots from a [`StopStore`], runs the sequencer and the
//! proximity finder, and writes results back.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::proximity::{find_nearby, DEFAULT_NEARBY_LIMIT};
use crate::services::route_lock::{RouteLockGuard, RouteLockRegistry};
use crate::services::sequencer::{is_fully_sequenced, sequence_route};
use crate::services::store::StopStore;
use crate::types::validation::{check_coordinates, check_route_snapshot, resolve_limit};
use crate::types::{
    Coordinates, DayOptimizationSummary, FindNearbyRequest, NearbyStop, RouteSequence,
    SequenceMode, SequenceRouteRequest, Stop, ValidationError,
};

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("route {0} not found")]
    RouteNotFound(Uuid),

    #[error("stop {0} not found")]
    StopNotFound(Uuid),

    #[error("route {0} is busy")]
    RouteBusy(Uuid),

    #[error("route {0} changed while it was being sequenced")]
    RouteChanged(Uuid),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl PlannerError {
    /// Wire error code
    pub const fn code(&self) -> &'static str {
        match self {
            PlannerError::Validation(_) => "VALIDATION_ERROR",
            PlannerError::RouteNotFound(_) | PlannerError::StopNotFound(_) => "NOT_FOUND",
            PlannerError::RouteBusy(_) | PlannerError::RouteChanged(_) => "ROUTE_BUSY",
            PlannerError::Store(_) => "DATABASE_ERROR",
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Limits applied to proximity queries
#[derive(Debug, Clone, Copy)]
pub struct PlannerSettings {
    pub nearby_default_limit: usize,
    pub nearby_max_limit: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            nearby_default_limit: DEFAULT_NEARBY_LIMIT,
            nearby_max_limit: 50,
        }
    }
}

#[derive(Clone)]
pub struct RoutePlanner {
    store: Arc<dyn StopStore>,
    locks: RouteLockRegistry,
    settings: PlannerSettings,
}

impl RoutePlanner {
    pub fn new(store: Arc<dyn StopStore>, settings: PlannerSettings) -> Self {
        Self {
            store,
            locks: RouteLockRegistry::default(),
            settings,
        }
    }

    /// Sequence a caller-supplied snapshot without touching the store
    pub fn sequence_snapshot(&self, request: SequenceRouteRequest) -> PlannerResult<RouteSequence> {
        if let Some(anchor) = &request.anchor {
            check_coordinates("anchor", anchor)?;
        }
        check_route_snapshot(request.route_id, &request.stops)?;

        let mut stops = request.stops;
        Ok(sequence_route(request.route_id, &mut stops, request.anchor, request.mode))
    }

    /// Sequence a stored route, persist changed orders and mark it optimized
    pub async fn optimize_route(
        &self,
        route_id: Uuid,
        anchor: Option<Coordinates>,
        mode: SequenceMode,
    ) -> PlannerResult<RouteSequence> {
        if let Some(anchor) = &anchor {
            check_coordinates("anchor", anchor)?;
        }

        let _guard = self.lock(route_id)?;

        if self.store.get_route(route_id).await?.is_none() {
            return Err(PlannerError::RouteNotFound(route_id));
        }

        let mut stops = self.store.route_stops(route_id).await?;
        debug!("Loaded {} stops for route {}", stops.len(), route_id);

        let sequence = sequence_route(route_id, &mut stops, anchor, mode);

        if !sequence.is_sequenced() {
            warn!(
                "Route {} has nothing to sequence ({} stops without coordinates), not marking optimized",
                route_id,
                sequence.unsequenceable.len()
            );
            return Ok(sequence);
        }

        debug_assert!(is_fully_sequenced(route_id, &stops));

        if !sequence.assignments.is_empty() {
            self.store.save_orders(route_id, &sequence.assignments).await?;
        }
        if !self.store.mark_route_optimized(route_id, Utc::now()).await? {
            warn!("Route {} gained an unordered stop during sequencing, not marking optimized", route_id);
            return Err(PlannerError::RouteChanged(route_id));
        }

        info!(
            "Route {} optimized: {} stops, {} orders written, {} unsequenceable",
            route_id,
            sequence.ordered_stop_ids.len(),
            sequence.assignments.len(),
            sequence.unsequenceable.len()
        );

        Ok(sequence)
    }

    /// Optimize every route of `date`, one task per route
    pub async fn optimize_day(&self, date: NaiveDate, mode: SequenceMode) -> PlannerResult<DayOptimizationSummary> {
        let routes = self.store.routes_on_date(date).await?;
        info!("Optimizing {} routes for {}", routes.len(), date);

        let handles: Vec<_> = routes
            .iter()
            .map(|route| {
                let planner = self.clone();
                let route_id = route.id;
                tokio::spawn(async move { planner.optimize_route(route_id, None, mode).await })
            })
            .collect();

        let mut summary = DayOptimizationSummary {
            date,
            optimized: Vec::new(),
            nothing_to_sequence: Vec::new(),
            failed: Vec::new(),
        };

        for (route, joined) in routes.iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(sequence)) if sequence.is_sequenced() => summary.optimized.push(route.id),
                Ok(Ok(_)) => summary.nothing_to_sequence.push(route.id),
                Ok(Err(e)) => {
                    error!("Failed to optimize route {}: {}", route.id, e);
                    summary.failed.push((route.id, e.code().to_string()));
                }
                Err(e) => {
                    error!("Optimization task for route {} panicked: {}", route.id, e);
                    summary.failed.push((route.id, "INTERNAL_ERROR".to_string()));
                }
            }
        }

        Ok(summary)
    }

    /// Nearest stops on a date around an explicit coordinate
    pub async fn nearby(&self, request: &FindNearbyRequest) -> PlannerResult<Vec<NearbyStop>> {
        check_coordinates("reference", &request.reference)?;
        let limit = self.resolve_limit(request.limit)?;

        let stops = self.store.stops_on_date(request.date).await?;
        Ok(find_nearby(&stops, &request.reference, request.date, request.exclude_stop_id, limit))
    }

    /// Nearest stops on the same date as a stored stop, excluding the stop itself
    pub async fn nearby_for_stop(&self, stop_id: Uuid, limit: Option<i64>) -> PlannerResult<Vec<NearbyStop>> {
        let limit = self.resolve_limit(limit)?;
        let stop = self.store.get_stop(stop_id).await?.ok_or(PlannerError::StopNotFound(stop_id))?;

        let Some(reference) = stop.coordinates() else {
            debug!("Stop {} has no coordinates, no nearby stops", stop_id);
            return Ok(vec![]);
        };

        let stops = self.store.stops_on_date(stop.date).await?;
        Ok(find_nearby(&stops, &reference, stop.date, Some(stop_id), limit))
    }

    /// Move a stop to another route (or none). Clears its order and the
    /// optimized flag of both routes.
    pub async fn assign_stop(&self, stop_id: Uuid, route_id: Option<Uuid>) -> PlannerResult<Stop> {
        let stop = self.store.get_stop(stop_id).await?.ok_or(PlannerError::StopNotFound(stop_id))?;

        if stop.route_id == route_id {
            return Ok(stop);
        }
        if let Some(new_route) = route_id {
            if self.store.get_route(new_route).await?.is_none() {
                return Err(PlannerError::RouteNotFound(new_route));
            }
        }

        let affected: Vec<Uuid> = [stop.route_id, route_id].into_iter().flatten().collect();
        let _guards = affected
            .iter()
            .map(|&r| self.lock(r))
            .collect::<PlannerResult<Vec<_>>>()?;

        let updated = self
            .store
            .assign_stop(stop_id, route_id)
            .await?
            .ok_or(PlannerError::StopNotFound(stop_id))?;

        for &r in &affected {
            self.store.clear_route_optimized(r).await?;
        }

        info!("Stop {} reassigned: {:?} -> {:?}", stop_id, stop.route_id, route_id);
        Ok(updated)
    }

    /// Update a stop's coordinates. Its route must be re-optimized afterwards.
    pub async fn move_stop(&self, stop_id: Uuid, coordinates: Coordinates) -> PlannerResult<Stop> {
        check_coordinates("stop", &coordinates)?;

        let stop = self.store.get_stop(stop_id).await?.ok_or(PlannerError::StopNotFound(stop_id))?;
        let _guard = stop.route_id.map(|r| self.lock(r)).transpose()?;

        let updated = self
            .store
            .move_stop(stop_id, coordinates)
            .await?
            .ok_or(PlannerError::StopNotFound(stop_id))?;

        if let Some(route_id) = updated.route_id {
            self.store.clear_route_optimized(route_id).await?;
        }

        debug!("Stop {} moved to ({}, {})", stop_id, coordinates.lat, coordinates.lng);
        Ok(updated)
    }

    fn lock(&self, route_id: Uuid) -> PlannerResult<RouteLockGuard> {
        self.locks.try_acquire(route_id).ok_or(PlannerError::RouteBusy(route_id))
    }

    fn resolve_limit(&self, limit: Option<i64>) -> Result<usize, ValidationError> {
        resolve_limit(limit, self.settings.nearby_default_limit, self.settings.nearby_max_limit)
    }
}
