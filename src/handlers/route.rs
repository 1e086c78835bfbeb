//! Route sequencing message handlers

use anyhow::Result;
use async_nats::{Client, Subscriber};

use super::{
    serve_requests, SUBJECT_ROUTE_OPTIMIZE, SUBJECT_ROUTE_OPTIMIZE_DAY, SUBJECT_ROUTE_SEQUENCE,
};
use crate::services::planner::RoutePlanner;
use crate::types::{OptimizeDayRequest, OptimizeRouteRequest, SequenceRouteRequest};

/// Handle route.sequence messages
///
/// Sequences the stop snapshot carried in the request. Nothing is persisted.
pub async fn handle_sequence(client: Client, subscriber: Subscriber, planner: RoutePlanner) -> Result<()> {
    serve_requests(client, subscriber, SUBJECT_ROUTE_SEQUENCE, move |request: SequenceRouteRequest| {
        let outcome = planner.sequence_snapshot(request);
        async move { outcome }
    })
    .await
}

/// Handle route.optimize messages
pub async fn handle_optimize(client: Client, subscriber: Subscriber, planner: RoutePlanner) -> Result<()> {
    serve_requests(client, subscriber, SUBJECT_ROUTE_OPTIMIZE, move |request: OptimizeRouteRequest| {
        let planner = planner.clone();
        async move {
            planner
                .optimize_route(request.route_id, request.anchor, request.mode)
                .await
        }
    })
    .await
}

/// Handle route.optimize_day messages
pub async fn handle_optimize_day(client: Client, subscriber: Subscriber, planner: RoutePlanner) -> Result<()> {
    serve_requests(client, subscriber, SUBJECT_ROUTE_OPTIMIZE_DAY, move |request: OptimizeDayRequest| {
        let planner = planner.clone();
        async move { planner.optimize_day(request.date, request.mode).await }
    })
    .await
}
