//! Stop proximity and editing message handlers

use anyhow::Result;
use async_nats::{Client, Subscriber};

use super::{
    serve_requests, SUBJECT_STOP_ASSIGN, SUBJECT_STOP_MOVE, SUBJECT_STOP_NEARBY,
    SUBJECT_STOP_NEARBY_FOR_STOP,
};
use crate::services::planner::RoutePlanner;
use crate::types::{AssignStopRequest, FindNearbyRequest, MoveStopRequest, NearbyForStopRequest};

/// Handle stop.nearby messages (explicit reference coordinate)
pub async fn handle_nearby(client: Client, subscriber: Subscriber, planner: RoutePlanner) -> Result<()> {
    serve_requests(client, subscriber, SUBJECT_STOP_NEARBY, move |request: FindNearbyRequest| {
        let planner = planner.clone();
        async move { planner.nearby(&request).await }
    })
    .await
}

/// Handle stop.nearby_for_stop messages (reference is a stored stop)
pub async fn handle_nearby_for_stop(client: Client, subscriber: Subscriber, planner: RoutePlanner) -> Result<()> {
    serve_requests(client, subscriber, SUBJECT_STOP_NEARBY_FOR_STOP, move |request: NearbyForStopRequest| {
        let planner = planner.clone();
        async move { planner.nearby_for_stop(request.stop_id, request.limit).await }
    })
    .await
}

/// Handle stop.assign messages
pub async fn handle_assign(client: Client, subscriber: Subscriber, planner: RoutePlanner) -> Result<()> {
    serve_requests(client, subscriber, SUBJECT_STOP_ASSIGN, move |request: AssignStopRequest| {
        let planner = planner.clone();
        async move { planner.assign_stop(request.stop_id, request.route_id).await }
    })
    .await
}

/// Handle stop.move messages
pub async fn handle_move(client: Client, subscriber: Subscriber, planner: RoutePlanner) -> Result<()> {
    serve_requests(client, subscriber, SUBJECT_STOP_MOVE, move |request: MoveStopRequest| {
        let planner = planner.clone();
        async move { planner.move_stop(request.stop_id, request.coordinates).await }
    })
    .await
}
