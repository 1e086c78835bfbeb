//! NATS message handlers

pub mod ping;
pub mod route;
pub mod stop;

use std::future::Future;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::select;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::planner::{PlannerError, PlannerResult, RoutePlanner};
use crate::types::{ErrorResponse, Request, SuccessResponse};

pub const SUBJECT_PING: &str = "poolroute.ping";
pub const SUBJECT_ROUTE_SEQUENCE: &str = "poolroute.route.sequence";
pub const SUBJECT_ROUTE_OPTIMIZE: &str = "poolroute.route.optimize";
pub const SUBJECT_ROUTE_OPTIMIZE_DAY: &str = "poolroute.route.optimize_day";
pub const SUBJECT_STOP_NEARBY: &str = "poolroute.stop.nearby";
pub const SUBJECT_STOP_NEARBY_FOR_STOP: &str = "poolroute.stop.nearby_for_stop";
pub const SUBJECT_STOP_ASSIGN: &str = "poolroute.stop.assign";
pub const SUBJECT_STOP_MOVE: &str = "poolroute.stop.move";

/// Parse a request envelope, producing the error reply on failure
fn parse_request<T: DeserializeOwned>(payload: &[u8]) -> Result<Request<T>, ErrorResponse> {
    serde_json::from_slice(payload)
        .map_err(|e| ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string()))
}

/// Build the reply body for a handler outcome
fn reply_body<R: Serialize>(request_id: Uuid, outcome: PlannerResult<R>) -> Result<Vec<u8>> {
    let body = match outcome {
        Ok(payload) => serde_json::to_vec(&SuccessResponse::new(request_id, payload))?,
        Err(e) => {
            match &e {
                PlannerError::Store(inner) => error!("Store failure: {:#}", inner),
                other => debug!("Request {} rejected: {}", request_id, other),
            }
            serde_json::to_vec(&ErrorResponse::new(request_id, e.code(), e.to_string()))?
        }
    };
    Ok(body)
}

/// Request/reply loop shared by all planner subjects
async fn serve_requests<T, R, F, Fut>(
    client: Client,
    mut subscriber: Subscriber,
    subject: &'static str,
    handle: F,
) -> Result<()>
where
    T: DeserializeOwned,
    R: Serialize,
    F: Fn(T) -> Fut,
    Fut: Future<Output = PlannerResult<R>>,
{
    while let Some(msg) = subscriber.next().await {
        debug!("Received {} message", subject);

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("{} message without reply subject", subject);
                continue;
            }
        };

        let request: Request<T> = match parse_request(&msg.payload) {
            Ok(req) => req,
            Err(error) => {
                error!("Failed to parse {} request: {}", subject, error.error.message);
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let request_id = request.id;
        let body = reply_body(request_id, handle(request.payload).await)?;
        if let Err(e) = client.publish(reply, body.into()).await {
            error!("Failed to publish {} reply: {}", subject, e);
        }
    }

    Ok(())
}

/// Start all message handlers
pub async fn start_handlers(client: Client, planner: RoutePlanner) -> Result<()> {
    info!("Starting message handlers...");

    let ping_sub = client.subscribe(SUBJECT_PING).await?;
    let route_sequence_sub = client.subscribe(SUBJECT_ROUTE_SEQUENCE).await?;
    let route_optimize_sub = client.subscribe(SUBJECT_ROUTE_OPTIMIZE).await?;
    let route_optimize_day_sub = client.subscribe(SUBJECT_ROUTE_OPTIMIZE_DAY).await?;
    let stop_nearby_sub = client.subscribe(SUBJECT_STOP_NEARBY).await?;
    let stop_nearby_for_stop_sub = client.subscribe(SUBJECT_STOP_NEARBY_FOR_STOP).await?;
    let stop_assign_sub = client.subscribe(SUBJECT_STOP_ASSIGN).await?;
    let stop_move_sub = client.subscribe(SUBJECT_STOP_MOVE).await?;

    info!("Subscribed to NATS subjects");

    let ping_handle = tokio::spawn(ping::handle_ping(client.clone(), ping_sub));
    let route_sequence_handle = tokio::spawn(route::handle_sequence(
        client.clone(),
        route_sequence_sub,
        planner.clone(),
    ));
    let route_optimize_handle = tokio::spawn(route::handle_optimize(
        client.clone(),
        route_optimize_sub,
        planner.clone(),
    ));
    let route_optimize_day_handle = tokio::spawn(route::handle_optimize_day(
        client.clone(),
        route_optimize_day_sub,
        planner.clone(),
    ));
    let stop_nearby_handle = tokio::spawn(stop::handle_nearby(
        client.clone(),
        stop_nearby_sub,
        planner.clone(),
    ));
    let stop_nearby_for_stop_handle = tokio::spawn(stop::handle_nearby_for_stop(
        client.clone(),
        stop_nearby_for_stop_sub,
        planner.clone(),
    ));
    let stop_assign_handle = tokio::spawn(stop::handle_assign(
        client.clone(),
        stop_assign_sub,
        planner.clone(),
    ));
    let stop_move_handle = tokio::spawn(stop::handle_move(client, stop_move_sub, planner));

    info!("All handlers started");

    // Any handler finishing means its subscription closed
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = route_sequence_handle => {
            error!("Route sequence handler finished: {:?}", result);
        }
        result = route_optimize_handle => {
            error!("Route optimize handler finished: {:?}", result);
        }
        result = route_optimize_day_handle => {
            error!("Route optimize day handler finished: {:?}", result);
        }
        result = stop_nearby_handle => {
            error!("Stop nearby handler finished: {:?}", result);
        }
        result = stop_nearby_for_stop_handle => {
            error!("Stop nearby-for-stop handler finished: {:?}", result);
        }
        result = stop_assign_handle => {
            error!("Stop assign handler finished: {:?}", result);
        }
        result = stop_move_handle => {
            error!("Stop move handler finished: {:?}", result);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OptimizeRouteRequest, SequenceMode, ValidationError};

    #[test]
    fn test_parse_request_reports_invalid_payload() {
        let err = parse_request::<OptimizeRouteRequest>(b"{not json").unwrap_err();
        assert_eq!(err.error.code, "INVALID_REQUEST");
        assert!(err.id.is_nil());
    }

    #[test]
    fn test_parse_request_reads_payload() {
        let body = serde_json::json!({
            "id": Uuid::from_u128(3),
            "timestamp": "2026-06-01T07:30:00Z",
            "payload": { "routeId": Uuid::from_u128(4), "mode": "rebuild" }
        });
        let req = parse_request::<OptimizeRouteRequest>(body.to_string().as_bytes()).unwrap();
        assert_eq!(req.payload.route_id, Uuid::from_u128(4));
        assert_eq!(req.payload.mode, SequenceMode::Rebuild);
    }

    #[test]
    fn test_reply_body_success_envelope() {
        let id = Uuid::from_u128(9);
        let body = reply_body(id, Ok(vec![1, 2, 3])).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["payload"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_reply_body_error_codes() {
        let id = Uuid::from_u128(9);

        let body = reply_body::<()>(id, Err(PlannerError::RouteBusy(Uuid::nil()))).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "ROUTE_BUSY");

        let body = reply_body::<()>(id, Err(ValidationError::LimitTooSmall(0).into())).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");

        let body = reply_body::<()>(id, Err(anyhow::anyhow!("connection reset").into())).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "DATABASE_ERROR");
        assert_eq!(json["error"]["message"], "connection reset");
    }
}
