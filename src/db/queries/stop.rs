//! Stop database queries

use sqlx::PgPool;
use uuid::Uuid;
use chrono::NaiveDate;
use anyhow::Result;

use crate::types::{Coordinates, OrderAssignment, Stop};

const STOP_COLUMNS: &str =
    "id, route_id, technician_id, latitude, longitude, date, stop_order";

/// Get a single stop
pub async fn get_stop(pool: &PgPool, stop_id: Uuid) -> Result<Option<Stop>> {
    let stop = sqlx::query_as::<_, Stop>(&format!(
        "SELECT {STOP_COLUMNS} FROM stops WHERE id = $1"
    ))
    .bind(stop_id)
    .fetch_optional(pool)
    .await?;

    Ok(stop)
}

/// All stops of a route, ordered ones first
pub async fn list_route_stops(pool: &PgPool, route_id: Uuid) -> Result<Vec<Stop>> {
    let stops = sqlx::query_as::<_, Stop>(&format!(
        "SELECT {STOP_COLUMNS} FROM stops WHERE route_id = $1 ORDER BY stop_order ASC NULLS LAST, id"
    ))
    .bind(route_id)
    .fetch_all(pool)
    .await?;

    Ok(stops)
}

/// All stops scheduled on a date, across technicians
pub async fn list_stops_for_date(pool: &PgPool, date: NaiveDate) -> Result<Vec<Stop>> {
    let stops = sqlx::query_as::<_, Stop>(&format!(
        "SELECT {STOP_COLUMNS} FROM stops WHERE date = $1 ORDER BY id"
    ))
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(stops)
}

/// Write sequencer orders in a single transaction.
///
/// Rows are matched on both stop and route. If a stop was reassigned in the
/// meantime the transaction is rolled back and nothing is written.
pub async fn update_orders(
    pool: &PgPool,
    route_id: Uuid,
    assignments: &[OrderAssignment],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    for assignment in assignments {
        let result = sqlx::query(
            "UPDATE stops SET stop_order = $3, updated_at = NOW() WHERE id = $1 AND route_id = $2"
        )
        .bind(assignment.stop_id)
        .bind(route_id)
        .bind(assignment.order)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() != 1 {
            tx.rollback().await?;
            anyhow::bail!("stop {} is no longer a member of route {}", assignment.stop_id, route_id);
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Change route membership; the order always resets
pub async fn assign_route(
    pool: &PgPool,
    stop_id: Uuid,
    route_id: Option<Uuid>,
) -> Result<Option<Stop>> {
    let stop = sqlx::query_as::<_, Stop>(&format!(
        r#"
        UPDATE stops
        SET route_id = $2, stop_order = NULL, updated_at = NOW()
        WHERE id = $1
        RETURNING {STOP_COLUMNS}
        "#
    ))
    .bind(stop_id)
    .bind(route_id)
    .fetch_optional(pool)
    .await?;

    Ok(stop)
}

/// Update coordinates
pub async fn update_coordinates(
    pool: &PgPool,
    stop_id: Uuid,
    coordinates: Coordinates,
) -> Result<Option<Stop>> {
    let stop = sqlx::query_as::<_, Stop>(&format!(
        r#"
        UPDATE stops
        SET latitude = $2, longitude = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING {STOP_COLUMNS}
        "#
    ))
    .bind(stop_id)
    .bind(coordinates.lat)
    .bind(coordinates.lng)
    .fetch_optional(pool)
    .await?;

    Ok(stop)
}
