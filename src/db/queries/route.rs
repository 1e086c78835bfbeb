//! Route database queries

use sqlx::PgPool;
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use anyhow::Result;

use crate::types::Route;

/// Get a single route
pub async fn get_route(pool: &PgPool, route_id: Uuid) -> Result<Option<Route>> {
    let route = sqlx::query_as::<_, Route>(
        r#"
        SELECT id, technician_id, date, optimized, optimized_at
        FROM routes
        WHERE id = $1
        "#
    )
    .bind(route_id)
    .fetch_optional(pool)
    .await?;

    Ok(route)
}

/// List all routes for a specific date (all technicians)
pub async fn list_routes_for_date(pool: &PgPool, date: NaiveDate) -> Result<Vec<Route>> {
    let routes = sqlx::query_as::<_, Route>(
        r#"
        SELECT id, technician_id, date, optimized, optimized_at
        FROM routes
        WHERE date = $1
        ORDER BY id
        "#
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(routes)
}

/// Mark a route optimized unless a geocoded member still lacks an order.
///
/// Returns false when the route is missing or incomplete, e.g. a stop joined
/// it after the sequencing snapshot was taken.
pub async fn mark_optimized(
    pool: &PgPool,
    route_id: Uuid,
    optimized_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE routes
        SET optimized = TRUE, optimized_at = $2, updated_at = NOW()
        WHERE id = $1
          AND NOT EXISTS (
              SELECT 1 FROM stops
              WHERE route_id = $1
                AND stop_order IS NULL
                AND latitude IS NOT NULL
                AND longitude IS NOT NULL
          )
        "#
    )
    .bind(route_id)
    .bind(optimized_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Clear the optimized flag
pub async fn clear_optimized(pool: &PgPool, route_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE routes
        SET optimized = FALSE, optimized_at = NULL, updated_at = NOW()
        WHERE id = $1
        "#
    )
    .bind(route_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
