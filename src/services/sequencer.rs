//! Route sequencing
//!
//! Greedy nearest-neighbour walk over the geocoded stops of one route.
//! Starting from an anchor, the closest stop without an order is visited
//! next and receives the next 1-based order. O(n²) per route, which is fine
//! for the tens of stops a technician serves per day.

use tracing::debug;
use uuid::Uuid;

use crate::services::geo::planar_distance;
use crate::types::{
    Coordinates, OrderAssignment, RouteSequence, SequenceMode, SequenceStatus, Stop,
};

#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: usize,
    id: Uuid,
    coords: Coordinates,
}

/// Sequence the stops of `route_id` and write the orders back into `stops`.
///
/// Stops of other routes are ignored. Member stops without usable
/// coordinates are reported as unsequenceable; an order left over from an
/// earlier run is cleared so it cannot collide with `1..=n`. Equidistant
/// candidates are resolved by the lower stop id.
///
/// In [`SequenceMode::Extend`] stops that already carry an order keep their
/// relative position (compacted to `1..=m`) and the walk continues from the
/// last of them; the anchor is only used when nothing is ordered yet.
/// In [`SequenceMode::Rebuild`] every geocoded stop is sequenced again.
/// Without an anchor the walk starts at the stop with the smallest existing
/// order, or the lowest id when no stop is ordered.
pub fn sequence_route(
    route_id: Uuid,
    stops: &mut [Stop],
    anchor: Option<Coordinates>,
    mode: SequenceMode,
) -> RouteSequence {
    let mut geocoded = Vec::new();
    let mut unsequenceable = Vec::new();

    for (idx, stop) in stops.iter().enumerate() {
        if !stop.belongs_to(route_id) {
            continue;
        }
        match stop.coordinates() {
            Some(coords) => geocoded.push(Candidate { idx, id: stop.id, coords }),
            None => unsequenceable.push(stop.id),
        }
    }

    if geocoded.is_empty() {
        debug!("Route {}: no geocoded stops, nothing to sequence", route_id);
        return RouteSequence {
            route_id,
            status: SequenceStatus::NothingToSequence,
            ordered_stop_ids: vec![],
            unsequenceable,
            assignments: vec![],
        };
    }

    // Iteration order must not depend on how the snapshot was fetched
    geocoded.sort_by_key(|c| c.id);

    let mut sequence: Vec<Candidate> = Vec::with_capacity(geocoded.len());
    let mut remaining: Vec<Candidate>;

    let existing_order = |c: &Candidate| stops[c.idx].order;

    match mode {
        SequenceMode::Extend => {
            let (mut kept, rest): (Vec<_>, Vec<_>) =
                geocoded.into_iter().partition(|c| existing_order(c).is_some());
            kept.sort_by_key(|c| (existing_order(c), c.id));
            sequence.extend(kept);
            remaining = rest;

            if sequence.is_empty() && anchor.is_none() {
                // lowest id, the list is sorted
                sequence.push(remaining.remove(0));
            } else if !sequence.is_empty() && anchor.is_some() {
                debug!(
                    "Route {}: {} stops already ordered, continuing from the last one instead of the anchor",
                    route_id,
                    sequence.len()
                );
            }
        }
        SequenceMode::Rebuild => {
            remaining = geocoded;
            if anchor.is_none() {
                let start = remaining
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, c)| (existing_order(c).is_none(), existing_order(c), c.id))
                    .map(|(pos, _)| pos)
                    .unwrap_or(0);
                sequence.push(remaining.remove(start));
            }
        }
    }

    // An empty sequence at this point implies an explicit anchor
    let mut current = sequence.last().map(|c| c.coords).or(anchor);

    while let Some(pos) = current.as_ref().and_then(|from| nearest(from, &remaining)) {
        let next = remaining.swap_remove(pos);
        current = Some(next.coords);
        sequence.push(next);
    }

    let mut assignments = Vec::new();
    let mut ordered_stop_ids = Vec::with_capacity(sequence.len());

    for (position, candidate) in sequence.iter().enumerate() {
        let order = position as i32 + 1;
        let stop = &mut stops[candidate.idx];
        if stop.order != Some(order) {
            stop.order = Some(order);
            assignments.push(OrderAssignment { stop_id: candidate.id, order: Some(order) });
        }
        ordered_stop_ids.push(candidate.id);
    }

    for stop in stops.iter_mut() {
        if stop.belongs_to(route_id) && !stop.is_geocoded() && stop.order.take().is_some() {
            assignments.push(OrderAssignment { stop_id: stop.id, order: None });
        }
    }

    debug!(
        "Route {} sequenced ({}): {} stops, {} changed, {} unsequenceable",
        route_id,
        mode.as_str(),
        ordered_stop_ids.len(),
        assignments.len(),
        unsequenceable.len()
    );

    RouteSequence {
        route_id,
        status: SequenceStatus::Sequenced,
        ordered_stop_ids,
        unsequenceable,
        assignments,
    }
}

/// Position in `candidates` of the stop closest to `from` (ties: lower id)
fn nearest(from: &Coordinates, candidates: &[Candidate]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .map(|(pos, c)| (pos, planar_distance(from, &c.coords), c.id))
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)))
        .map(|(pos, _, _)| pos)
}

/// True when every geocoded member of the route has an order
pub fn is_fully_sequenced(route_id: Uuid, stops: &[Stop]) -> bool {
    stops
        .iter()
        .filter(|s| s.belongs_to(route_id) && s.is_geocoded())
        .all(|s| s.order.is_some())
}
