//! Turns a desired next position into a legal one.
//!
//! A move is legal when its segment crosses no building edge and it ends
//! inside the airspace. Resolution is a fixed heuristic, not a search: each
//! stage either produces a position or falls back to the one it was given.

use crate::models::Coordinate;
use crate::movement::{heading_between, step, Heading};
use crate::no_fly::{Edge, NoFlyRegistry};
use crate::rules::FlightRules;
use crate::spatial::{euclidean_distance, intersection_point, Segment};

/// Avoidance stages bound to one registry and rule set.
#[derive(Debug, Clone, Copy)]
pub struct AvoidancePipeline<'a> {
    registry: &'a NoFlyRegistry,
    rules: &'a FlightRules,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    position: Coordinate,
    clear: bool,
    distance: f64,
    repeats_earlier_move: bool,
}

impl<'a> AvoidancePipeline<'a> {
    pub fn new(registry: &'a NoFlyRegistry, rules: &'a FlightRules) -> Self {
        Self { registry, rules }
    }

    /// Legal position for the move `current -> desired`.
    ///
    /// `history` holds every position flown so far and ends with `current`.
    pub fn legal_next_position(
        &self,
        current: Coordinate,
        desired: Coordinate,
        history: &[Coordinate],
    ) -> Coordinate {
        let avoided = self.resolve_no_fly(current, desired, history);
        self.resolve_confinement(current, avoided, history)
    }

    /// Steer around the nearest building edge the move would cross.
    pub fn resolve_no_fly(
        &self,
        current: Coordinate,
        desired: Coordinate,
        history: &[Coordinate],
    ) -> Coordinate {
        let path = Segment::new(current, desired);
        let crossed = self.registry.edges_crossed(&path);
        if crossed.is_empty() {
            return desired;
        }

        let Some(edge) = nearest_crossing(&path, &crossed) else {
            return desired;
        };

        let Some(centroid) = self
            .registry
            .owning_building(edge.start_vertex)
            .and_then(|building| self.registry.centroid(building))
        else {
            tracing::debug!(
                edge = edge.index,
                "Crossed edge has no owning building; keeping desired move"
            );
            return desired;
        };

        self.choose_detour(current, desired, edge, centroid, history)
    }

    /// Pull a move that leaves the airspace back toward its centre.
    pub fn resolve_confinement(
        &self,
        current: Coordinate,
        resolved: Coordinate,
        history: &[Coordinate],
    ) -> Coordinate {
        let airspace = &self.rules.airspace;
        let mut position = resolved;
        let mut heading = heading_between(current, airspace.centre());

        for pass in 0..self.rules.confinement_passes {
            let inside = airspace.contains(position);
            if inside && (pass == 0 || !self.crosses(current, position)) {
                break;
            }
            if pass > 0 {
                heading = heading.nudged();
            }
            tracing::debug!(
                pass,
                heading = heading.degrees(),
                "Move leaves the airspace; redirecting toward centre"
            );
            let redirected = step(heading, current, self.rules.step_length);
            position = self.resolve_no_fly(current, redirected, history);
        }

        position
    }

    fn crosses(&self, from: Coordinate, to: Coordinate) -> bool {
        self.registry.any_crossed(&Segment::new(from, to))
    }

    fn choose_detour(
        &self,
        current: Coordinate,
        desired: Coordinate,
        edge: &Edge,
        centroid: Coordinate,
        history: &[Coordinate],
    ) -> Coordinate {
        let [forward, backward] = detour_headings(current, edge, centroid);

        // heading flown two moves ago; repeating it means bouncing off the same side
        let earlier = match history {
            [.., before, previous, _current] => Some(heading_between(*before, *previous)),
            _ => None,
        };

        let candidate = |heading: Heading| {
            let position = step(heading, current, self.rules.step_length);
            Candidate {
                position,
                clear: !self.crosses(current, position),
                distance: euclidean_distance(desired, position),
                repeats_earlier_move: earlier
                    .map(|h| h == heading_between(current, position))
                    .unwrap_or(false),
            }
        };
        let first = candidate(forward);
        let second = candidate(backward);

        match (first.clear, second.clear) {
            (true, true) => {
                let mut chosen = desired;
                if (first.distance < second.distance && !first.repeats_earlier_move)
                    || second.repeats_earlier_move
                {
                    chosen = first.position;
                }
                if first.repeats_earlier_move
                    || (second.distance < first.distance && !second.repeats_earlier_move)
                {
                    chosen = second.position;
                }
                chosen
            }
            (true, false) => first.position,
            (false, true) => second.position,
            (false, false) => {
                tracing::debug!(
                    edge = edge.index,
                    building = edge.building.0,
                    "Neither detour clears the building; keeping desired move"
                );
                desired
            }
        }
    }
}

/// Headings along the crossed edge in both directions, each turned a further
/// 10 degrees when it would still clip the building.
fn detour_headings(current: Coordinate, edge: &Edge, centroid: Coordinate) -> [Heading; 2] {
    let (a, b) = (edge.start, edge.end);
    let mut forward = heading_between(a, b);
    let mut backward = heading_between(b, a);

    let (turn_forward, turn_backward) = if edge.line().is_steep() {
        (
            (a.lat > b.lat && centroid.lon < current.lon)
                || (a.lat < b.lat && centroid.lon > current.lon),
            (a.lat < b.lat && centroid.lon < current.lon)
                || (a.lat > b.lat && centroid.lon > current.lon),
        )
    } else {
        (
            (a.lon > b.lon && centroid.lat > current.lat)
                || (a.lon < b.lon && centroid.lat < current.lat),
            (a.lon < b.lon && centroid.lat > current.lat)
                || (a.lon > b.lon && centroid.lat < current.lat),
        )
    };

    if turn_forward {
        forward = forward.nudged();
    }
    if turn_backward {
        backward = backward.nudged();
    }
    [forward, backward]
}

/// The crossed edge whose intersection with the path lies closest to the
/// path's start. Later edges win ties.
fn nearest_crossing<'e>(path: &Segment, crossed: &[&'e Edge]) -> Option<&'e Edge> {
    let path_line = path.line();
    let mut best: Option<(&'e Edge, f64)> = None;

    for edge in crossed {
        let meeting = intersection_point(&path_line, &edge.line())
            .unwrap_or_else(|| nearer_endpoint(path.start, edge));
        let distance = euclidean_distance(meeting, path.start);
        match best {
            Some((_, best_distance)) if distance > best_distance => {}
            _ => best = Some((*edge, distance)),
        }
    }

    best.map(|(edge, _)| edge)
}

// Collinear overlaps have no single meeting point; use the closer end of the edge.
fn nearer_endpoint(from: Coordinate, edge: &Edge) -> Coordinate {
    if euclidean_distance(from, edge.start) <= euclidean_distance(from, edge.end) {
        edge.start
    } else {
        edge.end
    }
}
