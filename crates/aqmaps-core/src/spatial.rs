//! Planar geometry for path/edge crossing checks.
//!
//! Longitude is the x axis and latitude the y axis. Distances are in degrees;
//! the survey area is small enough that no projection is applied.

use serde::{Deserialize, Serialize};

use crate::models::Coordinate;

/// Straight-line distance between two positions in coordinate units.
pub fn euclidean_distance(a: Coordinate, b: Coordinate) -> f64 {
    let dlon = a.lon - b.lon;
    let dlat = a.lat - b.lat;
    (dlon * dlon + dlat * dlat).sqrt()
}

/// Infinite line through two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Line {
    /// `lat = slope * lon + intercept`
    General { slope: f64, intercept: f64 },
    /// Both defining points share a longitude.
    Vertical { x: f64 },
}

impl Line {
    pub fn through(a: Coordinate, b: Coordinate) -> Self {
        if a.lon == b.lon {
            return Line::Vertical { x: a.lon };
        }
        let slope = (a.lat - b.lat) / (a.lon - b.lon);
        let intercept = a.lat - slope * a.lon;
        Line::General { slope, intercept }
    }

    /// True when the line rises at least as fast as it runs. Vertical lines are steep.
    pub fn is_steep(&self) -> bool {
        match *self {
            Line::General { slope, .. } => slope.abs() >= 1.0,
            Line::Vertical { .. } => true,
        }
    }
}

/// Unique intersection of two lines, or `None` when they are parallel or identical.
pub fn intersection_point(a: &Line, b: &Line) -> Option<Coordinate> {
    match (*a, *b) {
        (
            Line::General {
                slope: m1,
                intercept: c1,
            },
            Line::General {
                slope: m2,
                intercept: c2,
            },
        ) => {
            if m1 == m2 {
                return None;
            }
            let x = (c1 - c2) / (m2 - m1);
            Some(Coordinate::new(x, m1 * x + c1))
        }
        (Line::Vertical { .. }, Line::Vertical { .. }) => None,
        (Line::Vertical { x }, Line::General { slope, intercept })
        | (Line::General { slope, intercept }, Line::Vertical { x }) => {
            Some(Coordinate::new(x, slope * x + intercept))
        }
    }
}

/// Closed segment between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Coordinate,
    pub end: Coordinate,
}

impl Segment {
    pub const fn new(start: Coordinate, end: Coordinate) -> Self {
        Self { start, end }
    }

    pub fn line(&self) -> Line {
        Line::through(self.start, self.end)
    }

    pub fn lon_range(&self) -> (f64, f64) {
        (
            self.start.lon.min(self.end.lon),
            self.start.lon.max(self.end.lon),
        )
    }

    pub fn lat_range(&self) -> (f64, f64) {
        (
            self.start.lat.min(self.end.lat),
            self.start.lat.max(self.end.lat),
        )
    }
}

fn within(range: (f64, f64), value: f64) -> bool {
    value >= range.0 && value <= range.1
}

fn ranges_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// Check whether two segments share at least one point.
///
/// Parallel lines never intersect, identical lines intersect when their
/// projections overlap, and otherwise the unique crossing point must fall
/// inside both segments (bounds inclusive).
pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    match (a.line(), b.line()) {
        (
            Line::General {
                slope: m1,
                intercept: c1,
            },
            Line::General {
                slope: m2,
                intercept: c2,
            },
        ) => {
            if m1 == m2 {
                return c1 == c2 && ranges_overlap(a.lon_range(), b.lon_range());
            }
            let x = (c1 - c2) / (m2 - m1);
            within(a.lon_range(), x) && within(b.lon_range(), x)
        }
        (Line::Vertical { x: x1 }, Line::Vertical { x: x2 }) => {
            x1 == x2 && ranges_overlap(a.lat_range(), b.lat_range())
        }
        (Line::Vertical { x }, Line::General { slope, intercept }) => {
            vertical_meets(a, x, b, slope, intercept)
        }
        (Line::General { slope, intercept }, Line::Vertical { x }) => {
            vertical_meets(b, x, a, slope, intercept)
        }
    }
}

fn vertical_meets(vertical: &Segment, x: f64, general: &Segment, slope: f64, intercept: f64) -> bool {
    within(general.lon_range(), x) && within(vertical.lat_range(), slope * x + intercept)
}
