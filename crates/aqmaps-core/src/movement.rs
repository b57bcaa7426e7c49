//! Heading quantization and fixed-length movement.
//!
//! Headings are mathematical angles: 0 = east, increasing counter-clockwise.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::Coordinate;

/// A travel direction restricted to multiples of 10 degrees in [0, 350].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Heading(u16);

impl Heading {
    pub const EAST: Heading = Heading(0);

    pub fn new(degrees: i32) -> Result<Self> {
        if is_valid_heading(degrees) {
            Ok(Self(degrees as u16))
        } else {
            Err(CoreError::InvalidHeading(degrees))
        }
    }

    pub fn degrees(self) -> i32 {
        i32::from(self.0)
    }

    pub fn radians(self) -> f64 {
        f64::from(self.0).to_radians()
    }

    /// Rotate counter-clockwise by 10 degrees, wrapping 350 to 0.
    pub fn nudged(self) -> Self {
        Self((self.0 + 10) % 360)
    }
}

impl TryFrom<i32> for Heading {
    type Error = CoreError;

    fn try_from(degrees: i32) -> Result<Self> {
        Self::new(degrees)
    }
}

impl From<Heading> for i32 {
    fn from(heading: Heading) -> Self {
        heading.degrees()
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn is_multiple_of_ten(degrees: i32) -> bool {
    degrees % 10 == 0
}

pub fn is_within_heading_range(degrees: i32) -> bool {
    (0..=350).contains(&degrees)
}

pub fn is_valid_heading(degrees: i32) -> bool {
    is_multiple_of_ten(degrees) && is_within_heading_range(degrees)
}

/// Position reached by moving `distance` from `position` along `heading`.
pub fn step(heading: Heading, position: Coordinate, distance: f64) -> Coordinate {
    let radians = heading.radians();
    Coordinate::new(
        position.lon + distance * radians.cos(),
        position.lat + distance * radians.sin(),
    )
}

/// Quantized heading that points from `from` toward `to`.
pub fn heading_between(from: Coordinate, to: Coordinate) -> Heading {
    let raw = ((from.lat - to.lat).atan2(from.lon - to.lon) + PI).to_degrees();
    quantize(raw)
}

/// Map an arbitrary angle in degrees onto the legal heading set.
///
/// The angle is reduced modulo 360, shifted into [0, 360) and then truncated
/// down to a multiple of 10. Truncation, not rounding: 359.9 becomes 350.
pub fn quantize(degrees: f64) -> Heading {
    let mut angle = degrees % 360.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    let truncated = angle - (angle % 10.0);
    // a tiny negative angle shifts to exactly 360.0, which is east
    let whole = truncated as i32;
    Heading::new(whole).unwrap_or(Heading::EAST)
}
