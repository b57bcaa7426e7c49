//! Registry of no-fly buildings and their edges.
//!
//! Buildings and vertices get stable integer ids at load time so that
//! ownership lookups never depend on comparing floating-point positions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::{BuildingPolygon, Coordinate};
use crate::spatial::{segments_intersect, Line, Segment};

/// Load-order index of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub usize);

/// Registry-wide index of a building vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub usize);

/// One side of a building, from ring vertex `index` to `index + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub building: BuildingId,
    pub index: usize,
    pub start: Coordinate,
    pub end: Coordinate,
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
}

impl Edge {
    pub fn segment(&self) -> Segment {
        Segment::new(self.start, self.end)
    }

    pub fn line(&self) -> Line {
        Line::through(self.start, self.end)
    }
}

/// A no-fly building with its derived edges and centroid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: Option<String>,
    /// Closed ring, first vertex repeated as last
    pub ring: Vec<Coordinate>,
    pub edges: Vec<Edge>,
    pub centroid: Coordinate,
}

/// Immutable set of buildings the drone must not cross.
#[derive(Debug, Clone, Default)]
pub struct NoFlyRegistry {
    buildings: Vec<Building>,
    vertex_owner: HashMap<VertexId, BuildingId>,
    position_owner: HashMap<(u64, u64), BuildingId>,
}

impl NoFlyRegistry {
    /// Build the registry, validating every ring.
    pub fn new(polygons: Vec<BuildingPolygon>) -> Result<Self> {
        let mut registry = Self::default();
        let mut next_vertex = 0usize;

        for (idx, polygon) in polygons.into_iter().enumerate() {
            let id = BuildingId(idx);
            validate_ring(idx, &polygon.ring)?;

            // the closing vertex reuses the id of the first
            let distinct = polygon.ring.len() - 1;
            let vertex_ids: Vec<VertexId> = (0..distinct)
                .map(|offset| VertexId(next_vertex + offset))
                .chain(std::iter::once(VertexId(next_vertex)))
                .collect();
            next_vertex += distinct;

            for (vertex, coord) in vertex_ids.iter().zip(polygon.ring.iter()) {
                registry.vertex_owner.insert(*vertex, id);
                registry
                    .position_owner
                    .entry(position_key(*coord))
                    .or_insert(id);
            }

            let edges = polygon
                .ring
                .windows(2)
                .enumerate()
                .map(|(index, pair)| Edge {
                    building: id,
                    index,
                    start: pair[0],
                    end: pair[1],
                    start_vertex: vertex_ids[index],
                    end_vertex: vertex_ids[index + 1],
                })
                .collect();

            let centroid = centroid(&polygon.ring[..distinct]);
            registry.buildings.push(Building {
                id,
                name: polygon.name,
                ring: polygon.ring,
                edges,
                centroid,
            });
        }

        Ok(registry)
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id.0)
    }

    pub fn centroid(&self, id: BuildingId) -> Option<Coordinate> {
        self.building(id).map(|building| building.centroid)
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Every building edge the segment touches, in building then ring order.
    pub fn edges_crossed(&self, segment: &Segment) -> Vec<&Edge> {
        self.buildings
            .iter()
            .flat_map(|building| building.edges.iter())
            .filter(|edge| segments_intersect(segment, &edge.segment()))
            .collect()
    }

    /// Whether the segment touches any building edge. Stops at the first hit.
    pub fn any_crossed(&self, segment: &Segment) -> bool {
        self.buildings
            .iter()
            .flat_map(|building| building.edges.iter())
            .any(|edge| segments_intersect(segment, &edge.segment()))
    }

    pub fn owning_building(&self, vertex: VertexId) -> Option<BuildingId> {
        self.vertex_owner.get(&vertex).copied()
    }

    /// First building whose ring contains exactly this position.
    pub fn building_at(&self, position: Coordinate) -> Option<BuildingId> {
        self.position_owner.get(&position_key(position)).copied()
    }
}

fn position_key(position: Coordinate) -> (u64, u64) {
    // +0.0 and -0.0 compare equal but differ in bits
    let normalize = |value: f64| if value == 0.0 { 0.0f64 } else { value };
    (
        normalize(position.lon).to_bits(),
        normalize(position.lat).to_bits(),
    )
}

fn validate_ring(building: usize, ring: &[Coordinate]) -> Result<()> {
    if ring.len() < 4 {
        return Err(CoreError::InvalidPolygon {
            building,
            reason: format!("ring needs at least 4 positions, got {}", ring.len()),
        });
    }
    if ring
        .iter()
        .any(|coord| !coord.lon.is_finite() || !coord.lat.is_finite())
    {
        return Err(CoreError::InvalidPolygon {
            building,
            reason: "ring contains a non-finite coordinate".to_string(),
        });
    }
    if ring.first() != ring.last() {
        return Err(CoreError::InvalidPolygon {
            building,
            reason: "ring is not closed (first vertex must equal last)".to_string(),
        });
    }
    Ok(())
}

fn centroid(vertices: &[Coordinate]) -> Coordinate {
    let count = vertices.len() as f64;
    let (lon_sum, lat_sum) = vertices
        .iter()
        .fold((0.0, 0.0), |(lon, lat), v| (lon + v.lon, lat + v.lat));
    Coordinate::new(lon_sum / count, lat_sum / count)
}
