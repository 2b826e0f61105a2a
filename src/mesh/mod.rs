//! Undirected point graph built from a triangulated mesh.
//!
//! Points and polygons live in arenas and are addressed by stable integer
//! handles. Adjacency is stored per point as a deduplicated, insertion ordered
//! handle list; the decoder is the only writer, the graph is read-only once
//! built.

use crate::math::Float3;
use std::collections::HashMap;

/// Handle of a unique point in a [`Mesh`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(u32);

impl PointId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a triangle in a [`Mesh`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolygonId(u32);

impl PolygonId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One corner of a triangle with its texture coordinate, if the file had one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolygonVertex {
    pub point: PointId,
    pub uv: Option<[f32; 2]>,
}

impl PolygonVertex {
    pub const fn new(point: PointId, uv: Option<[f32; 2]>) -> Self {
        Self { point, uv }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: [PolygonVertex; 3],
}

impl Polygon {
    pub fn find_vertex(&self, point: PointId) -> Option<&PolygonVertex> {
        self.vertices.iter().find(|v| v.point == point)
    }

    pub fn contains(&self, point: PointId) -> bool {
        self.find_vertex(point).is_some()
    }
}

#[derive(Debug, Clone)]
pub struct MeshPoint {
    pub position: Float3,
    neighbours: Vec<PointId>,
    polygons: Vec<PolygonId>,
}

impl MeshPoint {
    fn new(position: Float3) -> Self {
        Self {
            position,
            neighbours: Vec::new(),
            polygons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    points: Vec<MeshPoint>,
    polygons: Vec<Polygon>,
    edge_count: usize,

    // Exact-coordinate dedup table
    point_index: HashMap<[u32; 3], PointId>,
}

/// Bit pattern key; `-0.0` and `0.0` collapse to the same coordinate.
fn position_key(p: Float3) -> [u32; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from raw positions and triangle indices into them.
    /// Duplicate positions are merged; returns `None` on an out-of-range index.
    pub fn from_triangles(positions: &[Float3], triangles: &[[u32; 3]]) -> Option<Self> {
        let mut mesh = Self::new();
        let ids: Vec<PointId> = positions
            .iter()
            .map(|&p| mesh.insert_point(p).0)
            .collect();

        let mut polygon_ids = Vec::with_capacity(triangles.len());
        for tri in triangles {
            let mut vertices = [PolygonVertex::new(PointId(0), None); 3];
            for (slot, &index) in vertices.iter_mut().zip(tri) {
                slot.point = *ids.get(index as usize)?;
            }
            polygon_ids.push(mesh.add_polygon(Polygon { vertices }));
        }
        for id in polygon_ids {
            mesh.connect_polygon(id);
        }
        Some(mesh)
    }

    /// Returns the handle for `position`, inserting it when unseen.
    /// The flag is true when a new point was created.
    pub(crate) fn insert_point(&mut self, position: Float3) -> (PointId, bool) {
        let key = position_key(position);
        if let Some(&id) = self.point_index.get(&key) {
            return (id, false);
        }
        let id = PointId(self.points.len() as u32);
        self.points.push(MeshPoint::new(position));
        self.point_index.insert(key, id);
        (id, true)
    }

    /// Stores a polygon and records it on each of its points.
    pub(crate) fn add_polygon(&mut self, polygon: Polygon) -> PolygonId {
        let id = PolygonId(self.polygons.len() as u32);
        for vertex in &polygon.vertices {
            let polygons = &mut self.points[vertex.point.index()].polygons;
            if !polygons.contains(&id) {
                polygons.push(id);
            }
        }
        self.polygons.push(polygon);
        id
    }

    /// Adds the undirected edges between every vertex pair of a polygon.
    /// Returns the number of new edges.
    pub(crate) fn connect_polygon(&mut self, id: PolygonId) -> usize {
        let vertices = self.polygons[id.index()].vertices;
        let mut added = 0;
        for v0 in &vertices {
            for v1 in &vertices {
                if self.connect(v0.point, v1.point) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Adds an undirected edge. Self loops and existing edges are ignored.
    pub(crate) fn connect(&mut self, a: PointId, b: PointId) -> bool {
        if a == b || self.is_neighbour(a, b) {
            return false;
        }
        self.points[a.index()].neighbours.push(b);
        self.points[b.index()].neighbours.push(a);
        self.edge_count += 1;
        true
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All point handles in insertion order.
    pub fn point_ids(&self) -> impl Iterator<Item = PointId> {
        (0..self.points.len() as u32).map(PointId)
    }

    pub fn point(&self, id: PointId) -> &MeshPoint {
        &self.points[id.index()]
    }

    pub fn position(&self, id: PointId) -> Float3 {
        self.points[id.index()].position
    }

    pub fn neighbours(&self, id: PointId) -> &[PointId] {
        &self.points[id.index()].neighbours
    }

    pub fn is_neighbour(&self, a: PointId, b: PointId) -> bool {
        self.points[a.index()].neighbours.contains(&b)
    }

    pub fn polygons_of(&self, id: PointId) -> &[PolygonId] {
        &self.points[id.index()].polygons
    }

    pub fn polygon(&self, id: PolygonId) -> &Polygon {
        &self.polygons[id.index()]
    }

    pub fn find_point(&self, position: Float3) -> Option<PointId> {
        self.point_index.get(&position_key(position)).copied()
    }

    /// Texture coordinate of `point` in the first polygon it shares with
    /// `shared_point` that also touches one of `shared_ring`.
    pub fn find_uv(
        &self,
        point: PointId,
        shared_point: PointId,
        shared_ring: &[PointId],
    ) -> Option<[f32; 2]> {
        for &polygon_id in self.polygons_of(point) {
            let polygon = self.polygon(polygon_id);
            let Some(own) = polygon.find_vertex(point) else {
                continue;
            };
            if !polygon.contains(shared_point) {
                continue;
            }
            if polygon
                .vertices
                .iter()
                .any(|v| shared_ring.contains(&v.point))
            {
                return own.uv;
            }
        }
        None
    }
}
