//! Cross-section rings of a tube mesh.
//!
//! A ring is four points forming a 4-cycle in the neighbour graph. Rotating
//! the point order re-presents the same ring; reversing it flips the
//! cross-section orientation. After alignment points 0 and 1 form the top
//! edge and the winding makes `front()` point along the track.

mod detect;
mod iter;

pub use detect::{find_ring, RingSearch};
pub use iter::RingIterator;

use crate::math::{Float3, Quaternion};
use crate::mesh::{Mesh, PointId};
use std::collections::VecDeque;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Ring {
    points: [PointId; 4],
}

impl Ring {
    pub const fn new(points: [PointId; 4]) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[PointId; 4] {
        &self.points
    }

    /// Rotates the points one step: `p0 p1 p2 p3 -> p1 p2 p3 p0`.
    pub fn rotate(&mut self) {
        self.points.rotate_left(1);
    }

    pub fn reversed(mut self) -> Self {
        self.points.reverse();
        self
    }

    pub fn includes_point(&self, point: PointId) -> bool {
        self.points.contains(&point)
    }

    /// Same four points in any order. Used for loop detection only; all
    /// other comparisons are order sensitive.
    pub fn is_same_points(&self, other: &Ring) -> bool {
        other.points.iter().all(|&p| self.includes_point(p))
    }

    /// True when `p0 p1 p2 p3` is this ring walked the other way round
    /// from the same first point.
    fn is_same_points_reversed(&self, p0: PointId, p1: PointId, p2: PointId, p3: PointId) -> bool {
        self.points == [p0, p3, p2, p1]
    }

    /// Every point connects to the point at the same position in `other`.
    pub fn is_connected(&self, mesh: &Mesh, other: &Ring) -> bool {
        self.points
            .iter()
            .zip(&other.points)
            .all(|(&a, &b)| mesh.is_neighbour(a, b))
    }

    /// No edge joins opposite corners.
    pub fn is_chordless(&self, mesh: &Mesh) -> bool {
        let [p0, p1, p2, p3] = self.points;
        !mesh.is_neighbour(p0, p2) && !mesh.is_neighbour(p1, p3)
    }

    fn avg_dist_sq(&self, mesh: &Mesh, other: &Ring) -> f32 {
        self.points
            .iter()
            .zip(&other.points)
            .map(|(&a, &b)| mesh.position(a).distance_sq(mesh.position(b)))
            .sum::<f32>()
            / 4.0
    }

    fn position(&self, mesh: &Mesh, index: usize) -> Float3 {
        mesh.position(self.points[index])
    }

    /// Centroid of the four points.
    pub fn pos(&self, mesh: &Mesh) -> Float3 {
        let sum = self
            .points
            .iter()
            .fold(Float3::ZERO, |acc, &p| acc + mesh.position(p));
        sum * 0.25
    }

    /// Midpoint of the top edge (points 0 and 1).
    fn top(&self, mesh: &Mesh) -> Float3 {
        self.position(mesh, 0).midpoint(self.position(mesh, 1))
    }

    /// Averaged direction of two point pairs, each pointing from `back` to
    /// `front`.
    fn dir_vec(&self, mesh: &Mesh, front0: usize, back0: usize, front1: usize, back1: usize) -> Float3 {
        let d0 = self.position(mesh, front0) - self.position(mesh, back0);
        let d1 = self.position(mesh, front1) - self.position(mesh, back1);
        ((d0 + d1) * 0.5).normalize()
    }

    pub fn up(&self, mesh: &Mesh) -> Float3 {
        self.dir_vec(mesh, 0, 3, 1, 2)
    }

    pub fn left(&self, mesh: &Mesh) -> Float3 {
        self.dir_vec(mesh, 0, 1, 3, 2)
    }

    pub fn front(&self, mesh: &Mesh) -> Float3 {
        self.left(mesh).cross(self.up(mesh)).normalize()
    }

    pub fn orientation(&self, mesh: &Mesh) -> Quaternion {
        Quaternion::from_look(self.front(mesh), self.up(mesh))
    }

    /// Rotates the ring so the top edge is the highest one. Assumes the
    /// structure is predominantly upright.
    pub fn align_maximum_up(&mut self, mesh: &Mesh) {
        let mut best = *self;
        let mut best_top = best.top(mesh).y;
        let mut ring = *self;
        for _ in 0..3 {
            ring.rotate();
            let top = ring.top(mesh).y;
            if top > best_top {
                best_top = top;
                best = ring;
            }
        }
        *self = best;
    }

    /// Rotates the ring so that the top edge carries texture V == 1 in the
    /// side polygons towards every neighbour ring. All neighbours must agree
    /// on the rotation. Leaves the ring untouched and returns false when the
    /// UV data does not settle it.
    pub fn align_facing_up(&mut self, mesh: &Mesh, neighbours: &[Ring]) -> bool {
        let mut result: Option<Ring> = None;
        for neighbour in neighbours {
            let Some(aligned) = self.facing_up_towards(mesh, neighbour) else {
                return false;
            };
            match result {
                Some(previous) if previous != aligned => return false,
                _ => result = Some(aligned),
            }
        }

        match result {
            Some(ring) => {
                *self = ring;
                true
            }
            None => false,
        }
    }

    fn facing_up_towards(&self, mesh: &Mesh, neighbour: &Ring) -> Option<Ring> {
        let mut ring = *self;
        for _ in 0..4 {
            let uv_l = mesh.find_uv(ring.points[0], ring.points[3], &neighbour.points)?;
            let uv_r = mesh.find_uv(ring.points[1], ring.points[2], &neighbour.points)?;
            if uv_l[1] == 1.0 && uv_r[1] == 1.0 {
                return Some(ring);
            }
            ring.rotate();
        }
        None
    }

    /// Reverses the winding (`p0 p1 p2 p3 -> p1 p0 p3 p2`, top edge kept)
    /// when `front()` points away from `next`.
    pub fn align_front(&mut self, mesh: &Mesh, next: &Ring) {
        let forward = next.pos(mesh) - self.pos(mesh);
        if forward.dot(self.front(mesh)) < 0.0 {
            let [p0, p1, p2, p3] = self.points;
            self.points = [p1, p0, p3, p2];
        }
    }

    /// Re-orders this ring so each point connects to the point at the same
    /// position in `reference`. Of the 8 orderings (4 rotations, both
    /// windings) the connected one closest to `reference` wins, which rules
    /// out the diagonal edges of the side quads.
    pub fn align(&mut self, mesh: &Mesh, reference: &Ring) -> bool {
        let mut best: Option<(Ring, f32)> = None;
        for start in [*self, self.reversed()] {
            let mut ring = start;
            for _ in 0..4 {
                if reference.is_connected(mesh, &ring) {
                    let dist_sq = ring.avg_dist_sq(mesh, reference);
                    if best.map_or(true, |(_, best_dist)| dist_sq < best_dist) {
                        best = Some((ring, dist_sq));
                    }
                }
                ring.rotate();
            }
        }

        match best {
            Some((ring, _)) => {
                *self = ring;
                true
            }
            None => false,
        }
    }

    /// Finds the one or two rings directly connected to this one, skipping
    /// `ignore`. Every result is aligned to this ring. An empty result means
    /// there is no valid neighbour (end of the tube, or not a tube).
    pub fn find_neighbours(&self, mesh: &Mesh, ignore: Option<&Ring>) -> Vec<Ring> {
        let mut collected: Vec<PointId> = Vec::new();
        for &point in &self.points {
            for &n in mesh.neighbours(point) {
                if self.includes_point(n)
                    || ignore.is_some_and(|r| r.includes_point(n))
                    || collected.contains(&n)
                {
                    continue;
                }
                collected.push(n);
            }
        }

        let mut rings = multiple_from_points(mesh, &collected);
        for ring in &mut rings {
            if !ring.align(mesh, self) {
                return Vec::new();
            }
        }
        rings
    }

    /// Orders four points into a ring.
    ///
    /// Each point needs 2 or 3 neighbours within the group; the third one is
    /// the diagonal of a capped tube end, and two diagonal points may not be
    /// chained directly. Returns `None` when the points do not close into a
    /// 4-cycle.
    pub fn from_points(mesh: &Mesh, points: &[PointId]) -> Option<Ring> {
        if points.len() != 4 {
            return None;
        }

        let mut pending: Vec<(PointId, bool)> = Vec::with_capacity(4);
        for &point in points {
            let in_group = mesh
                .neighbours(point)
                .iter()
                .filter(|n| points.contains(n))
                .count();
            if in_group != 2 && in_group != 3 {
                return None;
            }
            pending.push((point, in_group == 3));
        }

        let mut last = pending.remove(0);
        let mut sorted = vec![last.0];
        loop {
            let mut progressed = false;
            for i in (0..pending.len()).rev() {
                let (point, has_diagonal) = pending[i];
                if last.1 && has_diagonal {
                    continue;
                }
                if !mesh.is_neighbour(point, last.0) {
                    continue;
                }
                last = pending.remove(i);
                sorted.push(point);
                progressed = true;
            }

            if sorted.len() == 4 {
                if !mesh.is_neighbour(last.0, sorted[0]) {
                    return None;
                }
                return Some(Ring::new([sorted[0], sorted[1], sorted[2], sorted[3]]));
            }
            if !progressed {
                return None;
            }
        }
    }

    /// Lists the four point coordinates.
    pub fn describe(&self, mesh: &Mesh) -> String {
        let mut text = String::from("{");
        for &p in &self.points {
            text.push_str(&format!("\n  {}", mesh.position(p)));
        }
        text.push_str("\n}");
        text
    }

    /// Lists position and basis vectors.
    pub fn describe_frame(&self, mesh: &Mesh) -> String {
        format!(
            "{{\n  pos   {}\n  up    {}\n  front {}\n  left  {}\n}}",
            self.pos(mesh),
            self.up(mesh),
            self.front(mesh),
            self.left(mesh)
        )
    }
}

/// Splits a pool of neighbour points into one or two isolated rings.
fn multiple_from_points(mesh: &Mesh, points: &[PointId]) -> Vec<Ring> {
    match points.len() {
        4 => Ring::from_points(mesh, points).into_iter().collect(),
        8 => {
            let groups = connected_groups(mesh, points);
            if groups.len() != 2 || groups.iter().any(|g| g.len() != 4) {
                return Vec::new();
            }
            match (
                Ring::from_points(mesh, &groups[0]),
                Ring::from_points(mesh, &groups[1]),
            ) {
                (Some(first), Some(second)) => vec![first, second],
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// Connected components of the subgraph induced by `points`, ordered by
/// their first member.
fn connected_groups(mesh: &Mesh, points: &[PointId]) -> Vec<Vec<PointId>> {
    let mut assigned = vec![false; points.len()];
    let mut groups = Vec::new();
    for start in 0..points.len() {
        if assigned[start] {
            continue;
        }
        assigned[start] = true;
        let mut group = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(i) = queue.pop_front() {
            group.push(points[i]);
            for (j, &other) in points.iter().enumerate() {
                if !assigned[j] && mesh.is_neighbour(points[i], other) {
                    assigned[j] = true;
                    queue.push_back(j);
                }
            }
        }
        groups.push(group);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TubeMesh;
    use approx::assert_relative_eq;

    fn ids(indices: [u32; 4]) -> [PointId; 4] {
        indices.map(PointId::new)
    }

    /// Equal up to rotation and reflection.
    fn same_cycle(a: &Ring, b: &Ring) -> bool {
        let mut forward = *b;
        let mut backward = b.reversed();
        for _ in 0..4 {
            if forward == *a || backward == *a {
                return true;
            }
            forward.rotate();
            backward.rotate();
        }
        false
    }

    fn permutations(items: [PointId; 4]) -> Vec<[PointId; 4]> {
        let mut result = Vec::new();
        for a in 0..4 {
            for b in 0..4 {
                for c in 0..4 {
                    for d in 0..4 {
                        let idx = [a, b, c, d];
                        let mut seen = [false; 4];
                        idx.iter().for_each(|&i| seen[i] = true);
                        if seen.iter().all(|&s| s) {
                            result.push(idx.map(|i| items[i]));
                        }
                    }
                }
            }
        }
        result
    }

    #[test]
    fn rotate_and_reverse() {
        let mut ring = Ring::new(ids([0, 1, 2, 3]));
        ring.rotate();
        assert_eq!(ring.points(), &ids([1, 2, 3, 0]));
        assert_eq!(ring.reversed().points(), &ids([0, 3, 2, 1]));
    }

    #[test]
    fn same_points_ignores_order() {
        let a = Ring::new(ids([0, 1, 2, 3]));
        let b = Ring::new(ids([2, 0, 3, 1]));
        let c = Ring::new(ids([0, 1, 2, 4]));
        assert!(a.is_same_points(&b));
        assert_ne!(a, b);
        assert!(!a.is_same_points(&c));
        assert!(a.is_same_points_reversed(PointId::new(0), PointId::new(3), PointId::new(2), PointId::new(1)));
    }

    #[test]
    fn from_points_is_permutation_invariant() {
        let mesh = TubeMesh::straight(3, 2.0, Float3::ZERO).to_mesh();
        for ring_index in 0..3u32 {
            let base = ring_index * 4;
            let expected = Ring::new(ids([base, base + 1, base + 2, base + 3]));
            for perm in permutations(*expected.points()) {
                let ring = Ring::from_points(&mesh, &perm).expect("ring");
                assert!(same_cycle(&ring, &expected), "{:?} vs {:?}", ring, expected);
            }
        }
    }

    #[test]
    fn from_points_handles_capped_end_diagonal() {
        let mut tube = TubeMesh::straight(2, 2.0, Float3::ZERO);
        tube.cap_start();
        let mesh = tube.to_mesh();
        let expected = Ring::new(ids([0, 1, 2, 3]));
        assert!(!expected.is_chordless(&mesh));
        for perm in permutations(*expected.points()) {
            let ring = Ring::from_points(&mesh, &perm).expect("ring");
            assert!(same_cycle(&ring, &expected));
        }
    }

    #[test]
    fn from_points_rejects_non_rings() {
        let mesh = TubeMesh::straight(2, 2.0, Float3::ZERO).to_mesh();
        // Side quad points of two different sides
        assert!(Ring::from_points(&mesh, &ids([0, 2, 4, 6])).is_none());
        let three = [0, 1, 2].map(PointId::new);
        assert!(Ring::from_points(&mesh, &three).is_none());
    }

    #[test]
    fn align_is_idempotent() {
        let mesh = TubeMesh::straight(3, 2.0, Float3::ZERO).to_mesh();
        let reference = Ring::new(ids([4, 5, 6, 7]));
        let mut ring = Ring::new(ids([9, 8, 11, 10]));
        assert!(ring.align(&mesh, &reference));
        assert_eq!(ring.points(), &ids([8, 9, 10, 11]));

        let once = ring;
        assert!(ring.align(&mesh, &reference));
        assert_eq!(ring, once);
    }

    #[test]
    fn align_fails_for_unconnected_ring() {
        let mesh = TubeMesh::straight(3, 2.0, Float3::ZERO).to_mesh();
        let mut far = Ring::new(ids([8, 9, 10, 11]));
        assert!(!far.align(&mesh, &Ring::new(ids([0, 1, 2, 3]))));
        assert_eq!(far.points(), &ids([8, 9, 10, 11]));
    }

    #[test]
    fn find_neighbours_in_middle_and_at_end() {
        let mesh = TubeMesh::straight(3, 2.0, Float3::ZERO).to_mesh();
        let first = Ring::new(ids([0, 1, 2, 3]));
        let middle = Ring::new(ids([4, 5, 6, 7]));

        let around_middle = middle.find_neighbours(&mesh, None);
        assert_eq!(around_middle.len(), 2);
        assert!(around_middle.iter().any(|r| r.is_same_points(&first)));
        for ring in &around_middle {
            assert!(middle.is_connected(&mesh, ring));
        }

        let ahead = middle.find_neighbours(&mesh, Some(&first));
        assert_eq!(ahead.len(), 1);
        assert_eq!(ahead[0].points(), &ids([8, 9, 10, 11]));

        let last = Ring::new(ids([8, 9, 10, 11]));
        assert!(last.find_neighbours(&mesh, Some(&middle)).is_empty());
    }

    #[test]
    fn geometry_of_upright_ring() {
        let mesh = TubeMesh::straight(2, 2.0, Float3::ZERO).to_mesh();
        // a b c d: top left, top right, bottom right, bottom left
        let ring = Ring::new(ids([0, 1, 2, 3]));
        let pos = ring.pos(&mesh);
        assert_relative_eq!(pos.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pos.y, 0.0, epsilon = 1e-6);

        let up = ring.up(&mesh);
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-6);
        let left = ring.left(&mesh);
        assert_relative_eq!(left.x, -1.0, epsilon = 1e-6);
        let front = ring.front(&mesh);
        assert_relative_eq!(front.z, -1.0, epsilon = 1e-6);

        let q = ring.orientation(&mesh);
        assert_relative_eq!(q.front().z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(q.up().y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn align_maximum_up_picks_highest_edge() {
        let mesh = TubeMesh::straight(2, 2.0, Float3::ZERO).to_mesh();
        let mut ring = Ring::new(ids([2, 3, 0, 1]));
        ring.align_maximum_up(&mesh);
        assert_eq!(ring.points(), &ids([0, 1, 2, 3]));
    }

    #[test]
    fn align_front_follows_next_ring() {
        let mesh = TubeMesh::straight(2, 2.0, Float3::ZERO).to_mesh();
        let mut ring = Ring::new(ids([0, 1, 2, 3]));
        let next = Ring::new(ids([4, 5, 6, 7]));
        ring.align_front(&mesh, &next);
        assert_eq!(ring.points(), &ids([1, 0, 3, 2]));
        assert_relative_eq!(ring.front(&mesh).z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(ring.up(&mesh).y, 1.0, epsilon = 1e-6);

        let before = ring;
        ring.align_front(&mesh, &next);
        assert_eq!(ring, before);
    }

    #[test]
    fn align_facing_up_uses_texture_v() {
        // V == 1 on the +X side (points b and c)
        let tube = TubeMesh::straight(2, 2.0, Float3::ZERO).with_uv_top([1, 2]);
        let mesh = tube.to_mesh();
        let next = Ring::new(ids([4, 5, 6, 7]));

        let mut ring = Ring::new(ids([0, 1, 2, 3]));
        assert!(ring.align_facing_up(&mesh, &[next]));
        assert_eq!(ring.points(), &ids([1, 2, 3, 0]));
        assert_relative_eq!(ring.up(&mesh).x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn align_facing_up_without_uv_fails_untouched() {
        let mesh = TubeMesh::straight(2, 2.0, Float3::ZERO).to_mesh();
        let mut ring = Ring::new(ids([2, 3, 0, 1]));
        assert!(!ring.align_facing_up(&mesh, &[Ring::new(ids([4, 5, 6, 7]))]));
        assert!(!ring.align_facing_up(&mesh, &[]));
        assert_eq!(ring.points(), &ids([2, 3, 0, 1]));
    }

    #[test]
    fn connected_groups_split_isolated_points() {
        let mesh = TubeMesh::straight(3, 2.0, Float3::ZERO).to_mesh();
        let pool = ids([0, 8, 1, 9]).to_vec();
        let groups = connected_groups(&mesh, &pool);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec![PointId::new(0), PointId::new(1)]);
        assert_eq!(groups[1], vec![PointId::new(8), PointId::new(9)]);
    }
}
