use super::Ring;
use crate::mesh::Mesh;

/// Walks from ring to ring along a tube, away from the ring it started next
/// to. Yields the start ring first; stops at a tube end or wherever the
/// continuation is ambiguous.
#[derive(Debug, Clone)]
pub struct RingIterator<'a> {
    mesh: &'a Mesh,
    current: Option<Ring>,
    ignore: Ring,
}

impl<'a> RingIterator<'a> {
    pub fn new(mesh: &'a Mesh, start: Ring, previous: Ring) -> Self {
        Self {
            mesh,
            current: Some(start),
            ignore: previous,
        }
    }
}

impl Iterator for RingIterator<'_> {
    type Item = Ring;

    fn next(&mut self) -> Option<Ring> {
        let current = self.current.take()?;
        let neighbours = current.find_neighbours(self.mesh, Some(&self.ignore));
        if let [next] = neighbours[..] {
            self.ignore = current;
            self.current = Some(next);
        }
        Some(current)
    }
}
