//! Set of vertices still eligible to be drawn as candidates.

use rand::Rng;

use crate::{error::AggregationError, graph::VertexId};

/// Active vertices with O(1) removal and uniform sampling.
#[derive(Clone, Debug)]
pub(crate) struct ActiveSet {
    members: Vec<VertexId>,
    positions: Vec<Option<usize>>,
}

impl ActiveSet {
    pub(crate) fn full(vertex_count: usize) -> Self {
        Self {
            members: (0..vertex_count).map(VertexId::new).collect(),
            positions: (0..vertex_count).map(Some).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn contains(&self, vertex: VertexId) -> bool {
        matches!(self.positions.get(vertex.index()), Some(Some(_)))
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.members.iter().copied()
    }

    pub(crate) fn get(&self, position: usize) -> Option<VertexId> {
        self.members.get(position).copied()
    }

    pub(crate) fn pick_uniform<R: Rng>(&self, rng: &mut R) -> Option<VertexId> {
        if self.members.is_empty() {
            return None;
        }
        self.get(rng.gen_range(0..self.members.len()))
    }

    /// Removes `vertex`, failing when it is not a member.
    pub(crate) fn remove(&mut self, vertex: VertexId) -> Result<(), AggregationError> {
        let underflow = AggregationError::ActiveSetUnderflow {
            vertex: vertex.index(),
        };
        let position = self
            .positions
            .get_mut(vertex.index())
            .and_then(Option::take)
            .ok_or_else(|| underflow.clone())?;
        self.members.swap_remove(position);
        if let Some(&moved) = self.members.get(position) {
            let slot = self.positions.get_mut(moved.index()).ok_or(underflow)?;
            *slot = Some(position);
        }
        Ok(())
    }
}
