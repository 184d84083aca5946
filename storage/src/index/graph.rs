use rollgraph_core::model::VertexId;
use std::collections::{BTreeMap, HashMap};

/// Undirected multigraph keyed by vertex, storing an occurrence count per
/// neighbor. Degree is the number of distinct neighbors.
///
/// A histogram of degrees is kept up to date on every mutation so that order
/// statistics over the degree distribution need not touch every vertex.
/// Vertices whose last neighbor entry is removed are dropped entirely.
#[derive(Debug, Clone, Default)]
pub struct DegreeGraph {
    adjacency: HashMap<VertexId, HashMap<VertexId, usize>>,
    degree_histogram: BTreeMap<usize, usize>,
}

impl DegreeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, a: &VertexId, b: &VertexId) {
        self.add_entry(a, b);
        self.add_entry(b, a);
    }

    /// Removes one occurrence of `b` from `a`'s neighbors and vice versa.
    /// Missing entries are skipped. Returns true when both entries existed.
    pub fn remove_edge(&mut self, a: &VertexId, b: &VertexId) -> bool {
        let ab = self.remove_entry(a, b);
        let ba = self.remove_entry(b, a);
        ab && ba
    }

    pub fn degree(&self, v: &VertexId) -> usize {
        self.adjacency.get(v).map_or(0, |counts| counts.len())
    }

    /// Number of parallel live edges between `a` and `b`.
    pub fn multiplicity(&self, a: &VertexId, b: &VertexId) -> usize {
        self.adjacency
            .get(a)
            .and_then(|counts| counts.get(b))
            .copied()
            .unwrap_or(0)
    }

    pub fn neighbors(&self, v: &VertexId) -> impl Iterator<Item = &VertexId> {
        self.adjacency.get(v).into_iter().flat_map(|counts| counts.keys())
    }

    /// Degrees of every vertex with at least one live neighbor entry.
    pub fn degrees(&self) -> impl Iterator<Item = (&VertexId, usize)> {
        self.adjacency.iter().map(|(v, counts)| (v, counts.len()))
    }

    /// `degree -> number of vertices with that degree`, ascending.
    pub fn degree_histogram(&self) -> &BTreeMap<usize, usize> {
        &self.degree_histogram
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    fn add_entry(&mut self, v: &VertexId, neighbor: &VertexId) {
        let (before, after) = {
            let counts = self.adjacency.entry(v.clone()).or_default();
            let before = counts.len();
            *counts.entry(neighbor.clone()).or_insert(0) += 1;
            (before, counts.len())
        };
        self.shift_degree(before, after);
    }

    fn remove_entry(&mut self, v: &VertexId, neighbor: &VertexId) -> bool {
        let Some(counts) = self.adjacency.get_mut(v) else {
            return false;
        };
        let before = counts.len();
        let Some(count) = counts.get_mut(neighbor) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            counts.remove(neighbor);
        }
        let after = counts.len();
        if after == 0 {
            self.adjacency.remove(v);
        }
        self.shift_degree(before, after);
        true
    }

    fn shift_degree(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        if from > 0 {
            if let Some(count) = self.degree_histogram.get_mut(&from) {
                *count -= 1;
                if *count == 0 {
                    self.degree_histogram.remove(&from);
                }
            }
        }
        if to > 0 {
            *self.degree_histogram.entry(to).or_insert(0) += 1;
        }
    }
}
