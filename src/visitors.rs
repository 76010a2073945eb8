//! Graph cleanup and reporting passes.
//!
//! A pass implements [`BigraphVisitor`] and is executed with [`apply`]:
//! `previsit` runs once, `visit_vertex` runs for every vertex of the graph in
//! an unspecified order, and `postvisit` runs once. A destructive pass colors
//! vertices or edges during the visits and sweeps them in `postvisit`, so the
//! graph stays consistent while the visits run.
//!
//! The destructive passes expose removal counters so that drivers can report
//! what happened.

use std::fmt::Display;
use std::io::{self, Write};

use crate::bigraph::{Bigraph, Color, Dir, EdgeHandle, VertexHandle};
use crate::sequence;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// A pass over all vertices of a graph.
pub trait BigraphVisitor {
    /// Called once before the visits.
    fn previsit(&mut self, _graph: &mut Bigraph) {}

    /// Called once for every vertex. Returns `true` if the visit modified the
    /// graph locally.
    fn visit_vertex(&mut self, graph: &mut Bigraph, vertex: VertexHandle) -> bool;

    /// Called once after the visits.
    fn postvisit(&mut self, _graph: &mut Bigraph) {}
}

/// Runs the visitor against the graph.
///
/// Returns `true` if any visit reported a modification. Callers that need a
/// fixpoint can reapply the visitor until this returns `false`.
pub fn apply<V: BigraphVisitor + ?Sized>(graph: &mut Bigraph, visitor: &mut V) -> bool {
    visitor.previsit(graph);
    let mut modified = false;
    for vertex in graph.vertex_handles() {
        if graph.has_vertex(vertex) {
            modified |= visitor.visit_vertex(graph, vertex);
        }
    }
    visitor.postvisit(graph);
    modified
}

//-----------------------------------------------------------------------------

/// Removes short islands and dead-end tips.
///
/// An island has no edges at all; a tip has no edges in one of the two
/// directions. Either is removed when its sequence is shorter than the
/// minimum length.
pub struct TrimVisitor {
    min_length: usize,
    islands: usize,
    terminals: usize,
}

impl TrimVisitor {
    /// Creates a new pass with the given minimum sequence length.
    pub fn new(min_length: usize) -> Self {
        TrimVisitor { min_length, islands: 0, terminals: 0 }
    }

    /// Returns the number of islands removed by the last run.
    pub fn islands(&self) -> usize {
        self.islands
    }

    /// Returns the number of tips removed by the last run.
    pub fn terminals(&self) -> usize {
        self.terminals
    }
}

impl BigraphVisitor for TrimVisitor {
    fn previsit(&mut self, graph: &mut Bigraph) {
        self.islands = 0;
        self.terminals = 0;
        graph.reset_colors(Color::White);
    }

    fn visit_vertex(&mut self, graph: &mut Bigraph, vertex: VertexHandle) -> bool {
        let seq_len = graph.vertex(vertex).seq().len();
        if seq_len >= self.min_length {
            return false;
        }
        if graph.degree(vertex) == 0 {
            graph.vertex_mut(vertex).set_color(Color::Black);
            self.islands += 1;
            return true;
        }
        for dir in Dir::ALL {
            if graph.degree_in_dir(vertex, dir) == 0 {
                graph.vertex_mut(vertex).set_color(Color::Black);
                self.terminals += 1;
                return true;
            }
        }
        false
    }

    fn postvisit(&mut self, graph: &mut Bigraph) {
        graph.sweep_vertices(Color::Black);
    }
}

//-----------------------------------------------------------------------------

/// Removes short vertices that look like chimeric joins.
///
/// A chimeric vertex sits on a single path between two branching neighbors,
/// and at least one of the neighbors has a clearly longer overlap with some
/// other vertex.
pub struct ChimericVisitor {
    min_length: usize,
    delta: usize,
    chimeric: usize,
}

impl ChimericVisitor {
    /// Creates a new pass. A vertex is a candidate when its sequence is
    /// shorter than `min_length`; a sibling overlap must be at least `delta`
    /// longer to confirm it.
    pub fn new(min_length: usize, delta: usize) -> Self {
        ChimericVisitor { min_length, delta, chimeric: 0 }
    }

    /// Returns the number of chimeric vertices removed by the last run.
    pub fn chimeric(&self) -> usize {
        self.chimeric
    }

    // Returns true if some edge of the list has an overlap at least `delta`
    // longer than the given one.
    fn has_longer_sibling(&self, graph: &Bigraph, edges: &[EdgeHandle], base: usize) -> bool {
        edges.iter().any(|&e| {
            let len = graph.edge(e).coord().len();
            len > base && len - base >= self.delta
        })
    }
}

impl BigraphVisitor for ChimericVisitor {
    fn previsit(&mut self, graph: &mut Bigraph) {
        self.chimeric = 0;
        graph.reset_colors(Color::White);
    }

    fn visit_vertex(&mut self, graph: &mut Bigraph, vertex: VertexHandle) -> bool {
        if graph.degree_in_dir(vertex, Dir::Sense) != 1
            || graph.degree_in_dir(vertex, Dir::Antisense) != 1
            || graph.vertex(vertex).seq().len() >= self.min_length {
            return false;
        }
        let prev_edge = graph.edges_in_dir(vertex, Dir::Antisense)[0];
        let next_edge = graph.edges_in_dir(vertex, Dir::Sense)[0];
        let prev_vert = graph.edge(prev_edge).end();
        let next_vert = graph.edge(next_edge).end();

        if graph.degree_in_dir(prev_vert, Dir::Sense) < 2
            || graph.degree_in_dir(next_vert, Dir::Antisense) < 2 {
            return false;
        }
        let prev_siblings = graph.edges_in_dir(prev_vert, Dir::Sense);
        let next_siblings = graph.edges_in_dir(next_vert, Dir::Antisense);
        let confirmed =
            self.has_longer_sibling(graph, &prev_siblings, graph.edge(prev_edge).coord().len())
            || self.has_longer_sibling(graph, &next_siblings, graph.edge(next_edge).coord().len());
        if confirmed {
            graph.vertex_mut(vertex).set_color(Color::Black);
            self.chimeric += 1;
            return true;
        }
        false
    }

    fn postvisit(&mut self, graph: &mut Bigraph) {
        graph.sweep_vertices(Color::Black);
    }
}

//-----------------------------------------------------------------------------

/// Removes every vertex that is contained in another vertex.
///
/// The edges of a contained vertex are unlinked during the visit and the
/// vertex itself is swept in `postvisit`. The pass clears the graph
/// containment flag in `previsit`; drivers should reapply the pass while the
/// flag is set.
pub struct ContainRemoveVisitor {
    contained: usize,
}

impl ContainRemoveVisitor {
    /// Creates a new pass.
    pub fn new() -> Self {
        ContainRemoveVisitor { contained: 0 }
    }

    /// Returns the number of contained vertices removed by the last run.
    pub fn contained(&self) -> usize {
        self.contained
    }
}

impl Default for ContainRemoveVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl BigraphVisitor for ContainRemoveVisitor {
    fn previsit(&mut self, graph: &mut Bigraph) {
        graph.reset_colors(Color::White);
        // If anything reintroduces a containment, the flag is raised again
        // and the caller must run another round.
        graph.set_containment(false);
        self.contained = 0;
    }

    fn visit_vertex(&mut self, graph: &mut Bigraph, vertex: VertexHandle) -> bool {
        if !graph.vertex(vertex).contained() {
            return false;
        }
        let edges = graph.edges_of(vertex).to_vec();
        for edge in edges {
            if graph.has_edge(edge) {
                graph.remove_edge_pair(edge);
            }
        }
        graph.vertex_mut(vertex).set_color(Color::Black);
        self.contained += 1;
        true
    }

    fn postvisit(&mut self, graph: &mut Bigraph) {
        graph.sweep_vertices(Color::Black);
    }
}

//-----------------------------------------------------------------------------

/// Removes edges that are clearly dominated at both endpoints.
///
/// For every vertex and direction, edges whose overlap is more than `delta`
/// shorter than the best overlap in that direction are candidates. A
/// candidate is removed when the reciprocal edges at its far end also carry
/// an overlap more than `delta` longer than the candidate.
///
/// The graph must not contain containments.
pub struct MaximalOverlapVisitor {
    delta: usize,
    dummies: usize,
}

impl MaximalOverlapVisitor {
    /// Creates a new pass with the given length tolerance.
    pub fn new(delta: usize) -> Self {
        MaximalOverlapVisitor { delta, dummies: 0 }
    }

    /// Returns the number of overlaps removed by the last run.
    pub fn dummies(&self) -> usize {
        self.dummies
    }

    // Returns true if the edge leaves its start vertex through the sense end
    // of the underlying overlap, accounting for reverse-complemented partners.
    fn is_sense_oriented(graph: &Bigraph, edge: EdgeHandle) -> bool {
        let edge = graph.edge(edge);
        (!edge.is_rc() && edge.dir() == Dir::Sense) || (edge.is_rc() && edge.dir() == Dir::Antisense)
    }
}

impl BigraphVisitor for MaximalOverlapVisitor {
    fn previsit(&mut self, graph: &mut Bigraph) {
        assert!(!graph.containment(), "The graph must not have containments");
        graph.reset_colors(Color::White);
        self.dummies = 0;
    }

    fn visit_vertex(&mut self, graph: &mut Bigraph, vertex: VertexHandle) -> bool {
        let mut modified = false;
        for dir in Dir::ALL {
            let mut edges = graph.edges_in_dir(vertex, dir);
            edges.sort_by(|&a, &b| {
                graph.edge(b).coord().len().cmp(&graph.edge(a).coord().len())
            });
            for j in 1..edges.len() {
                let candidate = edges[j];
                if graph.edge(candidate).color() == Color::Black {
                    continue;
                }
                let best_len = graph.edge(edges[0]).coord().len();
                let candidate_len = graph.edge(candidate).coord().len();
                if best_len - candidate_len <= self.delta {
                    continue;
                }

                // The reciprocal edges at the far end: those leaving through
                // the opposite sense of this direction. The set contains at
                // least the twin of the candidate.
                let end = graph.edge(candidate).end();
                let reciprocal: Vec<EdgeHandle> = graph.edges_of(end).iter().copied()
                    .filter(|&e| Self::is_sense_oriented(graph, e) != (dir == Dir::Sense))
                    .collect();
                assert!(!reciprocal.is_empty(), "A dominated edge must have a reciprocal overlap");

                let longest = reciprocal.iter()
                    .map(|&e| graph.edge(e).coord().len())
                    .max()
                    .unwrap();
                if longest - candidate_len <= self.delta {
                    continue;
                }

                let twin = graph.edge(candidate).twin();
                graph.edge_mut(candidate).set_color(Color::Black);
                graph.edge_mut(twin).set_color(Color::Black);
                self.dummies += 1;
                modified = true;
            }
        }
        modified
    }

    fn postvisit(&mut self, graph: &mut Bigraph) {
        graph.sweep_edges(Color::Black);
    }
}

//-----------------------------------------------------------------------------

/// Collects degree statistics without modifying the graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticsVisitor {
    terminal: usize,
    island: usize,
    monobranch: usize,
    dibranch: usize,
    simple: usize,
    edges: usize,
    vertices: usize,
}

impl StatisticsVisitor {
    /// Creates a new pass.
    pub fn new() -> Self {
        StatisticsVisitor::default()
    }

    /// Returns the number of vertices with no edges at all.
    pub fn islands(&self) -> usize {
        self.island
    }

    /// Returns the number of vertices with edges in exactly one direction.
    pub fn terminals(&self) -> usize {
        self.terminal
    }

    /// Returns the number of vertices branching in exactly one direction.
    pub fn monobranches(&self) -> usize {
        self.monobranch
    }

    /// Returns the number of vertices branching in both directions.
    pub fn dibranches(&self) -> usize {
        self.dibranch
    }

    /// Returns the number of vertices with a single edge in some direction.
    pub fn simple(&self) -> usize {
        self.simple
    }

    /// Returns the number of directed edges, i.e. twice the number of
    /// overlaps.
    pub fn edges(&self) -> usize {
        self.edges
    }

    /// Returns the number of vertices.
    pub fn vertices(&self) -> usize {
        self.vertices
    }
}

impl BigraphVisitor for StatisticsVisitor {
    fn previsit(&mut self, _graph: &mut Bigraph) {
        *self = StatisticsVisitor::default();
    }

    fn visit_vertex(&mut self, graph: &mut Bigraph, vertex: VertexHandle) -> bool {
        let fdeg = graph.degree_in_dir(vertex, Dir::Sense);
        let rdeg = graph.degree_in_dir(vertex, Dir::Antisense);

        if fdeg == 0 && rdeg == 0 {
            self.island += 1;
        } else if fdeg == 0 || rdeg == 0 {
            self.terminal += 1;
        }

        if fdeg > 1 && rdeg > 1 {
            self.dibranch += 1;
        } else if fdeg > 1 || rdeg > 1 {
            self.monobranch += 1;
        }

        if fdeg == 1 || rdeg == 1 {
            self.simple += 1;
        }

        self.edges += fdeg + rdeg;
        self.vertices += 1;

        false
    }
}

impl Display for StatisticsVisitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vertices: {} Edges: {} Islands: {} Tips: {} Monobranch: {} Dibranch: {} Simple: {}",
            self.vertices, self.edges, self.island, self.terminal,
            self.monobranch, self.dibranch, self.simple)
    }
}

//-----------------------------------------------------------------------------

/// Writes every vertex to a FASTA stream.
pub struct FastaVisitor<'a> {
    stream: &'a mut dyn Write,
    result: io::Result<()>,
}

impl<'a> FastaVisitor<'a> {
    /// Creates a new pass writing to the given stream.
    pub fn new(stream: &'a mut dyn Write) -> Self {
        FastaVisitor { stream, result: Ok(()) }
    }

    /// Returns the result of the writes, consuming the visitor.
    pub fn into_result(self) -> io::Result<()> {
        self.result
    }
}

impl<'a> BigraphVisitor for FastaVisitor<'a> {
    fn visit_vertex(&mut self, graph: &mut Bigraph, vertex: VertexHandle) -> bool {
        if self.result.is_ok() {
            let vertex = graph.vertex(vertex);
            self.result = sequence::write_fasta(vertex.id(), vertex.seq(), self.stream);
        }
        false
    }
}

//-----------------------------------------------------------------------------
