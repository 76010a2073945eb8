//! Bidirected overlap graphs with twinned directed edges.
//!
//! A [`Bigraph`] stores one [`Vertex`] per read and models each pairwise
//! overlap as a pair of twinned directed [`Edge`]s, one owned by each
//! endpoint. An edge records which end of its start vertex takes part in the
//! overlap ([`Dir`]) and whether the partner is reverse-complemented
//! ([`Comp`]). The twin carries the complementary view of the same overlap.
//!
//! Vertices and edges live in arenas and are addressed by handles, so the
//! twin of an edge is an index instead of an owning reference. Removing an
//! edge always removes its twin as well, which keeps the graph twin-consistent
//! after every mutation.
//!
//! Graph cleanup works by coloring: a pass marks vertices or edges and a
//! sweep then removes everything of a given color. See [`crate::visitors`]
//! for the passes.

use std::collections::HashMap;

use crate::coord::SeqCoord;
use crate::overlap::Overlap;
use crate::sequence;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Direction of an edge relative to its start vertex.
///
/// A [`Dir::Sense`] edge overlaps the right (3') end of the start vertex and a
/// [`Dir::Antisense`] edge the left (5') end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dir {
    Sense,
    Antisense,
}

impl Dir {
    /// Both directions, in iteration order.
    pub const ALL: [Dir; 2] = [Dir::Sense, Dir::Antisense];

    /// Returns the opposite direction.
    pub fn flip(self) -> Dir {
        match self {
            Dir::Sense => Dir::Antisense,
            Dir::Antisense => Dir::Sense,
        }
    }
}

/// Relative orientation of the two sequences in an overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comp {
    Same,
    Reverse,
}

impl Comp {
    /// Returns the composition of two relative orientations.
    ///
    /// Two reversals cancel out.
    pub fn compose(self, other: Comp) -> Comp {
        if self == other { Comp::Same } else { Comp::Reverse }
    }
}

/// Colors used by the mark-and-sweep cleanup passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    White,
    Gray,
    Black,
    Red,
}

/// A handle to a vertex in the graph.
pub type VertexHandle = usize;

/// A handle to an edge in the graph.
pub type EdgeHandle = usize;

//-----------------------------------------------------------------------------

/// A vertex of the graph: one read and its outgoing edges.
#[derive(Clone, Debug)]
pub struct Vertex {
    id: String,
    seq: String,
    edges: Vec<EdgeHandle>,
    color: Color,
    contained: bool,
}

impl Vertex {
    /// Creates a new vertex with the given read id and sequence.
    pub fn new(id: &str, seq: &str) -> Self {
        Vertex {
            id: String::from(id),
            seq: String::from(seq),
            edges: Vec::new(),
            color: Color::White,
            contained: false,
        }
    }

    /// Returns the read id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the sequence.
    pub fn seq(&self) -> &str {
        &self.seq
    }

    /// Returns the current color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Returns `true` if the read is known to be contained in another read.
    pub fn contained(&self) -> bool {
        self.contained
    }

    /// Marks the read as contained in another read.
    pub fn set_contained(&mut self, contained: bool) {
        self.contained = contained;
    }
}

//-----------------------------------------------------------------------------

/// A directed edge of the graph; one half of an overlap.
///
/// The full overlap is represented by this edge and its twin, which starts
/// from the other endpoint.
#[derive(Clone, Debug)]
pub struct Edge {
    start: VertexHandle,
    end: VertexHandle,
    twin: EdgeHandle,
    dir: Dir,
    comp: Comp,
    coord: SeqCoord,
    color: Color,
}

impl Edge {
    /// Returns the vertex the edge starts from.
    pub fn start(&self) -> VertexHandle {
        self.start
    }

    /// Returns the vertex the edge points to.
    pub fn end(&self) -> VertexHandle {
        self.end
    }

    /// Returns the twin edge.
    pub fn twin(&self) -> EdgeHandle {
        self.twin
    }

    /// Returns the direction of the edge relative to its start vertex.
    pub fn dir(&self) -> Dir {
        self.dir
    }

    /// Returns the relative orientation of the overlapping sequences.
    pub fn comp(&self) -> Comp {
        self.comp
    }

    /// Returns the matched interval on the start vertex.
    pub fn coord(&self) -> SeqCoord {
        self.coord
    }

    /// Returns the current color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Returns `true` if the partner takes part in the overlap as its reverse
    /// complement.
    pub fn is_rc(&self) -> bool {
        self.comp == Comp::Reverse
    }

    /// Returns `true` if the edge starts and ends at the same vertex.
    pub fn is_self(&self) -> bool {
        self.start == self.end
    }
}

//-----------------------------------------------------------------------------

/// A bidirected overlap graph.
///
/// The graph owns its vertices and edges. Vertices are created by
/// [`Bigraph::add_vertex`] and edges by [`Bigraph::add_twin_edges`], which
/// always creates a twinned pair. See the module documentation for the
/// representation.
#[derive(Debug, Default)]
pub struct Bigraph {
    vertices: Vec<Option<Vertex>>,
    by_id: HashMap<String, VertexHandle>,
    edges: Vec<Option<Edge>>,
    containment: bool,
    min_overlap: usize,
}

impl Bigraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Bigraph::default()
    }

    /// Returns `true` if some vertex may be contained in another.
    pub fn containment(&self) -> bool {
        self.containment
    }

    /// Sets the containment flag.
    pub fn set_containment(&mut self, containment: bool) {
        self.containment = containment;
    }

    /// Returns the minimum overlap length used to build the graph.
    pub fn min_overlap(&self) -> usize {
        self.min_overlap
    }

    /// Sets the minimum overlap length metadata.
    pub fn set_min_overlap(&mut self, min_overlap: usize) {
        self.min_overlap = min_overlap;
    }

    //-------------------------------------------------------------------------

    // Vertex access.

    /// Inserts the vertex into the graph.
    ///
    /// Returns the handle of the new vertex, or [`None`] if the graph already
    /// contains a vertex with the same id.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Option<VertexHandle> {
        if self.by_id.contains_key(&vertex.id) {
            return None;
        }
        let handle = self.vertices.len();
        self.by_id.insert(vertex.id.clone(), handle);
        self.vertices.push(Some(vertex));
        Some(handle)
    }

    /// Returns the handle of the vertex with the given id.
    pub fn get_vertex(&self, id: &str) -> Option<VertexHandle> {
        self.by_id.get(id).copied()
    }

    /// Returns `true` if the handle refers to a live vertex.
    pub fn has_vertex(&self, handle: VertexHandle) -> bool {
        handle < self.vertices.len() && self.vertices[handle].is_some()
    }

    /// Returns a reference to the vertex with the given handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live vertex.
    pub fn vertex(&self, handle: VertexHandle) -> &Vertex {
        self.vertices[handle].as_ref().expect("Stale vertex handle")
    }

    /// Returns a mutable reference to the vertex with the given handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live vertex.
    pub fn vertex_mut(&mut self, handle: VertexHandle) -> &mut Vertex {
        self.vertices[handle].as_mut().expect("Stale vertex handle")
    }

    /// Returns the handles of all live vertices.
    pub fn vertex_handles(&self) -> Vec<VertexHandle> {
        (0..self.vertices.len()).filter(|&v| self.vertices[v].is_some()).collect()
    }

    /// Returns the number of live vertices.
    pub fn vertex_count(&self) -> usize {
        self.by_id.len()
    }

    //-------------------------------------------------------------------------

    // Edge access.

    /// Returns `true` if the handle refers to a live edge.
    pub fn has_edge(&self, handle: EdgeHandle) -> bool {
        handle < self.edges.len() && self.edges[handle].is_some()
    }

    /// Returns a reference to the edge with the given handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live edge.
    pub fn edge(&self, handle: EdgeHandle) -> &Edge {
        self.edges[handle].as_ref().expect("Stale edge handle")
    }

    /// Returns a mutable reference to the edge with the given handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live edge.
    pub fn edge_mut(&mut self, handle: EdgeHandle) -> &mut Edge {
        self.edges[handle].as_mut().expect("Stale edge handle")
    }

    /// Returns the handles of all live edges.
    pub fn edge_handles(&self) -> Vec<EdgeHandle> {
        (0..self.edges.len()).filter(|&e| self.edges[e].is_some()).collect()
    }

    /// Returns the number of live directed edges.
    ///
    /// Every overlap contributes two directed edges, so this is always even.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Returns the handles of the outgoing edges of the vertex.
    pub fn edges_of(&self, vertex: VertexHandle) -> &[EdgeHandle] {
        &self.vertex(vertex).edges
    }

    /// Returns the handles of the outgoing edges of the vertex in the given
    /// direction.
    pub fn edges_in_dir(&self, vertex: VertexHandle, dir: Dir) -> Vec<EdgeHandle> {
        self.vertex(vertex).edges.iter().copied()
            .filter(|&e| self.edge(e).dir == dir)
            .collect()
    }

    /// Returns the number of outgoing edges of the vertex.
    pub fn degree(&self, vertex: VertexHandle) -> usize {
        self.vertex(vertex).edges.len()
    }

    /// Returns the number of outgoing edges of the vertex in the given
    /// direction.
    pub fn degree_in_dir(&self, vertex: VertexHandle, dir: Dir) -> usize {
        self.vertex(vertex).edges.iter()
            .filter(|&&e| self.edge(e).dir == dir)
            .count()
    }

    //-------------------------------------------------------------------------

    // Edge creation and removal.

    /// Creates a twinned pair of edges between two vertices.
    ///
    /// The first edge starts from `start` with direction `start_dir` and the
    /// matched interval `start_coord` on its sequence; the second is the twin
    /// starting from `end`. Returns the handles of the two edges.
    ///
    /// # Panics
    ///
    /// Panics if the matched intervals have different lengths.
    pub fn add_twin_edges(
        &mut self,
        start: VertexHandle, start_dir: Dir, start_coord: SeqCoord,
        end: VertexHandle, end_dir: Dir, end_coord: SeqCoord,
        comp: Comp
    ) -> (EdgeHandle, EdgeHandle) {
        assert_eq!(start_coord.len(), end_coord.len(),
            "Twin edges must match intervals of equal length");
        let forward = self.edges.len();
        let backward = forward + 1;
        self.edges.push(Some(Edge {
            start, end, twin: backward,
            dir: start_dir, comp, coord: start_coord, color: Color::White,
        }));
        self.edges.push(Some(Edge {
            start: end, end: start, twin: forward,
            dir: end_dir, comp, coord: end_coord, color: Color::White,
        }));
        self.vertex_mut(start).edges.push(forward);
        self.vertex_mut(end).edges.push(backward);
        (forward, backward)
    }

    /// Removes an edge and its twin from the graph.
    ///
    /// The edges are unlinked from the edge lists of both endpoints before
    /// either cell is freed.
    pub fn remove_edge_pair(&mut self, handle: EdgeHandle) {
        let (twin, start, end) = {
            let edge = self.edge(handle);
            (edge.twin, edge.start, edge.end)
        };
        if let Some(vertex) = self.vertices[start].as_mut() {
            vertex.edges.retain(|&e| e != handle);
        }
        if let Some(vertex) = self.vertices[end].as_mut() {
            vertex.edges.retain(|&e| e != twin);
        }
        self.edges[handle] = None;
        self.edges[twin] = None;
    }

    //-------------------------------------------------------------------------

    // Edge labels.

    /// Returns the label of the edge: the part of the partner's sequence the
    /// overlap does not cover.
    ///
    /// The label is reverse-complemented when the partner is in the opposite
    /// orientation, so it is always in the reading frame of the start vertex.
    pub fn edge_label(&self, handle: EdgeHandle) -> String {
        let edge = self.edge(handle);
        let twin = self.edge(edge.twin);
        let unmatched = twin.coord.complement();
        let seq = self.vertex(edge.end).seq();
        let label = &seq[unmatched.start()..unmatched.end()];
        if edge.comp == Comp::Reverse {
            sequence::reverse_complement(label)
        } else {
            String::from(label)
        }
    }

    //-------------------------------------------------------------------------

    // Coloring and sweeping.

    /// Sets the color of every vertex and every edge.
    pub fn reset_colors(&mut self, color: Color) {
        for vertex in self.vertices.iter_mut().flatten() {
            vertex.color = color;
        }
        for edge in self.edges.iter_mut().flatten() {
            edge.color = color;
        }
    }

    /// Removes every vertex of the given color, along with all of its edges
    /// and their twins.
    pub fn sweep_vertices(&mut self, color: Color) {
        for handle in self.vertex_handles() {
            if self.vertex(handle).color == color {
                let edges = self.vertex(handle).edges.clone();
                for edge in edges {
                    // The twin of an earlier edge may already have freed this one.
                    if self.has_edge(edge) {
                        self.remove_edge_pair(edge);
                    }
                }
                let vertex = self.vertices[handle].take().expect("Stale vertex handle");
                self.by_id.remove(&vertex.id);
            }
        }
    }

    /// Removes every edge of the given color together with its twin.
    pub fn sweep_edges(&mut self, color: Color) {
        for handle in self.edge_handles() {
            if self.has_edge(handle) && self.edge(handle).color == color {
                self.remove_edge_pair(handle);
            }
        }
    }

    //-------------------------------------------------------------------------

    // Simplification.

    /// Merges unbranched vertices in both directions.
    pub fn simplify(&mut self) {
        self.simplify_in_dir(Dir::Sense);
        self.simplify_in_dir(Dir::Antisense);
    }

    /// Merges unbranched vertices in the given direction until no merge is
    /// possible.
    ///
    /// A vertex is merged with its neighbor when it has a single non-self
    /// edge in the direction and the neighbor has a single edge in the
    /// reciprocal direction. Merged-away vertices are swept before returning.
    pub fn simplify_in_dir(&mut self, dir: Dir) {
        let mut changed = true;
        while changed {
            changed = false;
            for vertex in self.vertex_handles() {
                let edges = self.edges_in_dir(vertex, dir);
                if edges.len() != 1 || self.edge(edges[0]).is_self() {
                    continue;
                }
                let single = edges[0];
                let twin = self.edge(single).twin;
                let end = self.edge(single).end;
                if self.degree_in_dir(end, self.edge(twin).dir) == 1 {
                    self.merge(vertex, single);
                    changed = true;
                }
            }
        }
        self.sweep_vertices(Color::Black);
    }

    /// Merges the vertex at the far end of the edge into `start`.
    ///
    /// The sequence of `start` is extended by the edge label, the remaining
    /// edges of the far end are absorbed, and the far end is colored
    /// [`Color::Black`] for sweeping. The caller must guarantee that `start`
    /// has no other edge in the direction of `edge` and that the far end has
    /// no other edge in the direction of the twin.
    pub fn merge(&mut self, start: VertexHandle, edge: EdgeHandle) {
        debug_assert_eq!(self.edge(edge).start, start, "Merge edge must start from the merged vertex");
        let twin = self.edge(edge).twin;
        let end = self.edge(edge).end;
        let dir = self.edge(edge).dir;
        let comp = self.edge(edge).comp;

        // Extend the sequence by the edge label. The label is already in the
        // reading frame of `start`, so it is prepended as is for antisense
        // extensions.
        let label = self.edge_label(edge);
        let end_len = self.vertex(end).seq.len();
        let merged_len = self.vertex(start).seq.len() + label.len();
        match dir {
            Dir::Sense => self.vertex_mut(start).seq.push_str(&label),
            Dir::Antisense => self.vertex_mut(start).seq.insert_str(0, &label),
        }

        // Re-base the matched intervals of the remaining edges of `start`.
        let shift = if dir == Dir::Antisense { label.len() } else { 0 };
        let kept = self.vertex(start).edges.clone();
        for handle in kept {
            if handle == edge {
                continue;
            }
            let coord = self.edge(handle).coord;
            self.edge_mut(handle).coord =
                SeqCoord::new(coord.start() + shift, coord.end() + shift, merged_len);
        }

        // Absorb the remaining edges of the far end. Arena cells are reused,
        // so twin handles stay valid across the transfer.
        let absorbed: Vec<EdgeHandle> = self.vertex(end).edges.iter().copied()
            .filter(|&e| e != twin)
            .collect();
        for &handle in absorbed.iter() {
            let coord = self.edge(handle).coord;
            let translated = translate_coord(coord, dir, comp, merged_len, end_len);
            {
                let cell = self.edge_mut(handle);
                cell.start = start;
                cell.dir = dir;
                cell.comp = comp.compose(cell.comp);
                cell.coord = translated;
                if cell.end == end {
                    cell.end = start;
                }
            }
            let partner = self.edge(handle).twin;
            if !absorbed.contains(&partner) {
                let cell = self.edge_mut(partner);
                cell.end = start;
                cell.comp = comp.compose(cell.comp);
            }
            self.vertex_mut(start).edges.push(handle);
        }

        // Drop the merged edge pair and schedule the far end for sweeping.
        self.vertex_mut(start).edges.retain(|&e| e != edge);
        self.edges[edge] = None;
        self.edges[twin] = None;
        let far = self.vertex_mut(end);
        far.edges.clear();
        far.set_color(Color::Black);
    }
}

// Maps an interval on the sequence of a merged-away vertex into the extended
// sequence of the surviving vertex. The merged-away sequence occupies the
// extension end of the merged sequence, reverse-complemented when the
// orientations differ.
fn translate_coord(coord: SeqCoord, dir: Dir, comp: Comp, merged_len: usize, end_len: usize) -> SeqCoord {
    let (start, end) = match (dir, comp) {
        (Dir::Sense, Comp::Same) => {
            let offset = merged_len - end_len;
            (coord.start() + offset, coord.end() + offset)
        }
        (Dir::Sense, Comp::Reverse) => (merged_len - coord.end(), merged_len - coord.start()),
        (Dir::Antisense, Comp::Same) => (coord.start(), coord.end()),
        (Dir::Antisense, Comp::Reverse) => (end_len - coord.end(), end_len - coord.start()),
    };
    SeqCoord::new(start, end, merged_len)
}

//-----------------------------------------------------------------------------

/// Materializes graph edges from overlap records.
///
/// The creator enforces the per-vertex degree cap: overlaps touching a vertex
/// that already has more than `max_edges` edges are dropped, which protects
/// the graph against ultra-dense repeat regions. Such vertices act as repeat
/// sentinels for the cleanup passes.
pub struct EdgeCreator<'a> {
    graph: &'a mut Bigraph,
    max_edges: usize,
}

impl<'a> EdgeCreator<'a> {
    /// Creates a new edge creator with the given degree cap.
    pub fn new(graph: &'a mut Bigraph, max_edges: usize) -> Self {
        EdgeCreator { graph, max_edges }
    }

    /// Creates the edges for the overlap.
    ///
    /// Returns `false` without touching the graph when the overlap cannot be
    /// used: one of the reads is missing from the graph (a strict substring
    /// of another read is never added), a non-containment interval does not
    /// reach an end of its read, or an endpoint is over the degree cap.
    pub fn create(&mut self, overlap: &Overlap) -> bool {
        let comp = if overlap.is_rc { Comp::Reverse } else { Comp::Same };

        let mut verts = [0; 2];
        for i in 0..2 {
            match self.graph.get_vertex(&overlap.ids[i]) {
                Some(handle) => verts[i] = handle,
                None => return false,
            }
        }

        // An internal match is a substring containment; the contained read is
        // handled elsewhere and no edges are created here.
        for i in 0..2 {
            if !overlap.coords[i].is_extreme() {
                return false;
            }
        }

        if self.graph.degree(verts[0]) > self.max_edges
            || self.graph.degree(verts[1]) > self.max_edges {
            return false;
        }

        if !overlap.is_containment() {
            let mut dirs = [Dir::Sense; 2];
            for i in 0..2 {
                dirs[i] = if overlap.coords[i].is_left_extreme() { Dir::Antisense } else { Dir::Sense };
            }
            self.graph.add_twin_edges(
                verts[0], dirs[0], overlap.coords[0],
                verts[1], dirs[1], overlap.coords[1],
                comp
            );
        } else {
            // A contained read can be traversed in either direction, so it
            // gets a twin pair per direction. The contain removal pass needs
            // both to determine transitivity.
            self.graph.add_twin_edges(
                verts[0], Dir::Sense, overlap.coords[0],
                verts[1], Dir::Sense, overlap.coords[1],
                comp
            );
            self.graph.add_twin_edges(
                verts[0], Dir::Antisense, overlap.coords[0],
                verts[1], Dir::Antisense, overlap.coords[1],
                comp
            );
            let contained = if overlap.coords[1].is_full() { verts[1] } else { verts[0] };
            self.graph.vertex_mut(contained).set_contained(true);
            self.graph.set_containment(true);
        }

        true
    }
}

//-----------------------------------------------------------------------------
