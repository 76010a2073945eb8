use super::*;

use crate::bigraph::{EdgeCreator, Vertex};
use crate::coord::SeqCoord;
use crate::overlap::Overlap;

//-----------------------------------------------------------------------------

// Test helpers.

fn add_read(graph: &mut Bigraph, id: &str, len: usize) -> VertexHandle {
    let seq: String = std::iter::repeat("ACGT").flat_map(|s| s.chars()).take(len).collect();
    graph.add_vertex(Vertex::new(id, &seq)).unwrap()
}

// Creates an overlap of the given length touching the right end of the first
// read and the left end of the second read.
fn connect(graph: &mut Bigraph, first: &str, second: &str, len: usize) {
    let first_len = graph.vertex(graph.get_vertex(first).unwrap()).seq().len();
    let second_len = graph.vertex(graph.get_vertex(second).unwrap()).seq().len();
    let overlap = Overlap::new(
        first, SeqCoord::new(first_len - len, first_len, first_len),
        second, SeqCoord::new(0, len, second_len),
        false
    );
    assert!(EdgeCreator::new(graph, 128).create(&overlap),
        "Failed to create the overlap {} -> {}", first, second);
}

//-----------------------------------------------------------------------------

#[test]
fn trim_removes_short_tips() {
    let mut graph = Bigraph::new();
    let center = add_read(&mut graph, "center", 60);
    add_read(&mut graph, "tip", 20);
    add_read(&mut graph, "long", 60);
    connect(&mut graph, "center", "tip", 10);
    connect(&mut graph, "long", "center", 10);

    let mut trim = TrimVisitor::new(50);
    let modified = apply(&mut graph, &mut trim);

    assert!(modified, "The pass should report a modification");
    assert_eq!(trim.terminals(), 1, "Wrong number of removed tips");
    assert_eq!(trim.islands(), 0, "No islands should be removed");
    assert!(graph.get_vertex("tip").is_none(), "The short tip should be gone");
    assert!(graph.get_vertex("long").is_some(), "The long tip should survive");
    assert_eq!(graph.degree(center), 1, "The center should lose one edge");
}

#[test]
fn trim_removes_short_islands() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "short", 20);
    add_read(&mut graph, "long", 60);

    let mut trim = TrimVisitor::new(50);
    apply(&mut graph, &mut trim);

    assert_eq!(trim.islands(), 1, "Wrong number of removed islands");
    assert!(graph.get_vertex("short").is_none(), "The short island should be gone");
    assert!(graph.get_vertex("long").is_some(), "The long island should survive");
}

//-----------------------------------------------------------------------------

// Builds the chimeric scenario: a short vertex on a single path between two
// branching neighbors. The overlap from `prev` to the candidate is 20 bases
// and the sibling overlap from `prev` is `sibling_len` bases.
fn chimeric_graph(sibling_len: usize) -> Bigraph {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "x", 30);
    add_read(&mut graph, "prev", 100);
    add_read(&mut graph, "next", 100);
    add_read(&mut graph, "other", 100);
    add_read(&mut graph, "tail", 100);
    connect(&mut graph, "prev", "x", 20);
    connect(&mut graph, "x", "next", 20);
    connect(&mut graph, "prev", "other", sibling_len);
    connect(&mut graph, "tail", "next", 25);
    graph
}

#[test]
fn chimeric_removes_confirmed_vertex() {
    let mut graph = chimeric_graph(40);
    let mut chimeric = ChimericVisitor::new(50, 10);
    let modified = apply(&mut graph, &mut chimeric);

    assert!(modified, "The pass should report a modification");
    assert_eq!(chimeric.chimeric(), 1, "Wrong number of removed vertices");
    assert!(graph.get_vertex("x").is_none(), "The chimeric vertex should be gone");
    assert_eq!(graph.vertex_count(), 4, "Only the chimeric vertex should be removed");
}

#[test]
fn chimeric_keeps_vertex_without_spread() {
    // The sibling overlaps are not longer by delta, so the vertex stays.
    let mut graph = chimeric_graph(25);
    let mut chimeric = ChimericVisitor::new(50, 10);
    let modified = apply(&mut graph, &mut chimeric);

    assert!(!modified, "The pass should not modify the graph");
    assert_eq!(chimeric.chimeric(), 0, "No vertices should be removed");
    assert!(graph.get_vertex("x").is_some(), "The vertex should survive");
}

#[test]
fn chimeric_keeps_long_vertex() {
    let mut graph = chimeric_graph(40);
    let mut chimeric = ChimericVisitor::new(20, 10);
    apply(&mut graph, &mut chimeric);
    assert!(graph.get_vertex("x").is_some(), "A long vertex should survive");
}

//-----------------------------------------------------------------------------

#[test]
fn contain_remove() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "outer", 60);
    add_read(&mut graph, "inner", 20);
    add_read(&mut graph, "partner", 60);
    connect(&mut graph, "outer", "partner", 10);
    let contained = Overlap::new(
        "outer", SeqCoord::new(0, 20, 60),
        "inner", SeqCoord::new(0, 20, 20),
        false
    );
    assert!(EdgeCreator::new(&mut graph, 128).create(&contained),
        "Failed to create the containment overlap");
    assert!(graph.containment(), "The containment flag should be raised");

    let mut contain_remove = ContainRemoveVisitor::new();
    let modified = apply(&mut graph, &mut contain_remove);

    assert!(modified, "The pass should report a modification");
    assert_eq!(contain_remove.contained(), 1, "Wrong number of removed vertices");
    assert!(graph.get_vertex("inner").is_none(), "The contained vertex should be gone");
    assert!(!graph.containment(), "The containment flag should be cleared");
    assert_eq!(graph.edge_count(), 2, "Only the dovetail overlap should remain");
}

//-----------------------------------------------------------------------------

#[test]
fn maximal_overlap_removes_dominated_edge() {
    let mut graph = Bigraph::new();
    let vertex = add_read(&mut graph, "v", 100);
    add_read(&mut graph, "w", 100);
    let short = add_read(&mut graph, "z", 100);
    add_read(&mut graph, "y", 100);
    connect(&mut graph, "v", "w", 50);
    connect(&mut graph, "v", "z", 10);
    connect(&mut graph, "y", "z", 40);

    let mut maximal = MaximalOverlapVisitor::new(20);
    let modified = apply(&mut graph, &mut maximal);

    assert!(modified, "The pass should report a modification");
    assert_eq!(maximal.dummies(), 1, "Wrong number of removed overlaps");
    assert_eq!(graph.degree(vertex), 1, "The dominated edge should be gone");
    assert_eq!(graph.degree(short), 1, "The twin should be gone as well");
    assert_eq!(graph.edge_count(), 4, "Two directed edges should be removed");
}

#[test]
fn maximal_overlap_keeps_close_lengths() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "v", 100);
    add_read(&mut graph, "w", 100);
    add_read(&mut graph, "z", 100);
    add_read(&mut graph, "y", 100);
    connect(&mut graph, "v", "w", 50);
    connect(&mut graph, "v", "z", 40);
    connect(&mut graph, "y", "z", 45);

    let mut maximal = MaximalOverlapVisitor::new(20);
    let modified = apply(&mut graph, &mut maximal);

    assert!(!modified, "The pass should not modify the graph");
    assert_eq!(graph.edge_count(), 6, "All overlaps should survive");
}

#[test]
#[should_panic]
fn maximal_overlap_requires_no_containments() {
    let mut graph = Bigraph::new();
    graph.set_containment(true);
    let mut maximal = MaximalOverlapVisitor::new(20);
    apply(&mut graph, &mut maximal);
}

//-----------------------------------------------------------------------------

#[test]
fn statistics_counters() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "island", 60);
    add_read(&mut graph, "branch", 100);
    add_read(&mut graph, "first", 100);
    add_read(&mut graph, "second", 100);
    add_read(&mut graph, "chain", 100);
    connect(&mut graph, "branch", "first", 20);
    connect(&mut graph, "branch", "second", 30);
    connect(&mut graph, "chain", "branch", 25);

    let mut statistics = StatisticsVisitor::new();
    let modified = apply(&mut graph, &mut statistics);

    assert!(!modified, "A read-only pass should not report modifications");
    assert_eq!(statistics.vertices(), 5, "Wrong vertex count");
    assert_eq!(statistics.islands(), 1, "Wrong island count");
    assert_eq!(statistics.terminals(), 3, "Wrong tip count");
    assert_eq!(statistics.monobranches(), 1, "Wrong monobranch count");
    assert_eq!(statistics.dibranches(), 0, "Wrong dibranch count");
    assert_eq!(statistics.simple(), 4, "Wrong simple count");

    // Every overlap is counted from both of its endpoints.
    assert_eq!(statistics.edges(), graph.edge_count(), "Wrong doubled edge count");
    assert_eq!(statistics.edges() % 2, 0, "The doubled edge count should be even");
}

//-----------------------------------------------------------------------------

#[test]
fn fasta_output() {
    let mut graph = Bigraph::new();
    graph.add_vertex(Vertex::new("unitig1", "ACGT")).unwrap();
    graph.add_vertex(Vertex::new("unitig2", "GATTACA")).unwrap();

    let mut buffer: Vec<u8> = Vec::new();
    let mut fasta = FastaVisitor::new(&mut buffer);
    apply(&mut graph, &mut fasta);
    fasta.into_result().unwrap();

    assert_eq!(buffer, b">unitig1\nACGT\n>unitig2\nGATTACA\n", "Wrong FASTA output");
}

//-----------------------------------------------------------------------------
