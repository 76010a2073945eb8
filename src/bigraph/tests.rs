use super::*;

use crate::sequence;

//-----------------------------------------------------------------------------

// Test helpers.

fn add_read(graph: &mut Bigraph, id: &str, seq: &str) -> VertexHandle {
    graph.add_vertex(Vertex::new(id, seq)).unwrap()
}

// Creates a suffix-prefix overlap of the given length between two reads in
// the same orientation.
fn dovetail(graph: &mut Bigraph, first: &str, second: &str, len: usize) -> bool {
    let first_len = graph.vertex(graph.get_vertex(first).unwrap()).seq().len();
    let second_len = graph.vertex(graph.get_vertex(second).unwrap()).seq().len();
    let overlap = Overlap::new(
        first, SeqCoord::new(first_len - len, first_len, first_len),
        second, SeqCoord::new(0, len, second_len),
        false
    );
    EdgeCreator::new(graph, 128).create(&overlap)
}

// Checks that the graph is twin-consistent: every edge has a reciprocal twin
// on the vertex it points to, with a matched interval of the same length.
fn check_twins(graph: &Bigraph) {
    for handle in graph.edge_handles() {
        let edge = graph.edge(handle);
        let twin = graph.edge(edge.twin());
        assert_eq!(twin.twin(), handle, "The twin of the twin is not the edge itself");
        assert_eq!(twin.start(), edge.end(), "The twin does not start from the far end");
        assert_eq!(twin.end(), edge.start(), "The twin does not point back to the start");
        assert_eq!(twin.coord().len(), edge.coord().len(), "Twin interval lengths differ");
        assert_eq!(twin.comp(), edge.comp(), "Twin orientations differ");
        assert!(graph.edges_of(edge.start()).contains(&handle),
            "The edge is not on the edge list of its start vertex");
    }
    for vertex in graph.vertex_handles() {
        for &edge in graph.edges_of(vertex) {
            assert!(graph.has_edge(edge), "A vertex refers to a freed edge");
            assert_eq!(graph.edge(edge).start(), vertex, "An edge is on the wrong vertex");
        }
    }
}

//-----------------------------------------------------------------------------

#[test]
fn linear_chain_merge() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "a", "ACGT");
    add_read(&mut graph, "b", "GTAC");
    add_read(&mut graph, "c", "ACCC");
    assert!(dovetail(&mut graph, "a", "b", 2), "Failed to create the first overlap");
    assert!(dovetail(&mut graph, "b", "c", 2), "Failed to create the second overlap");
    check_twins(&graph);

    graph.simplify();

    assert_eq!(graph.vertex_count(), 1, "A linear chain should merge into one vertex");
    assert_eq!(graph.edge_count(), 0, "The merged vertex should have no edges");
    let unitig = graph.get_vertex("a").unwrap();
    assert_eq!(graph.vertex(unitig).seq(), "ACGTACCC", "Wrong merged sequence");
    check_twins(&graph);
}

#[test]
fn self_loop_is_not_merged() {
    let mut graph = Bigraph::new();
    let vertex = add_read(&mut graph, "a", "ACGTACGT");
    graph.add_twin_edges(
        vertex, Dir::Sense, SeqCoord::new(4, 8, 8),
        vertex, Dir::Antisense, SeqCoord::new(0, 4, 8),
        Comp::Same
    );
    check_twins(&graph);

    graph.simplify();

    assert_eq!(graph.vertex_count(), 1, "A self-loop vertex should survive simplification");
    assert_eq!(graph.edge_count(), 2, "The self-loop should survive simplification");
    assert_eq!(graph.vertex(vertex).seq(), "ACGTACGT", "The sequence should be unchanged");
}

#[test]
fn merge_antisense_prepends() {
    // The suffix of b matches the prefix of a, so b extends a to the left.
    let mut graph = Bigraph::new();
    let first = add_read(&mut graph, "a", "GGTT");
    add_read(&mut graph, "b", "AAGG");
    assert!(dovetail(&mut graph, "b", "a", 2), "Failed to create the overlap");

    let antisense = graph.edges_in_dir(first, Dir::Antisense);
    assert_eq!(antisense.len(), 1, "The extended vertex should have one antisense edge");
    graph.merge(first, antisense[0]);
    graph.sweep_vertices(Color::Black);

    assert_eq!(graph.vertex_count(), 1, "The far end should be merged away");
    assert_eq!(graph.vertex(first).seq(), "AAGGTT", "Wrong left extension");
    check_twins(&graph);
}

#[test]
fn merge_reverse_complement() {
    // The suffix of a matches the suffix of b reverse-complemented.
    let mut graph = Bigraph::new();
    let first = add_read(&mut graph, "a", "ACGG");
    add_read(&mut graph, "b", "TTCC");
    let overlap = Overlap::new(
        "a", SeqCoord::new(2, 4, 4),
        "b", SeqCoord::new(2, 4, 4),
        true
    );
    assert!(EdgeCreator::new(&mut graph, 128).create(&overlap), "Failed to create the overlap");

    let sense = graph.edges_in_dir(first, Dir::Sense);
    assert_eq!(sense.len(), 1, "The extended vertex should have one sense edge");
    graph.merge(first, sense[0]);
    graph.sweep_vertices(Color::Black);

    assert_eq!(graph.vertex_count(), 1, "The far end should be merged away");
    assert_eq!(graph.vertex(first).seq(), "ACGGAA", "Wrong reverse-complemented extension");
}

#[test]
fn simplify_mixed_orientation() {
    // A three-read chain where the middle read is reverse-complemented.
    let mut graph = Bigraph::new();
    add_read(&mut graph, "a", "ACGG");
    add_read(&mut graph, "b", "TTCC");
    add_read(&mut graph, "c", "CCTT");
    let first = Overlap::new(
        "a", SeqCoord::new(2, 4, 4),
        "b", SeqCoord::new(2, 4, 4),
        true
    );
    let second = Overlap::new(
        "b", SeqCoord::new(0, 2, 4),
        "c", SeqCoord::new(2, 4, 4),
        false
    );
    assert!(EdgeCreator::new(&mut graph, 128).create(&first), "Failed to create the first overlap");
    assert!(EdgeCreator::new(&mut graph, 128).create(&second), "Failed to create the second overlap");
    check_twins(&graph);

    graph.simplify();

    assert_eq!(graph.vertex_count(), 1, "The chain should merge into one vertex");
    assert_eq!(graph.edge_count(), 0, "The merged vertex should have no edges");
    let unitig = graph.vertex(graph.vertex_handles()[0]).seq().to_string();
    let expected = "ACGGAAGG";
    assert!(unitig == expected || unitig == sequence::reverse_complement(expected),
        "Wrong merged sequence: {}", unitig);
    check_twins(&graph);
}

#[test]
fn simplify_is_idempotent() {
    // A chain into a branching vertex: the chain merges, the branch remains.
    let mut graph = Bigraph::new();
    add_read(&mut graph, "d", "TTAA");
    add_read(&mut graph, "a", "AACC");
    add_read(&mut graph, "b", "CCGG");
    add_read(&mut graph, "c", "ACCT");
    assert!(dovetail(&mut graph, "d", "a", 2), "Failed to create the chain overlap");
    assert!(dovetail(&mut graph, "a", "b", 2), "Failed to create the first branch");
    assert!(dovetail(&mut graph, "a", "c", 3), "Failed to create the second branch");

    graph.simplify();
    check_twins(&graph);
    let vertices = graph.vertex_count();
    let edges = graph.edge_count();
    let mut seqs: Vec<String> = graph.vertex_handles().iter()
        .map(|&v| graph.vertex(v).seq().to_string())
        .collect();
    seqs.sort();

    graph.simplify();
    check_twins(&graph);
    assert_eq!(graph.vertex_count(), vertices, "The second pass changed the vertex count");
    assert_eq!(graph.edge_count(), edges, "The second pass changed the edge count");
    let mut again: Vec<String> = graph.vertex_handles().iter()
        .map(|&v| graph.vertex(v).seq().to_string())
        .collect();
    again.sort();
    assert_eq!(again, seqs, "The second pass changed the sequences");
}

//-----------------------------------------------------------------------------

#[test]
fn edge_creator_rejects_internal_match() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "a", "ACGTACGTAC");
    add_read(&mut graph, "b", "CGTAACGTAC");
    // The interval on the first read reaches neither end.
    let overlap = Overlap::new(
        "a", SeqCoord::new(2, 6, 10),
        "b", SeqCoord::new(0, 4, 10),
        false
    );
    assert!(!EdgeCreator::new(&mut graph, 128).create(&overlap),
        "An internal match should be rejected");
    assert_eq!(graph.edge_count(), 0, "No edges should be added");
}

#[test]
fn edge_creator_skips_unknown_reads() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "a", "ACGTACGTAC");
    let overlap = Overlap::new(
        "a", SeqCoord::new(6, 10, 10),
        "missing", SeqCoord::new(0, 4, 10),
        false
    );
    assert!(!EdgeCreator::new(&mut graph, 128).create(&overlap),
        "An overlap with a missing read should be skipped");
    assert_eq!(graph.edge_count(), 0, "No edges should be added");
}

#[test]
fn edge_creator_degree_cap() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "a", "AAAACCCC");
    add_read(&mut graph, "b", "CCCCGGGG");
    add_read(&mut graph, "c", "CCCCTTTT");
    add_read(&mut graph, "d", "CCCCAAAA");

    let mut creator = EdgeCreator::new(&mut graph, 1);
    for partner in ["b", "c", "d"] {
        let overlap = Overlap::new(
            "a", SeqCoord::new(4, 8, 8),
            partner, SeqCoord::new(0, 4, 8),
            false
        );
        creator.create(&overlap);
    }

    // The third overlap finds the first read over the cap.
    assert_eq!(graph.degree(graph.get_vertex("a").unwrap()), 2, "Wrong degree after the cap");
    assert_eq!(graph.edge_count(), 4, "The overlap over the cap should be dropped");
}

#[test]
fn edge_creator_containment() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "a", "ACGTACGT");
    add_read(&mut graph, "b", "ACGT");
    let overlap = Overlap::new(
        "a", SeqCoord::new(0, 4, 8),
        "b", SeqCoord::new(0, 4, 4),
        false
    );
    assert!(EdgeCreator::new(&mut graph, 128).create(&overlap),
        "Failed to create a containment overlap");

    let outer = graph.get_vertex("a").unwrap();
    let inner = graph.get_vertex("b").unwrap();
    assert_eq!(graph.edge_count(), 4, "A containment should create two twin pairs");
    assert_eq!(graph.degree_in_dir(outer, Dir::Sense), 1, "Wrong sense degree");
    assert_eq!(graph.degree_in_dir(outer, Dir::Antisense), 1, "Wrong antisense degree");
    assert!(graph.vertex(inner).contained(), "The covered read should be flagged");
    assert!(!graph.vertex(outer).contained(), "The covering read should not be flagged");
    assert!(graph.containment(), "The graph containment flag should be raised");
    check_twins(&graph);
}

//-----------------------------------------------------------------------------

#[test]
fn twin_consistency_after_mutations() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "a", "TTAACC");
    add_read(&mut graph, "b", "CCGGTT");
    add_read(&mut graph, "c", "TTACGT");
    add_read(&mut graph, "d", "ACGT");
    assert!(dovetail(&mut graph, "a", "b", 2), "Failed to create the first overlap");
    assert!(dovetail(&mut graph, "b", "c", 2), "Failed to create the second overlap");
    let contained = Overlap::new(
        "c", SeqCoord::new(2, 6, 6),
        "d", SeqCoord::new(0, 4, 4),
        false
    );
    assert!(EdgeCreator::new(&mut graph, 128).create(&contained),
        "Failed to create the containment overlap");
    check_twins(&graph);

    // Remove one edge pair.
    let vertex = graph.get_vertex("d").unwrap();
    let edge = graph.edges_of(vertex)[0];
    graph.remove_edge_pair(edge);
    check_twins(&graph);

    // Sweep a vertex with its remaining edges.
    graph.vertex_mut(vertex).set_color(Color::Black);
    graph.sweep_vertices(Color::Black);
    assert!(graph.get_vertex("d").is_none(), "The swept vertex should be gone");
    check_twins(&graph);

    // Merge the remaining chain.
    graph.simplify();
    assert_eq!(graph.vertex_count(), 1, "The remaining chain should merge");
    check_twins(&graph);
}

#[test]
fn sweep_edges_removes_twins() {
    let mut graph = Bigraph::new();
    add_read(&mut graph, "a", "TTAACC");
    add_read(&mut graph, "b", "CCGGTT");
    add_read(&mut graph, "c", "TTACGT");
    assert!(dovetail(&mut graph, "a", "b", 2), "Failed to create the first overlap");
    assert!(dovetail(&mut graph, "b", "c", 2), "Failed to create the second overlap");

    // Color only one side of the first pair; the sweep must remove both.
    let vertex = graph.get_vertex("a").unwrap();
    let edge = graph.edges_of(vertex)[0];
    graph.edge_mut(edge).set_color(Color::Black);
    graph.sweep_edges(Color::Black);

    assert_eq!(graph.edge_count(), 2, "Only the colored pair should be removed");
    assert_eq!(graph.degree(vertex), 0, "The start vertex should lose the edge");
    check_twins(&graph);
}

//-----------------------------------------------------------------------------

#[test]
fn edge_labels() {
    let mut graph = Bigraph::new();
    let first = add_read(&mut graph, "a", "ACGT");
    add_read(&mut graph, "b", "GTAC");
    assert!(dovetail(&mut graph, "a", "b", 2), "Failed to create the overlap");

    let edge = graph.edges_of(first)[0];
    assert_eq!(graph.edge_label(edge), "AC", "Wrong label for the forward edge");
    let twin = graph.edge(edge).twin();
    assert_eq!(graph.edge_label(twin), "AC", "Wrong label for the twin edge");
}

//-----------------------------------------------------------------------------
