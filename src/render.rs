// src/render.rs
//! Graphviz export of the follow graph. Layout is left to `dot`.

use std::fmt::Write;

use crate::store::RelationshipStore;

/// Renders every registered user as a node and every follow as an edge.
#[must_use]
pub fn to_dot(store: &RelationshipStore) -> String {
    let mut out = String::new();
    out.push_str("digraph follownet {\n");
    out.push_str("  node [shape=ellipse, style=filled, fillcolor=\"skyblue\", fontname=\"Arial Bold\"];\n");
    out.push_str("  edge [arrowsize=0.8];\n\n");

    // Isolated users still get a node.
    for user in store.users() {
        let _ = writeln!(out, "  {};", quote(user));
    }

    let edges = store.edges();
    if !edges.is_empty() {
        out.push('\n');
    }
    for edge in &edges {
        let _ = writeln!(out, "  {} -> {};", quote(&edge.follower), quote(&edge.followed));
    }

    out.push_str("}\n");
    out
}

fn quote(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_isolated_nodes_and_edges() {
        let mut store = RelationshipStore::in_memory(["Ama", "Bo", "Siaw"]).unwrap();
        store.follow("Bo", "Ama").unwrap();
        let dot = to_dot(&store);

        assert!(dot.starts_with("digraph follownet {"));
        assert!(dot.contains("  \"Siaw\";\n"));
        assert!(dot.contains("  \"Bo\" -> \"Ama\";\n"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
