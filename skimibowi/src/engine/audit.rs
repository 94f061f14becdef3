//! Static ordering audit of a feature table.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use super::table::FeatureEntry;
use crate::core::SkimibowiError;

/// Why one entry has to run before another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dependency {
    Part(&'static str),
    Net(&'static str),
    /// Optional reference to whatever the earlier entry declares.
    Follows,
}

/// Graph of table entries with an edge from every provider to each of its
/// consumers. Fails if a requirement has no provider or a name is provided
/// twice.
pub fn dependency_graph(
    table: &[FeatureEntry],
) -> Result<DiGraph<&'static str, Dependency>, SkimibowiError> {
    let mut graph = DiGraph::new();
    let mut nodes: HashMap<&'static str, NodeIndex> = HashMap::new();
    for entry in table {
        if nodes.insert(entry.name, graph.add_node(entry.name)).is_some() {
            return Err(violation(entry.name, "appears twice in the table".to_string()));
        }
    }

    let mut part_owner: HashMap<&'static str, &'static str> = HashMap::new();
    let mut net_owner: HashMap<&'static str, &'static str> = HashMap::new();
    for entry in table {
        for &part in entry.provides.parts {
            if let Some(other) = part_owner.insert(part, entry.name) {
                return Err(violation(entry.name, format!("part {part} is also provided by {other}")));
            }
        }
        for &net in entry.provides.nets {
            if let Some(other) = net_owner.insert(net, entry.name) {
                return Err(violation(entry.name, format!("net {net} is also provided by {other}")));
            }
        }
    }

    for entry in table {
        let consumer = nodes[entry.name];
        for &part in entry.requires.parts {
            let provider = part_owner
                .get(part)
                .ok_or_else(|| violation(entry.name, format!("requires part {part} that nothing provides")))?;
            graph.add_edge(nodes[provider], consumer, Dependency::Part(part));
        }
        for &net in entry.requires.nets {
            let provider = net_owner
                .get(net)
                .ok_or_else(|| violation(entry.name, format!("requires net {net} that nothing provides")))?;
            graph.add_edge(nodes[provider], consumer, Dependency::Net(net));
        }
        for earlier in entry.follows {
            let provider = nodes
                .get(earlier)
                .ok_or_else(|| violation(entry.name, format!("follows unknown entry {earlier}")))?;
            graph.add_edge(*provider, consumer, Dependency::Follows);
        }
    }

    Ok(graph)
}

/// Check that the table order is a valid evaluation order.
pub fn audit(table: &[FeatureEntry]) -> Result<(), SkimibowiError> {
    let graph = dependency_graph(table)?;

    if let Err(cycle) = toposort(&graph, None) {
        let name = graph[cycle.node_id()];
        return Err(violation(name, "is part of a dependency cycle".to_string()));
    }

    // Node indices follow table positions, so every edge must point forward.
    for edge in graph.raw_edges() {
        if edge.source().index() >= edge.target().index() {
            let consumer = graph[edge.target()];
            let provider = graph[edge.source()];
            let what = match edge.weight {
                Dependency::Part(part) => format!("part {part}"),
                Dependency::Net(net) => format!("net {net}"),
                Dependency::Follows => "its output".to_string(),
            };
            return Err(violation(
                consumer,
                format!("needs {what} from {provider}, which runs later"),
            ));
        }
    }

    tracing::debug!("Feature table audit passed ({} entries)", table.len());
    Ok(())
}

fn violation(entry: &str, detail: String) -> SkimibowiError {
    SkimibowiError::InternalConsistency {
        fragment: entry.to_string(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::table::builtin;

    #[test]
    fn test_builtin_table_passes() {
        audit(&builtin()).expect("built-in table must be correctly ordered");
    }

    #[test]
    fn test_consumer_before_provider_rejected() {
        let mut table = builtin();
        let pos = table.iter().position(|e| e.name == "ds18b20").unwrap();
        let sensor = table.remove(pos);
        table.insert(1, sensor);
        let err = audit(&table).unwrap_err();
        assert!(matches!(
            err,
            SkimibowiError::InternalConsistency { ref fragment, ref detail }
                if fragment == "ds18b20" && detail.contains("DQ")
        ));
    }

    #[test]
    fn test_board_must_be_after_followed_entries() {
        let mut table = builtin();
        let board = table.pop().unwrap();
        table.insert(2, board);
        assert!(audit(&table).is_err());
    }

    #[test]
    fn test_missing_provider_rejected() {
        let table: Vec<FeatureEntry> = builtin()
            .into_iter()
            .filter(|e| e.name != "onewire_bus")
            .collect();
        assert!(dependency_graph(&table).is_err());
    }

    #[test]
    fn test_graph_edges() {
        let graph = dependency_graph(&builtin()).unwrap();
        let edges: Vec<_> = graph
            .raw_edges()
            .iter()
            .map(|e| (graph[e.source()], graph[e.target()], e.weight))
            .collect();
        assert!(edges.contains(&("usb_serial", "auto_reset", Dependency::Net("DTR"))));
        assert!(edges.contains(&("regulator", "power_path", Dependency::Follows)));
    }
}
