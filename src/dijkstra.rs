use fnv::FnvHashMap;
use log::trace;

use crate::graph::{Graph, NodeIdx};
use crate::heap::MinHeap;
use crate::runways::Targets;

/// Outcome of a bounded multi-target search.
#[derive(Clone, Debug, PartialEq)]
pub struct Search<'a> {
    /// Cheapest target reached and its cost in meters from the start node.
    pub best: Option<(NodeIdx, &'a str, f64)>,
    /// Heap pops performed.
    pub pops: usize,
    /// True if the search stopped on the pop bound rather than running out of work.
    pub exhausted: bool,
}

/// Dijkstra from `start` to the cheapest node in `targets`, giving up after
/// `max_ops` heap pops with whatever it has found by then.
pub fn nearest_target<'a>(
    graph: &Graph,
    start: NodeIdx,
    targets: &Targets<'a>,
    max_ops: usize,
) -> Search<'a> {
    let mut dist: FnvHashMap<NodeIdx, f64> = FnvHashMap::default();
    let mut heap = MinHeap::new();
    let mut best: Option<(NodeIdx, &'a str, f64)> = None;
    let mut best_cost = f64::INFINITY;
    let mut pops = 0;

    dist.insert(start, 0.0);
    heap.push(start, 0.0);

    while pops < max_ops {
        let Some((node, cost)) = heap.pop() else {
            break;
        };
        pops += 1;

        if cost > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
            continue;
        }
        if cost > best_cost {
            continue;
        }

        if let Some(des) = targets.designator(node) {
            if cost < best_cost {
                best_cost = cost;
                best = Some((node, des, cost));
            }
            // Pops are non-decreasing in cost, so no later target can be cheaper.
            break;
        }

        for &(next, w) in &graph.node(node).edges {
            let next_cost = cost + w;
            if next_cost < dist.get(&next).copied().unwrap_or(f64::INFINITY) {
                dist.insert(next, next_cost);
                heap.push(next, next_cost);
            }
        }
    }

    let exhausted = best.is_none() && pops >= max_ops && !heap.is_empty();
    if exhausted {
        trace!("search from node {} hit the {} pop bound", start, max_ops);
    }
    Search {
        best,
        pops,
        exhausted,
    }
}
