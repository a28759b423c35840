use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::graph::NodeIdx;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub cost: OrderedFloat<f64>,
    pub node: NodeIdx,
}

impl State {
    pub fn new(node: NodeIdx, cost: f64) -> Self {
        Self {
            cost: OrderedFloat(cost),
            node,
        }
    }
}

// Min-heap by cost
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse ordering for min-heap, then lower node first on ties
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Binary min-heap of search states keyed by cumulative cost.
#[derive(Debug, Default)]
pub struct MinHeap {
    heap: BinaryHeap<State>,
}

impl MinHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeIdx, cost: f64) {
        self.heap.push(State::new(node, cost));
    }

    pub fn pop(&mut self) -> Option<(NodeIdx, f64)> {
        self.heap.pop().map(|s| (s.node, s.cost.into_inner()))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
