//
// Hashiwokakero solver
//
// Copyright 2021 Simon Frankau
//

use std::fmt;

/// Counters collected over one call to [`Solver::solve`](crate::search::Solver::solve).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchStatistics {
    /// Search nodes entered, including the root. This is what the
    /// attempt limit counts.
    pub nodes_explored: usize,
    /// Speculative moves tried.
    pub trials: usize,
    /// Branches abandoned after propagation found them impossible.
    pub backtracks: usize,
    /// Propagation passes over the whole board, summed over all nodes.
    pub propagation_passes: usize,
    /// Deepest level of speculation reached.
    pub max_depth: usize,
}

impl SearchStatistics {
    pub fn on_node_explored(&mut self, depth: usize) {
        self.nodes_explored += 1;
        self.max_depth = self.max_depth.max(depth);
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} trials, {} backtracks, {} propagation passes, max depth {}",
            self.nodes_explored,
            self.trials,
            self.backtracks,
            self.propagation_passes,
            self.max_depth
        )
    }
}
