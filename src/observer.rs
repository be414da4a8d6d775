//
// Hashiwokakero solver
//
// Copyright 2021 Simon Frankau
//

//! Hooks for watching the search, kept out of the solving logic.
//!
//! The solver calls an observer at each search node, each speculative
//! move, each abandoned branch, and at the start and end of a solve.
//! [`NoOpObserver`] is the default; [`TraceObserver`] writes the
//! human-readable trace behind the `--debug` flag.

use std::fmt;
use std::io::{self, Write};

use crate::board::Board;
use crate::parser::display_board;
use crate::propagate::PropagationFailure;
use crate::search::Trial;
use crate::stats::SearchStatistics;

pub trait SearchObserver {
    /// Called once, with the board as parsed.
    fn on_enter_search(&mut self, _board: &Board) {}
    /// Called at each search node, once propagation has run.
    fn on_node(&mut self, _board: &Board, _depth: usize, _statistics: &SearchStatistics) {}
    /// Called before a speculative move is explored.
    fn on_trial(&mut self, _trial: &Trial, _depth: usize) {}
    /// Called when a branch is abandoned.
    fn on_backtrack(&mut self, _failure: &PropagationFailure, _depth: usize) {}
    fn on_solution(&mut self, _board: &Board, _statistics: &SearchStatistics) {}
    fn on_exit_search(&mut self, _statistics: &SearchStatistics) {}
}

impl<O: SearchObserver + ?Sized> SearchObserver for &mut O {
    fn on_enter_search(&mut self, board: &Board) {
        (**self).on_enter_search(board)
    }

    fn on_node(&mut self, board: &Board, depth: usize, statistics: &SearchStatistics) {
        (**self).on_node(board, depth, statistics)
    }

    fn on_trial(&mut self, trial: &Trial, depth: usize) {
        (**self).on_trial(trial, depth)
    }

    fn on_backtrack(&mut self, failure: &PropagationFailure, depth: usize) {
        (**self).on_backtrack(failure, depth)
    }

    fn on_solution(&mut self, board: &Board, statistics: &SearchStatistics) {
        (**self).on_solution(board, statistics)
    }

    fn on_exit_search(&mut self, statistics: &SearchStatistics) {
        (**self).on_exit_search(statistics)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NoOpObserver;

impl SearchObserver for NoOpObserver {}

/// Writes a readable account of the search to `out`.
///
/// The first write error stops all further output and is handed back by
/// [`TraceObserver::finish`].
#[derive(Debug)]
pub struct TraceObserver<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TraceObserver<W> {
    pub fn new(out: W) -> TraceObserver<W> {
        TraceObserver { out, error: None }
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_none() {
            if let Err(e) = self.out.write_fmt(args) {
                self.error = Some(e);
            }
        }
    }

    fn emit_board(&mut self, board: &Board) {
        for line in display_board(board).lines() {
            self.emit(format_args!("    |{}|\n", line));
        }
    }

    /// Flushes the trace and returns the writer, or the first error hit.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> SearchObserver for TraceObserver<W> {
    fn on_enter_search(&mut self, board: &Board) {
        self.emit(format_args!(
            "Board size: {}x{}, {} islands, {} bridges required\n",
            board.height(),
            board.width(),
            board.islands().len(),
            board.required_bridges()
        ));
    }

    fn on_node(&mut self, board: &Board, depth: usize, statistics: &SearchStatistics) {
        self.emit(format_args!(
            "Node {} (depth {}): {}/{} bridges placed\n",
            statistics.nodes_explored,
            depth,
            board.built_bridges(),
            board.required_bridges()
        ));
        self.emit_board(board);
    }

    fn on_trial(&mut self, trial: &Trial, depth: usize) {
        self.emit(format_args!("Depth {}: trying {}\n", depth, trial));
    }

    fn on_backtrack(&mut self, failure: &PropagationFailure, depth: usize) {
        self.emit(format_args!("Depth {}: abandoned, {}\n", depth, failure));
    }

    fn on_solution(&mut self, board: &Board, statistics: &SearchStatistics) {
        self.emit(format_args!(
            "Solution complete: {}/{} bridges placed after {} nodes\n",
            board.built_bridges(),
            board.required_bridges(),
            statistics.nodes_explored
        ));
    }

    fn on_exit_search(&mut self, statistics: &SearchStatistics) {
        self.emit(format_args!("Search finished: {}\n", statistics));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::read_board;
    use crate::search::Solver;

    #[derive(Debug)]
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_trace_records_search() {
        let b = read_board(["2.2", "...", "2.2"].iter().copied()).unwrap();
        let mut trace = TraceObserver::new(Vec::new());
        let result = Solver::new().with_observer(&mut trace).solve(&b);
        assert!(result.is_ok());

        let output = String::from_utf8(trace.finish().unwrap()).unwrap();
        assert!(output.starts_with("Board size: 3x3, 4 islands, 4 bridges required\n"));
        assert!(output.contains("Node 1 (depth 0): 0/4 bridges placed"));
        assert!(output.contains("trying single bridge south from (0, 0)"));
        assert!(output.contains("abandoned"));
        assert!(output.contains("    |2-2|\n    || ||\n    |2-2|\n"));
        assert!(output.contains("Solution complete: 4/4 bridges placed"));
        assert!(output.contains("Search finished: "));
    }

    #[test]
    fn test_trace_keeps_write_errors() {
        let b = read_board(["1.1"].iter().copied()).unwrap();
        let mut trace = TraceObserver::new(BrokenPipe);
        let result = Solver::new().with_observer(&mut trace).solve(&b);
        assert!(result.is_ok());

        let error = trace.finish().unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_no_op_observer_is_default() {
        let b = read_board(["1.1"].iter().copied()).unwrap();
        let mut solver = Solver::new().with_observer(NoOpObserver);
        assert!(solver.solve(&b).is_ok());
    }
}
