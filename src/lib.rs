//
// Hashiwokakero solver
//
// Copyright 2021 Simon Frankau
//

//! Hashiwokakero ("bridges") puzzle solver.
//!
//! A puzzle is read into a [`Board`], solved by constraint propagation
//! with speculative backtracking when propagation gets stuck, and printed
//! back out with the bridges drawn in.

pub mod board;
pub mod connectivity;
pub mod observer;
pub mod parser;
pub mod propagate;
pub mod search;
pub mod stats;

use std::io::{stderr, BufRead, BufReader, Read};

use anyhow::Result;

pub use board::{Board, Cell, Direction, Island, IslandId};
pub use observer::{NoOpObserver, SearchObserver, TraceObserver};
pub use parser::{display_board, read_board};
pub use search::{SolveError, Solver, DEFAULT_MAX_ATTEMPTS};

/// Reads a puzzle from `input` and solves it. With `debug` set, a trace
/// of the search is written to stderr.
pub fn solve<R: Read>(input: R, debug: bool) -> Result<Board> {
    solve_with_max_attempts(input, debug, DEFAULT_MAX_ATTEMPTS)
}

/// As [`solve`], giving up with [`SolveError::AttemptLimit`] after
/// `max_attempts` search nodes.
pub fn solve_with_max_attempts<R: Read>(
    input: R,
    debug: bool,
    max_attempts: usize,
) -> Result<Board> {
    let lines = BufReader::new(input)
        .lines()
        .collect::<Result<Vec<_>, _>>()?;
    let board = read_board(lines.iter().map(String::as_str))?;

    let mut solver = Solver::new().with_max_attempts(max_attempts);
    if !debug {
        return Ok(solver.solve(&board)?);
    }

    let mut trace = TraceObserver::new(stderr());
    let result = solver.with_observer(&mut trace).solve(&board);
    trace.finish()?;
    Ok(result?)
}
