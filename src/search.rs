//
// Hashiwokakero solver
//
// Copyright 2021 Simon Frankau
//

//! Speculative search for when propagation gets stuck.
//!
//! Each node of the search runs propagation to a fixpoint. If that
//! doesn't solve the board, the most constrained island is picked and
//! each move open to it is tried on a clone of the board, recursing
//! until one branch solves the puzzle. A failed branch simply drops its
//! clone, so there is nothing to undo.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use thiserror::Error;

use crate::board::{Board, Direction, IslandId, MAX_BRIDGES};
use crate::observer::{NoOpObserver, SearchObserver};
use crate::propagate::{propagate, PropagationFailure};
use crate::stats::SearchStatistics;

/// Search nodes allowed before giving up, unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: usize = 100_000;

#[derive(Debug, Eq, Error, PartialEq)]
pub enum SolveError {
    // Every possibility was ruled out.
    #[error("No solutions found")]
    NoSolution,
    // Distinct from NoSolution: the puzzle may still be solvable.
    #[error("Search abandoned after {0} attempts without finding a solution")]
    AttemptLimit(usize),
    #[error("Search cancelled")]
    Cancelled,
}

/// A speculative move.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Move {
    Single,
    Double,
    Block,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Trial {
    pub island: IslandId,
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub kind: Move,
}

impl Trial {
    fn new(board: &Board, island: IslandId, direction: Direction, kind: Move) -> Trial {
        let (row, col) = board.island(island).position();
        Trial {
            island,
            row,
            col,
            direction,
            kind,
        }
    }

    fn apply(&self, board: &mut Board) {
        match self.kind {
            Move::Single => board.connect(self.island, self.direction, 1),
            Move::Double => board.connect(self.island, self.direction, 2),
            Move::Block => board.block(self.island, self.direction),
        }
    }
}

impl fmt::Display for Trial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            Move::Single => "single bridge",
            Move::Double => "double bridge",
            Move::Block => "blocking",
        };
        write!(f, "{} {} from ({}, {})", what, self.direction, self.row, self.col)
    }
}

/// Picks the unsatisfied island that is most under-supplied and has the
/// fewest ways out. Ties go to the first island in scan order.
pub fn choose_candidate(board: &Board) -> Option<IslandId> {
    let mut best: Option<(usize, IslandId)> = None;
    for (id, isle) in board.islands().iter().enumerate() {
        if isle.is_satisfied() {
            continue;
        }
        let open = isle.unblocked_directions().len();
        if open == 0 {
            continue;
        }
        let score = isle.remaining() * 10 + (4 - open);
        if best.map_or(true, |(best_score, _)| score > best_score) {
            best = Some((score, id));
        }
    }
    best.map(|(_, id)| id)
}

/// Solves boards by propagation plus backtracking.
pub struct Solver<'a> {
    max_attempts: usize,
    stop_flag: Option<&'a AtomicBool>,
    observer: Box<dyn SearchObserver + 'a>,
    statistics: SearchStatistics,
}

impl<'a> Default for Solver<'a> {
    fn default() -> Self {
        Solver::new()
    }
}

impl<'a> Solver<'a> {
    pub fn new() -> Solver<'a> {
        Solver {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            stop_flag: None,
            observer: Box::new(NoOpObserver),
            statistics: SearchStatistics::default(),
        }
    }

    /// Caps the number of search nodes; going past it fails with
    /// [`SolveError::AttemptLimit`].
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// The search stops with [`SolveError::Cancelled`] at the next node
    /// once this flag is set.
    pub fn with_stop_flag(mut self, stop_flag: &'a AtomicBool) -> Self {
        self.stop_flag = Some(stop_flag);
        self
    }

    pub fn with_observer<O: SearchObserver + 'a>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Counters from the most recent solve.
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Finds a solution to `board`, leaving `board` itself untouched.
    pub fn solve(&mut self, board: &Board) -> Result<Board, SolveError> {
        self.statistics = SearchStatistics::default();
        self.observer.on_enter_search(board);

        // Every wire has two ends.
        let total_capacity: usize = board.islands().iter().map(|isle| isle.capacity()).sum();
        let result = if total_capacity % 2 == 1 {
            debug!("Total capacity {} is odd", total_capacity);
            Err(SolveError::NoSolution)
        } else {
            self.search(board.clone(), 0)
        };

        if let Ok(solution) = &result {
            self.observer.on_solution(solution, &self.statistics);
        }
        self.observer.on_exit_search(&self.statistics);
        debug!("Search finished: {}", self.statistics);
        result
    }

    fn enter_node(&mut self, depth: usize) -> Result<(), SolveError> {
        self.statistics.on_node_explored(depth);
        if let Some(flag) = self.stop_flag {
            if flag.load(Ordering::Relaxed) {
                return Err(SolveError::Cancelled);
            }
        }
        if self.statistics.nodes_explored > self.max_attempts {
            return Err(SolveError::AttemptLimit(self.max_attempts));
        }
        Ok(())
    }

    fn backtrack(&mut self, failure: &PropagationFailure, depth: usize) -> SolveError {
        debug!("Abandoning branch at depth {}: {}", depth, failure);
        self.statistics.backtracks += 1;
        self.observer.on_backtrack(failure, depth);
        SolveError::NoSolution
    }

    // Takes ownership of the board: each node works on its own copy.
    fn search(&mut self, mut board: Board, depth: usize) -> Result<Board, SolveError> {
        self.enter_node(depth)?;

        match propagate(&mut board) {
            Ok(passes) => self.statistics.propagation_passes += passes,
            Err(failure) => return Err(self.backtrack(&failure, depth)),
        }
        self.observer.on_node(&board, depth, &self.statistics);

        if board.is_solved() {
            return Ok(board);
        }

        // Propagation leaves no unsatisfied island without a way out, so
        // no candidate means everything is full but split up.
        let candidate = match choose_candidate(&board) {
            Some(id) => id,
            None => return Err(self.backtrack(&PropagationFailure::Disconnected, depth)),
        };

        for dir in board.island(candidate).unblocked_directions() {
            let mut trials = Vec::with_capacity(3);
            let cap = board.direction_capacity(candidate, dir);
            if cap >= 1 && board.can_place(candidate, dir) {
                trials.push(Move::Single);
                if cap == MAX_BRIDGES && board.island(candidate).remaining() >= MAX_BRIDGES {
                    trials.push(Move::Double);
                }
            }
            trials.push(Move::Block);

            let covers_all = trials.contains(&Move::Single);
            for kind in trials {
                let trial = Trial::new(&board, candidate, dir, kind);
                match self.attempt(&board, trial, depth) {
                    Ok(solution) => return Ok(solution),
                    Err(SolveError::NoSolution) => (),
                    Err(e) => return Err(e),
                }
            }

            // At least one more wire, or none at all: between them the
            // single and blocked trials have covered every way on.
            if covers_all {
                break;
            }
        }

        Err(SolveError::NoSolution)
    }

    fn attempt(&mut self, board: &Board, trial: Trial, depth: usize) -> Result<Board, SolveError> {
        debug!("Depth {}: trying {}", depth, trial);
        self.statistics.trials += 1;
        self.observer.on_trial(&trial, depth);

        let mut branch = board.clone();
        trial.apply(&mut branch);
        self.search(branch, depth + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{display_board, read_board};

    fn board(input: &str) -> Board {
        read_board(input.lines().map(str::trim)).unwrap()
    }

    fn solve(input: &str) -> Result<String, SolveError> {
        Solver::new().solve(&board(input)).map(|b| display_board(&b))
    }

    #[test]
    fn test_solve_two_ones() {
        assert_eq!(solve("1.1"), Ok("1-1".to_string()));
    }

    #[test]
    fn test_solve_isolated_island() {
        assert_eq!(solve("2"), Err(SolveError::NoSolution));
    }

    #[test]
    fn test_solve_odd_total() {
        assert_eq!(solve("1.2"), Err(SolveError::NoSolution));
    }

    #[test]
    fn test_solve_square() {
        let input = "2.2
                     ...
                     2.2";
        assert_eq!(solve(input), Ok("2-2\n| |\n2-2".to_string()));

        let mut solver = Solver::new();
        solver.solve(&board(input)).unwrap();
        assert!(solver.statistics().nodes_explored > 1);
        assert!(solver.statistics().backtracks >= 1);
    }

    #[test]
    fn test_solve_single_component() {
        // Check we only get the solution with a single component.
        let input = ".2.1.
                     .....
                     .2.2.
                     .....
                     .1.2.";
        let expected = [" 2-1 ", " |   ", " 2-2 ", "   | ", " 1-2 "].join("\n");
        assert_eq!(solve(input), Ok(expected));
    }

    #[test]
    fn test_solve_split() {
        let input = ".1.2.1.
                     .......
                     .2.4.2.
                     .......
                     .1.2.1.";
        let sol1 = [
            " 1-2 1 ", "   | | ", " 2-4-2 ", " | |   ", " 1 2-1 ",
        ]
        .join("\n");
        let sol2 = [
            " 1 2-1 ", " | |   ", " 2-4-2 ", "   | | ", " 1-2 1 ",
        ]
        .join("\n");

        let actual = solve(input).unwrap();
        assert!(actual == sol1 || actual == sol2, "{}", actual);
    }

    #[test]
    fn test_solve_is_deterministic() {
        let input = ".1.2.1.
                     .......
                     .2.4.2.
                     .......
                     .1.2.1.";
        assert_eq!(solve(input), solve(input));
    }

    #[test]
    fn test_solve_single_component_no_solutions() {
        let input = ".1.1
                     1.1.";
        assert_eq!(solve(input), Err(SolveError::NoSolution));
    }

    #[test]
    fn test_solve_leaves_input_untouched() {
        let b = board("2.2\n...\n2.2");
        let before = b.clone();
        Solver::new().solve(&b).unwrap();
        assert_eq!(b, before);
    }

    #[test]
    fn test_attempt_limit() {
        let b = board("2.2\n...\n2.2");
        let mut solver = Solver::new().with_max_attempts(1);
        assert_eq!(solver.solve(&b), Err(SolveError::AttemptLimit(1)));
        assert_eq!(solver.statistics().nodes_explored, 2);
    }

    #[test]
    fn test_attempt_limit_not_hit_by_propagation_alone() {
        let b = board("1.1");
        assert!(Solver::new().with_max_attempts(1).solve(&b).is_ok());
    }

    #[test]
    fn test_cancelled() {
        let flag = AtomicBool::new(true);
        let b = board("1.1");
        let mut solver = Solver::new().with_stop_flag(&flag);
        assert_eq!(solver.solve(&b), Err(SolveError::Cancelled));
    }

    #[test]
    fn test_choose_candidate() {
        let b = board(
            "3.2
             ...
             2..",
        );
        assert_eq!(choose_candidate(&b), b.island_at(0, 0));
    }

    #[test]
    fn test_choose_candidate_prefers_fewer_exits() {
        let b = board(
            "2.2.2
             .....
             2....",
        );
        // Everything needs 2; (0, 4) is the first with a single exit.
        assert_eq!(choose_candidate(&b), b.island_at(0, 4));
    }

    #[test]
    fn test_choose_candidate_ties_break_in_scan_order() {
        let b = board("2.2\n...\n2.2");
        assert_eq!(choose_candidate(&b), Some(0));
    }

    #[test]
    fn test_choose_candidate_none_when_satisfied() {
        let mut b = board("1.1");
        b.connect(0, Direction::East, 1);
        assert_eq!(choose_candidate(&b), None);
    }

    #[test]
    fn test_trial_display() {
        let b = board("2.2");
        let trial = Trial::new(&b, 1, Direction::West, Move::Double);
        assert_eq!(trial.to_string(), "double bridge west from (0, 2)");
    }
}
