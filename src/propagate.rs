//
// Hashiwokakero solver
//
// Copyright 2021 Simon Frankau
//

//! Deterministic inference: add the bridges the current state forces,
//! until nothing more follows.

use log::trace;
use thiserror::Error;

use crate::board::{Board, Direction, IslandId, MAX_BRIDGES};
use crate::connectivity::{self, Links};

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PropagationFailure {
    // An island needs more wires than its open directions can take. An
    // island blocked on all sides while unsatisfied is the extreme case.
    #[error("Island at ({row}, {col}) needs {missing} more bridge(s) but can take only {available}")]
    Contradiction {
        row: usize,
        col: usize,
        missing: usize,
        available: usize,
    },
    // Even using every link still open, some island is cut off.
    #[error("Islands can no longer be joined into a single group")]
    Disconnected,
}

// Lay up to `count` wires, never more than both ends and the corridor
// allow. Returns whether anything was built.
fn add_bridges(board: &mut Board, id: IslandId, dir: Direction, count: usize, rule: &str) -> bool {
    let n = count
        .min(board.direction_capacity(id, dir))
        .min(board.island(id).remaining());
    if n == 0 || !board.can_place(id, dir) {
        return false;
    }
    let isle = board.island(id);
    trace!("{}: ({}, {}) +{} {}", rule, isle.row(), isle.col(), n, dir);
    board.connect(id, dir, n);
    true
}

fn check_capacity(board: &Board, id: IslandId) -> Result<(), PropagationFailure> {
    let isle = board.island(id);
    let available = board.unblocked_capacity(id);
    if available < isle.remaining() {
        return Err(PropagationFailure::Contradiction {
            row: isle.row(),
            col: isle.col(),
            missing: isle.remaining(),
            available,
        });
    }
    Ok(())
}

// Only one way out: everything left goes there.
fn forced_last_edge(board: &mut Board, id: IslandId) -> bool {
    let open = board.island(id).unblocked_directions();
    if open.len() != 1 {
        return false;
    }
    let remaining = board.island(id).remaining();
    add_bridges(board, id, open[0], remaining, "forced last edge")
}

// Needs exactly what the open directions can take: fill them all.
fn saturate_all(board: &mut Board, id: IslandId) -> bool {
    if board.island(id).remaining() != board.unblocked_capacity(id) {
        return false;
    }
    let mut changed = false;
    for dir in board.island(id).unblocked_directions() {
        let cap = board.direction_capacity(id, dir);
        changed |= add_bridges(board, id, dir, cap, "saturate all");
    }
    changed
}

// One short of filling everything: a direction that could take two can
// lose at most one of them.
fn at_least_one(board: &mut Board, id: IslandId) -> bool {
    if board.island(id).remaining() + 1 != board.unblocked_capacity(id) {
        return false;
    }
    let mut changed = false;
    for dir in board.island(id).unblocked_directions() {
        if board.island(id).bridges(dir) == 0
            && board.direction_capacity(id, dir) == MAX_BRIDGES
        {
            changed |= add_bridges(board, id, dir, 1, "at least one");
        }
    }
    changed
}

// With two ways out, whatever the other side can't take must go this way.
fn two_direction_domination(board: &mut Board, id: IslandId) -> bool {
    let open = board.island(id).unblocked_directions();
    if open.len() != 2 || board.island(id).remaining() < 2 {
        return false;
    }
    let mut changed = false;
    for (this, other) in [(open[0], open[1]), (open[1], open[0])] {
        let need = board
            .island(id)
            .remaining()
            .saturating_sub(board.direction_capacity(id, other));
        if need > 0 {
            changed |= add_bridges(board, id, this, need, "two-direction domination");
        }
    }
    changed
}

// A link whose loss would split the islands must carry a wire.
fn forced_connectivity(board: &mut Board, id: IslandId) -> bool {
    if board.islands().len() < 2 {
        return false;
    }
    let mut changed = false;
    for dir in board.island(id).unblocked_directions() {
        if board.island(id).is_satisfied() {
            break;
        }
        if board.island(id).bridges(dir) > 0 || board.direction_capacity(id, dir) == 0 {
            continue;
        }
        if !connectivity::is_connected_without(board, Links::Potential, Some((id, dir))) {
            changed |= add_bridges(board, id, dir, 1, "forced connectivity");
        }
    }
    changed
}

// Apply every rule to a single island. Returns whether anything changed.
fn constrain_island(board: &mut Board, id: IslandId) -> Result<bool, PropagationFailure> {
    if board.island(id).is_satisfied() {
        return Ok(false);
    }
    check_capacity(board, id)?;

    let mut changed = forced_last_edge(board, id);
    changed |= saturate_all(board, id);
    changed |= at_least_one(board, id);
    changed |= two_direction_domination(board, id);
    changed |= forced_connectivity(board, id);
    Ok(changed)
}

// A single pass over every island, in scan order.
fn propagate_pass(board: &mut Board) -> Result<bool, PropagationFailure> {
    if !connectivity::is_connected(board, Links::Potential) {
        return Err(PropagationFailure::Disconnected);
    }

    let mut progress = false;
    for id in 0..board.islands().len() {
        progress |= constrain_island(board, id)?;
    }
    Ok(progress)
}

/// Runs passes until one changes nothing. Returns the number of passes.
pub fn propagate(board: &mut Board) -> Result<usize, PropagationFailure> {
    let mut passes = 1;
    while propagate_pass(board)? {
        passes += 1;
    }
    Ok(passes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{display_board, read_board};

    fn board(input: &str) -> Board {
        read_board(input.lines().map(str::trim)).unwrap()
    }

    fn id(b: &Board, row: usize, col: usize) -> IslandId {
        b.island_at(row, col).unwrap()
    }

    #[test]
    fn test_forced_last_edge() {
        let mut b = board("1.1");
        assert!(forced_last_edge(&mut b, 0));
        assert_eq!(b.island(0).bridges(Direction::East), 1);
        assert!(b.is_solved());
    }

    #[test]
    fn test_forced_last_edge_needs_single_exit() {
        let mut b = board(
            "2.2
             ...
             2.2",
        );
        assert!(!forced_last_edge(&mut b, 0));
        assert_eq!(b.built_bridges(), 0);
    }

    #[test]
    fn test_saturate_all() {
        let mut b = board("2.4.2");
        let four = id(&b, 0, 2);
        assert!(saturate_all(&mut b, four));
        assert_eq!(b.island(four).bridges(Direction::West), 2);
        assert_eq!(b.island(four).bridges(Direction::East), 2);
        assert_eq!(display_board(&b), "2=4=2");
    }

    #[test]
    fn test_saturate_all_respects_neighbour() {
        let mut b = board(
            "3.1
             ...
             2..",
        );
        let three = id(&b, 0, 0);
        assert!(saturate_all(&mut b, three));
        assert_eq!(b.island(three).bridges(Direction::East), 1);
        assert_eq!(b.island(three).bridges(Direction::South), 2);
    }

    #[test]
    fn test_at_least_one() {
        let mut b = board(
            "3.2
             ...
             2..",
        );
        let three = id(&b, 0, 0);
        assert!(at_least_one(&mut b, three));
        assert_eq!(b.island(three).bridges(Direction::East), 1);
        assert_eq!(b.island(three).bridges(Direction::South), 1);
    }

    #[test]
    fn test_at_least_one_skips_single_capacity_links() {
        let mut b = board(
            "2.1
             ...
             2..",
        );
        let two = id(&b, 0, 0);
        assert!(at_least_one(&mut b, two));
        assert_eq!(b.island(two).bridges(Direction::East), 0);
        assert_eq!(b.island(two).bridges(Direction::South), 1);
    }

    #[test]
    fn test_two_direction_domination() {
        let mut b = board(
            "3.1
             ...
             2..",
        );
        let three = id(&b, 0, 0);
        assert!(two_direction_domination(&mut b, three));
        assert_eq!(b.island(three).bridges(Direction::South), 2);
        assert_eq!(b.island(three).bridges(Direction::East), 1);
    }

    #[test]
    fn test_two_direction_domination_needs_a_shortfall() {
        let mut b = board(
            "2.2
             ...
             2.2",
        );
        assert!(!two_direction_domination(&mut b, 0));
    }

    #[test]
    fn test_forced_connectivity() {
        let mut b = board("2.2.2");
        let middle = id(&b, 0, 2);
        assert!(forced_connectivity(&mut b, middle));
        assert_eq!(b.island(middle).bridges(Direction::West), 1);
        assert_eq!(b.island(middle).bridges(Direction::East), 1);
    }

    #[test]
    fn test_forced_connectivity_leaves_cycles() {
        let mut b = board(
            "2.2
             ...
             2.2",
        );
        assert!(!forced_connectivity(&mut b, 0));
    }

    #[test]
    fn test_contradiction() {
        let mut b = board("2");
        assert_eq!(
            propagate(&mut b),
            Err(PropagationFailure::Contradiction {
                row: 0,
                col: 0,
                missing: 2,
                available: 0
            })
        );
    }

    #[test]
    fn test_disconnected() {
        let mut b = board(
            ".1.1
             1.1.",
        );
        assert_eq!(propagate(&mut b), Err(PropagationFailure::Disconnected));
    }

    #[test]
    fn test_propagate_solves_simple() {
        let mut b = board(
            ".3..1
             .....
             .3.2.
             .....
             ...2.
             .....
             1..2.",
        );
        assert!(propagate(&mut b).is_ok());
        assert!(b.is_solved());

        let expected = [
            " 3--1", " \"   ", " 3-2 ", "   | ", "   2 ", "   | ", "1--2 ",
        ]
        .join("\n");
        assert_eq!(display_board(&b), expected);
    }

    #[test]
    fn test_propagate_stalls_on_square() {
        let mut b = board(
            "2.2
             ...
             2.2",
        );
        assert_eq!(propagate(&mut b), Ok(1));
        assert_eq!(b.built_bridges(), 0);
    }

    #[test]
    fn test_propagate_is_idempotent() {
        let mut b = board(
            ".2.1.
             .....
             .2.2.
             .....
             .1.2.",
        );
        assert!(propagate(&mut b).is_ok());
        let fixpoint = b.clone();
        assert_eq!(propagate(&mut b), Ok(1));
        assert_eq!(b, fixpoint);
    }
}
