//
// Hashiwokakero solver
//
// Copyright 2021 Simon Frankau
//

//! Reachability over the island graph.

use crate::board::{Board, Direction, IslandId};

/// Which links a traversal may follow.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Links {
    /// Only links that already carry at least one wire.
    Built,
    /// Links that carry a wire or may still get one.
    Potential,
}

fn follow(
    board: &Board,
    id: IslandId,
    dir: Direction,
    links: Links,
    excluded: Option<(IslandId, Direction)>,
) -> Option<IslandId> {
    let isle = board.island(id);
    let nb = isle.neighbour(dir)?;
    if isle.bridges(dir) > 0 {
        return Some(nb);
    }
    if links == Links::Built || isle.is_blocked(dir) {
        return None;
    }
    // The excluded link may be named from either end.
    if let Some((ex_id, ex_dir)) = excluded {
        if (ex_id == id && ex_dir == dir) || (ex_id == nb && ex_dir == dir.flip()) {
            return None;
        }
    }
    Some(nb)
}

/// Depth-first search from `start`, returning which islands were reached.
/// `excluded` names an unbridged link to treat as blocked.
pub fn reachable(
    board: &Board,
    start: IslandId,
    links: Links,
    excluded: Option<(IslandId, Direction)>,
) -> Vec<bool> {
    let mut seen = vec![false; board.islands().len()];
    let mut stack = vec![start];
    seen[start] = true;

    while let Some(id) = stack.pop() {
        for dir in Direction::ALL {
            if let Some(nb) = follow(board, id, dir, links, excluded) {
                if !seen[nb] {
                    seen[nb] = true;
                    stack.push(nb);
                }
            }
        }
    }

    seen
}

pub fn is_connected(board: &Board, links: Links) -> bool {
    is_connected_without(board, links, None)
}

/// Whether the islands still form one group if the given link were
/// blocked.
pub fn is_connected_without(
    board: &Board,
    links: Links,
    excluded: Option<(IslandId, Direction)>,
) -> bool {
    if board.islands().is_empty() {
        return true;
    }
    reachable(board, 0, links, excluded).iter().all(|seen| *seen)
}
