//
// Hashiwokakero solver
//
// Copyright 2021 Simon Frankau
//

//! Reading puzzles from text, and printing boards back out.

use anyhow::{bail, ensure, Result};

use crate::board::{Board, Cell};

/// No island can take more than 4 directions of 2 wires each.
pub const MAX_CAPACITY: usize = 8;
/// Largest board accepted, in either dimension.
pub const MAX_DIMENSION: usize = 50;
pub const MAX_ISLANDS: usize = 1600;

// Bridge glyphs are accepted and ignored, so a printed solution can be
// read back in as its puzzle. Letters give capacities past 9, only so
// they can be rejected with a useful message.
fn parse_cell(row: usize, col: usize, c: char) -> Result<Option<usize>> {
    let capacity = match c {
        '.' | ' ' | '-' | '=' | '|' | '"' => None,
        '1'..='9' | 'a'..='c' => c.to_digit(36).map(|d| d as usize),
        _ => bail!("Unexpected character in input: '{}'", c),
    };
    if let Some(n) = capacity {
        ensure!(
            n <= MAX_CAPACITY,
            "Island at ({}, {}) has capacity {}, but no island can take more than {} bridges",
            row,
            col,
            n,
            MAX_CAPACITY
        );
    }
    Ok(capacity)
}

pub fn read_board<'a, Iter: std::iter::Iterator<Item = &'a str>>(lines: Iter) -> Result<Board> {
    let mut rows = lines
        // Trim comments, dropping lines that were nothing but a comment.
        // Leading spaces are empty cells, so only the end is trimmed.
        .filter_map(|s| match s.find('#') {
            Some(idx) if s[..idx].trim().is_empty() => None,
            Some(idx) => Some(&s[..idx]),
            None => Some(s),
        })
        .map(str::trim_end)
        .enumerate()
        .map(|(row, s)| {
            s.chars()
                .enumerate()
                .map(|(col, c)| parse_cell(row, col, c))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    while rows.last().map_or(false, Vec::is_empty) {
        rows.pop();
    }
    ensure!(!rows.is_empty(), "Non-empty input line expected");

    // Rows are padded out to the longest one.
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    ensure!(
        width <= MAX_DIMENSION && rows.len() <= MAX_DIMENSION,
        "Board is {}x{}, but at most {}x{} is supported",
        rows.len(),
        width,
        MAX_DIMENSION,
        MAX_DIMENSION
    );
    for row in rows.iter_mut() {
        row.resize(width, None);
    }

    let n_islands = rows.iter().flatten().filter(|c| c.is_some()).count();
    ensure!(
        n_islands <= MAX_ISLANDS,
        "Board has {} islands, but at most {} are supported",
        n_islands,
        MAX_ISLANDS
    );

    Ok(Board::new(&rows))
}

// NB: Undisplayable cells (capacity > 35, bridge count > 2) are
// silently converted to '?'.
fn cell_to_char(board: &Board, cell: Cell) -> char {
    match cell {
        Cell::Empty => ' ',
        Cell::HBridge(1) => '-',
        Cell::HBridge(2) => '=',
        Cell::VBridge(1) => '|',
        Cell::VBridge(2) => '"',
        Cell::Island(id) => {
            std::char::from_digit(board.island(id).capacity() as u32, 36).unwrap_or('?')
        }
        _ => '?',
    }
}

// Print results in the same shape as the input, less comments.
//
// NB: Lossy - just prints enough to display results - blocking and other
// solver state is not displayed.
pub fn display_board(board: &Board) -> String {
    (0..board.height())
        .map(|row| {
            (0..board.width())
                .map(|col| cell_to_char(board, board.cell(row, col)))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
