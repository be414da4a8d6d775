//
// Hashiwokakero solver
//
// Copyright 2021 Simon Frankau
//

//! The island graph and the bridge occupancy map laid over the grid.
//!
//! Islands are held in an arena in row-major scan order, and refer to
//! their neighbours by index. Cloning a [`Board`] is therefore a flat
//! copy, which is what the search relies on for its speculative branches.

use std::fmt;

use crate::connectivity::{self, Links};

/// Most wires that may run between the same pair of islands.
pub const MAX_BRIDGES: usize = 2;

// There are 4 directions from an island.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Direction {
    North = 0,
    South = 1,
    West = 2,
    East = 3,
}

// The (row, col) steps to move N S W E respectively.
const DIRECTION_STEPS: &[(isize, isize); 4] = &[(-1, 0), (1, 0), (0, -1), (0, 1)];

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    pub fn step(self) -> (isize, isize) {
        DIRECTION_STEPS[self as usize]
    }

    pub fn is_horizontal(self) -> bool {
        self >= Direction::West
    }

    pub fn is_vertical(self) -> bool {
        self <= Direction::South
    }

    pub fn flip(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        };
        f.write_str(name)
    }
}

/// Index of an island in the board's arena.
pub type IslandId = usize;

// An island tracks, per direction, its nearest neighbour, the wires built
// towards it and whether more may ever be added.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Island {
    row: usize,
    col: usize,
    capacity: usize,
    built: [usize; 4],
    total_built: usize,
    blocked: [bool; 4],
    neighbours: [Option<IslandId>; 4],
}

impl Island {
    fn new(row: usize, col: usize, capacity: usize) -> Island {
        Island {
            row,
            col,
            capacity,
            built: [0; 4],
            total_built: 0,
            blocked: [false; 4],
            neighbours: [None; 4],
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Number of wires that must end at this island.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_built(&self) -> usize {
        self.total_built
    }

    pub fn bridges(&self, dir: Direction) -> usize {
        self.built[dir as usize]
    }

    pub fn is_blocked(&self, dir: Direction) -> bool {
        self.blocked[dir as usize]
    }

    pub fn neighbour(&self, dir: Direction) -> Option<IslandId> {
        self.neighbours[dir as usize]
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.total_built
    }

    pub fn is_satisfied(&self) -> bool {
        self.total_built == self.capacity
    }

    pub fn unblocked_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .iter()
            .copied()
            .filter(|dir| !self.is_blocked(*dir))
            .collect()
    }
}

// A cell in the map may be an island, a bridge (horizontal or
// vertical, with its wire count), or empty.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Cell {
    Empty,
    Island(IslandId),
    HBridge(usize),
    VBridge(usize),
}

/// A puzzle in some state of solution.
///
/// `cells` is the occupancy map (outer index is N-S, inner index is
/// W-E, `[0][0]` is the NW corner); `islands` is the graph model.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    cells: Vec<Vec<Cell>>,
    islands: Vec<Island>,
    required_bridges: usize,
    built_bridges: usize,
}

impl Board {
    /// Builds a board from a rectangular grid of optional island
    /// capacities. Rows shorter than the longest are treated as padded
    /// with empty cells.
    pub fn new(capacities: &[Vec<Option<usize>>]) -> Board {
        let width = capacities.iter().map(Vec::len).max().unwrap_or(0);
        let mut islands = Vec::new();
        let mut cells = Vec::with_capacity(capacities.len());

        for (row, line) in capacities.iter().enumerate() {
            let mut cell_row = vec![Cell::Empty; width];
            for (col, capacity) in line.iter().enumerate() {
                if let Some(capacity) = *capacity {
                    cell_row[col] = Cell::Island(islands.len());
                    islands.push(Island::new(row, col, capacity));
                }
            }
            cells.push(cell_row);
        }

        let required_bridges = islands.iter().map(Island::capacity).sum::<usize>() / 2;
        let mut board = Board {
            cells,
            islands,
            required_bridges,
            built_bridges: 0,
        };
        board.link_neighbours();
        board.block_initial();
        board
    }

    fn link_neighbours(&mut self) {
        for id in 0..self.islands.len() {
            let (row, col) = self.islands[id].position();
            for dir in Direction::ALL {
                self.islands[id].neighbours[dir as usize] = self.find_island(row, col, dir);
            }
        }
    }

    // Edges of the map block their direction. Two 1s joined to each
    // other would form a closed pair, so unless they are the whole
    // puzzle that link is blocked too.
    fn block_initial(&mut self) {
        let many_islands = self.islands.len() > 2;
        for id in 0..self.islands.len() {
            for dir in Direction::ALL {
                match self.islands[id].neighbour(dir) {
                    None => self.islands[id].blocked[dir as usize] = true,
                    Some(nb) => {
                        if many_islands
                            && self.islands[id].capacity == 1
                            && self.islands[nb].capacity == 1
                        {
                            self.block(id, dir);
                        }
                    }
                }
            }
        }
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn island(&self, id: IslandId) -> &Island {
        &self.islands[id]
    }

    pub fn island_at(&self, row: usize, col: usize) -> Option<IslandId> {
        match self.cells.get(row).and_then(|r| r.get(col)) {
            Some(Cell::Island(id)) => Some(*id),
            _ => None,
        }
    }

    /// Half the sum of all capacities: each wire is counted from both ends.
    pub fn required_bridges(&self) -> usize {
        self.required_bridges
    }

    pub fn built_bridges(&self) -> usize {
        self.built_bridges
    }

    pub fn neighbour(&self, id: IslandId, dir: Direction) -> Option<IslandId> {
        self.islands[id].neighbour(dir)
    }

    // Walk from a cell in the given direction to the first island,
    // stepping over anything else.
    fn find_island(&self, row: usize, col: usize, dir: Direction) -> Option<IslandId> {
        let (mut idx_row, mut idx_col) = (row as isize, col as isize);
        let (len_row, len_col) = (self.height() as isize, self.width() as isize);
        let (step_row, step_col) = dir.step();
        loop {
            idx_row += step_row;
            idx_col += step_col;
            if idx_row < 0 || idx_row >= len_row || idx_col < 0 || idx_col >= len_col {
                return None;
            }
            if let Cell::Island(id) = self.cells[idx_row as usize][idx_col as usize] {
                return Some(id);
            }
        }
    }

    // The cells strictly between an island and its neighbour.
    fn corridor(&self, id: IslandId, dir: Direction) -> Vec<(usize, usize)> {
        let isle = &self.islands[id];
        let target = match isle.neighbour(dir) {
            Some(nb) => self.islands[nb].position(),
            None => return Vec::new(),
        };
        let (step_row, step_col) = dir.step();
        let (mut idx_row, mut idx_col) = (isle.row as isize, isle.col as isize);
        let mut path = Vec::new();
        loop {
            idx_row += step_row;
            idx_col += step_col;
            let pos = (idx_row as usize, idx_col as usize);
            if pos == target {
                return path;
            }
            path.push(pos);
        }
    }

    /// How many more wires could go in this direction: none if blocked,
    /// otherwise limited by the per-link maximum and by what the
    /// neighbour can still accept.
    pub fn direction_capacity(&self, id: IslandId, dir: Direction) -> usize {
        let isle = &self.islands[id];
        if isle.is_blocked(dir) {
            return 0;
        }
        match isle.neighbour(dir) {
            Some(nb) => (MAX_BRIDGES - isle.bridges(dir)).min(self.islands[nb].remaining()),
            None => 0,
        }
    }

    pub fn unblocked_capacity(&self, id: IslandId) -> usize {
        Direction::ALL
            .iter()
            .map(|dir| self.direction_capacity(id, *dir))
            .sum()
    }

    /// Whether another wire may be laid towards the neighbour without
    /// crossing anything. Adding to an existing bridge reuses its
    /// corridor; a new bridge needs every cell of the corridor empty.
    pub fn can_place(&self, id: IslandId, dir: Direction) -> bool {
        if self.islands[id].neighbour(dir).is_none() {
            return false;
        }
        match self.islands[id].bridges(dir) {
            0 => self
                .corridor(id, dir)
                .iter()
                .all(|&(row, col)| self.cells[row][col] == Cell::Empty),
            n => n < MAX_BRIDGES,
        }
    }

    /// Adds `count` wires between an island and its neighbour, then
    /// blocks whatever is saturated as a result.
    ///
    /// Panics if the move is illegal: callers must check capacities and
    /// `can_place` first.
    pub fn connect(&mut self, id: IslandId, dir: Direction, count: usize) {
        assert!(
            count == 1 || count == 2,
            "Bridges are added one or two wires at a time"
        );
        let nb = match self.islands[id].neighbour(dir) {
            Some(nb) => nb,
            None => panic!(
                "No island {} of ({}, {})",
                dir, self.islands[id].row, self.islands[id].col
            ),
        };
        assert!(
            self.can_place(id, dir),
            "Bridge {} of ({}, {}) would cross another",
            dir,
            self.islands[id].row,
            self.islands[id].col
        );
        let existing = self.islands[id].bridges(dir);
        assert!(existing + count <= MAX_BRIDGES);
        assert!(count <= self.islands[id].remaining());
        assert!(count <= self.islands[nb].remaining());

        for (isle, d) in [(id, dir), (nb, dir.flip())] {
            let island = &mut self.islands[isle];
            island.built[d as usize] += count;
            island.total_built += count;
        }
        self.built_bridges += count;

        self.paint_bridge(id, dir, existing + count);
        if existing == 0 {
            self.block_crossings(id, dir);
        }
        self.refresh_blocks(id);
        self.refresh_blocks(nb);
    }

    /// Marks a direction as taking no more wires, on both ends of the link.
    pub fn block(&mut self, id: IslandId, dir: Direction) {
        self.islands[id].blocked[dir as usize] = true;
        if let Some(nb) = self.islands[id].neighbour(dir) {
            self.islands[nb].blocked[dir.flip() as usize] = true;
        }
    }

    fn refresh_blocks(&mut self, id: IslandId) {
        let full = self.islands[id].is_satisfied();
        for dir in Direction::ALL {
            if full || self.islands[id].bridges(dir) == MAX_BRIDGES {
                self.block(id, dir);
            }
        }
    }

    fn paint_bridge(&mut self, id: IslandId, dir: Direction, n_bridges: usize) {
        let brush = if dir.is_horizontal() {
            Cell::HBridge(n_bridges)
        } else {
            Cell::VBridge(n_bridges)
        };

        // We'll be paranoid about painting over the wrong thing.
        for (row, col) in self.corridor(id, dir) {
            let cell = &mut self.cells[row][col];
            match *cell {
                Cell::Empty => (),
                Cell::HBridge(n) => assert!(dir.is_horizontal() && n < n_bridges),
                Cell::VBridge(n) => assert!(dir.is_vertical() && n < n_bridges),
                Cell::Island(_) => panic!("Bridge runs into an island at ({}, {})", row, col),
            }
            *cell = brush;
        }
    }

    // A freshly laid bridge cuts every perpendicular corridor it passes
    // through. Those corridors are empty (or we could not have placed
    // it), so they can never be used now.
    fn block_crossings(&mut self, id: IslandId, dir: Direction) {
        let across = if dir.is_horizontal() {
            Direction::North
        } else {
            Direction::West
        };
        for (row, col) in self.corridor(id, dir) {
            let before = self.find_island(row, col, across);
            let after = self.find_island(row, col, across.flip());
            if let (Some(isle), Some(_)) = (before, after) {
                assert_eq!(self.islands[isle].bridges(across.flip()), 0);
                self.block(isle, across.flip());
            }
        }
    }

    pub fn all_satisfied(&self) -> bool {
        self.islands.iter().all(Island::is_satisfied)
    }

    /// Every capacity met, and the bridges join all islands together.
    pub fn is_solved(&self) -> bool {
        self.all_satisfied() && connectivity::is_connected(self, Links::Built)
    }
}
