//
// Hashiwokakero solver
//
// Copyright 2021 Simon Frankau
//

use std::fs::File;
use std::io::{stdin, stdout, Read, Write};

use anyhow::Result;
use clap::Parser;

use hashi_solver::{display_board, solve_with_max_attempts, DEFAULT_MAX_ATTEMPTS};

#[derive(Parser)]
#[command(version, author = "Simon Frankau <sgf@arbitrary.name>")]
#[command(about = "Hashiwokakero (Bridges) puzzle solver")]
struct Opts {
    /// Input file. Uses stdin if none specified.
    #[arg(long)]
    input_file: Option<String>,
    /// Output file. Uses stdout if none specified.
    #[arg(long)]
    output_file: Option<String>,
    /// Trace the search on stderr.
    #[arg(long)]
    debug: bool,
    /// Number of search nodes to try before giving up. Large boards (a few
    /// hundred islands) can run out of attempts even when they have a
    /// solution, so running out does not mean the puzzle is unsolvable.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,
}

fn open_input(opts: &Opts) -> Result<Box<dyn Read>> {
    Ok(match &opts.input_file {
        Some(name) => Box::new(File::open(name)?),
        None => Box::new(stdin()),
    })
}

fn write_output(opts: &Opts, s: &str) -> Result<()> {
    let mut file: Box<dyn Write> = match &opts.output_file {
        Some(name) => Box::new(File::create(name)?),
        None => Box::new(stdout()),
    };

    Ok(file.write_all(s.as_bytes())?)
}

fn main() -> Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();

    let solution = solve_with_max_attempts(open_input(&opts)?, opts.debug, opts.max_attempts)?;
    write_output(&opts, &format!("{}\n", display_board(&solution)))
}
