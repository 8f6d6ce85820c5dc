//! Line-oriented command driver (§6): `new`, `setboard`, `memory`, `cores`,
//! `perft`, `perftfast`, `divide`, `showposition`, `movelist`, `showhash`,
//! `quit`. Reads commands from stdin, one per line, and writes results to
//! stdout — the I/O and command-glue surface the core spec explicitly
//! excludes, kept thin and separate from the library crate.

use juddperft::cache::PerftCache;
use juddperft::fen::square_name;
use juddperft::movegen::generate_legal_moves;
use juddperft::moves::MoveList;
use juddperft::perft::{self, PerftCounts};
use juddperft::position::Position;
use std::io::{self, BufRead, Write};

const DEFAULT_CACHE_BYTES: usize = 64 * 1024 * 1024;

struct Driver {
    position: Position,
    cache: PerftCache,
    cores: usize,
}

impl Driver {
    fn new() -> Result<Self, juddperft::error::PerftError> {
        Ok(Driver {
            position: Position::start_position(),
            cache: PerftCache::with_byte_budget(DEFAULT_CACHE_BYTES)?,
            cores: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
        })
    }

    fn dispatch(&mut self, line: &str, out: &mut impl Write) -> bool {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else { return true };

        match command {
            "new" => {
                self.position = Position::start_position();
            }
            "setboard" => {
                let fen = parts.collect::<Vec<_>>().join(" ");
                match juddperft::fen::from_fen(&fen) {
                    Ok(pos) => self.position = pos,
                    Err(e) => {
                        let _ = writeln!(out, "illegal position: {e}");
                    }
                }
            }
            "memory" => {
                if let Some(bytes) = parts.next().and_then(|s| s.parse::<usize>().ok()) {
                    match PerftCache::with_byte_budget(bytes) {
                        Ok(cache) => self.cache = cache,
                        Err(e) => {
                            let _ = writeln!(out, "{e}");
                            std::process::exit(1);
                        }
                    }
                }
            }
            "cores" => {
                if let Some(n) = parts.next().and_then(|s| s.parse::<usize>().ok()) {
                    self.cores = n.clamp(1, perft::MAX_THREADS);
                }
            }
            "perft" => {
                if let Some(max_depth) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
                    for depth in 1..=max_depth {
                        let mut acc = PerftCounts::default();
                        perft::perft_detailed(&self.position, depth, &mut acc);
                        print_detailed(out, depth, &acc);
                    }
                }
            }
            "perftfast" => {
                if let Some(max_depth) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
                    for depth in 1..=max_depth {
                        self.cache.clear();
                        let total = perft::perft_fast_parallel(&self.position, depth, self.cores, &self.cache);
                        let _ = writeln!(out, "perft {depth}: {total}");
                    }
                }
            }
            "divide" => {
                if let Some(depth) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
                    self.cache.clear();
                    let breakdown = perft::divide(&self.position, depth, &self.cache);
                    let mut total = 0u64;
                    for (mv, count) in &breakdown {
                        let _ = writeln!(out, "{}{}: {count}", square_name(mv.origin), square_name(mv.destination));
                        total += count;
                    }
                    let _ = writeln!(out, "total: {total}");
                }
            }
            "showposition" => {
                let _ = writeln!(out, "{}", self.position.to_fen());
            }
            "movelist" => {
                let mut list = MoveList::new();
                generate_legal_moves(&self.position, &mut list);
                for mv in list.iter() {
                    let _ = writeln!(out, "{}{}", square_name(mv.origin), square_name(mv.destination));
                }
                let _ = writeln!(out, "{} moves", list.len());
            }
            "showhash" => {
                let _ = writeln!(out, "{:#018x}", self.position.hash);
                if self.position.hash != self.position.calculate_hash() {
                    let _ = writeln!(
                        out,
                        "warning: incremental hash diverges from full recompute ({:#018x})",
                        self.position.calculate_hash()
                    );
                }
            }
            "quit" => return false,
            unknown => {
                #[cfg(feature = "logging")]
                log::warn!("unrecognised command: {unknown}");
                #[cfg(not(feature = "logging"))]
                let _ = writeln!(out, "unrecognised command: {unknown}");
            }
        }
        true
    }
}

fn print_detailed(out: &mut impl Write, depth: u32, acc: &PerftCounts) {
    let _ = writeln!(
        out,
        "perft {depth}: moves={} captures={} en_passant={} castles={} promotions={} checks={} mates={}",
        acc.nodes, acc.captures, acc.en_passant, acc.castles, acc.promotions, acc.checks, acc.mates
    );
}

fn main() {
    #[cfg(feature = "logging")]
    env_logger::init();

    let mut driver = match Driver::new() {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if !driver.dispatch(&line, &mut stdout) {
            break;
        }
    }
}
