//! The perft driver: detailed per-leaf counters, the fast cached total, the
//! `divide` per-root-move breakdown, and the single-level multithreaded
//! fork (§4.5).

use crate::cache::PerftCache;
use crate::movegen::generate_legal_moves;
use crate::moves::{Move, MoveList};
use crate::position::Position;
use crate::zobrist::ZOBRIST;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Hard cap on worker threads regardless of configured core count or
/// detected hardware concurrency (§4.5, §5).
pub const MAX_THREADS: usize = 64;

/// Per-leaf counters produced by [`perft_detailed`] (§4.5, §6 `perft`
/// command). `nodes` is the leaf count; the rest classify the move that
/// produced each leaf.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub mates: u64,
}

impl std::ops::AddAssign for PerftCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.mates += rhs.mates;
    }
}

/// §4.5 `perft_detailed`. At `depth == 1` the move's own flags are tallied
/// without applying it (other than the check/mate classification, which
/// necessarily has to look one ply ahead). No cache is consulted: the
/// per-path counters differ across root-to-leaf paths that share a leaf
/// count, so memoising the aggregate would be wrong.
pub fn perft_detailed(pos: &Position, depth: u32, acc: &mut PerftCounts) {
    if depth == 0 {
        acc.nodes += 1;
        return;
    }

    let mut list = MoveList::new();
    generate_legal_moves(pos, &mut list);

    if depth == 1 {
        for mv in list.iter() {
            acc.nodes += 1;
            if mv.capture {
                acc.captures += 1;
            }
            if mv.en_passant_capture {
                acc.en_passant += 1;
            }
            if mv.castle_short || mv.castle_long {
                acc.castles += 1;
            }
            if mv.is_promotion() {
                acc.promotions += 1;
            }
            if move_delivers_check(pos, mv, acc) {
                acc.checks += 1;
            }
        }
        return;
    }

    for mv in list.iter() {
        let mut child = pos.clone();
        child.apply(mv);
        child.switch_sides();
        perft_detailed(&child, depth - 1, acc);
    }
}

/// Applies `mv`, tests whether the opponent is left in check, and — only
/// if so — generates the opponent's replies to classify mate. Kept out of
/// the hot `perft_fast` path entirely; `perft_detailed` already pays for a
/// fresh clone per leaf move so the extra lookahead is cheap in relative
/// terms.
fn move_delivers_check(pos: &Position, mv: &Move, acc: &mut PerftCounts) -> bool {
    let mut child = pos.clone();
    child.apply(mv);
    child.switch_sides();
    let opponent_black = child.black_to_move();
    if !child.in_check(opponent_black) {
        return false;
    }
    let mut replies = MoveList::new();
    generate_legal_moves(&child, &mut replies);
    if replies.is_empty() {
        acc.mates += 1;
    }
    true
}

/// §4.5 `perft_fast`. `depth == 1` returns the generated move count
/// directly (the generator already yields only legal moves, so this is
/// exact, not an approximation — SPEC_FULL §9 open question (a)). Deeper
/// calls consult `cache` keyed by `position.hash XOR depth_salt[depth]`
/// before recursing.
pub fn perft_fast(pos: &Position, depth: u32, cache: &PerftCache) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut list = MoveList::new();
    generate_legal_moves(pos, &mut list);

    if depth == 1 {
        return list.len() as u64;
    }

    debug_assert!(
        (depth as usize) < crate::zobrist::MAX_PERFT_DEPTH,
        "perft depth exceeds the depth-salt table"
    );
    let key = pos.hash ^ ZOBRIST.perft_depth[depth as usize];
    if let Some(count) = cache.lookup(key, depth as u8) {
        return count;
    }

    let mut total = 0u64;
    for mv in list.iter() {
        let mut child = pos.clone();
        child.apply(mv);
        child.switch_sides();
        total += perft_fast(&child, depth - 1, cache);
    }
    cache.store(key, depth as u8, total);
    total
}

/// §6 `divide`: one subtree count per legal root move, plus their sum
/// (§8 property (c): the sum must equal `perft_fast(pos, depth)`).
pub fn divide(pos: &Position, depth: u32, cache: &PerftCache) -> Vec<(Move, u64)> {
    let mut list = MoveList::new();
    generate_legal_moves(pos, &mut list);

    list.iter()
        .map(|mv| {
            let mut child = pos.clone();
            child.apply(mv);
            child.switch_sides();
            let count = if depth <= 1 { 1 } else { perft_fast(&child, depth - 1, cache) };
            (*mv, count)
        })
        .collect()
}

/// §4.5 parallelisation: single-level fork over the root's legal moves.
/// Workers share a mutex-guarded queue (the only blocking point, §5) and
/// the same lock-free `cache`; results are summed after every worker
/// joins, which is deterministic regardless of completion order because
/// addition is associative (§4.5 "Ordering guarantees").
pub fn perft_fast_parallel(pos: &Position, depth: u32, cores: usize, cache: &PerftCache) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut list = MoveList::new();
    generate_legal_moves(pos, &mut list);

    if depth == 1 {
        return list.len() as u64;
    }

    let queue: Mutex<VecDeque<Move>> = Mutex::new(list.iter().copied().collect());
    let worker_count = cores.clamp(1, MAX_THREADS).min(list.len().max(1));

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..worker_count)
            .map(|_| {
                scope.spawn(|| {
                    let mut local_total = 0u64;
                    loop {
                        let mv = {
                            let mut guard = queue.lock();
                            guard.pop_front()
                        };
                        let Some(mv) = mv else { break };
                        let mut child = pos.clone();
                        child.apply(&mv);
                        child.switch_sides();
                        local_total += perft_fast(&child, depth - 1, cache);
                    }
                    local_total
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).sum()
    })
}

/// Multithreaded counterpart to [`perft_detailed`], following the same
/// single-level fork as [`perft_fast_parallel`] (§4.5 `perftMT`).
pub fn perft_detailed_parallel(pos: &Position, depth: u32, cores: usize) -> PerftCounts {
    if depth == 0 {
        return PerftCounts { nodes: 1, ..PerftCounts::default() };
    }

    let mut list = MoveList::new();
    generate_legal_moves(pos, &mut list);

    let queue: Mutex<VecDeque<Move>> = Mutex::new(list.iter().copied().collect());
    let worker_count = cores.clamp(1, MAX_THREADS).min(list.len().max(1));

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..worker_count)
            .map(|_| {
                scope.spawn(|| {
                    let mut local = PerftCounts::default();
                    loop {
                        let mv = {
                            let mut guard = queue.lock();
                            guard.pop_front()
                        };
                        let Some(mv) = mv else { break };
                        let mut child = pos.clone();
                        child.apply(&mv);
                        child.switch_sides();
                        perft_detailed(&child, depth - 1, &mut local);
                    }
                    local
                })
            })
            .collect();

        let mut total = PerftCounts::default();
        for h in handles {
            total += h.join().unwrap();
        }
        total
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perft_zero_is_one_for_any_position() {
        let pos = Position::start_position();
        let mut acc = PerftCounts::default();
        perft_detailed(&pos, 0, &mut acc);
        assert_eq!(acc.nodes, 1);
        let cache = PerftCache::with_byte_budget(1 << 20).unwrap();
        assert_eq!(perft_fast(&pos, 0, &cache), 1);
    }

    #[test]
    fn start_position_perft_one_through_four() {
        let pos = Position::start_position();
        let cache = PerftCache::with_byte_budget(1 << 22).unwrap();
        let expected = [1u64, 20, 400, 8902, 197_281];
        for (depth, &want) in expected.iter().enumerate() {
            assert_eq!(perft_fast(&pos, depth as u32, &cache), want, "perft({depth})");
        }
    }

    #[test]
    fn perft_fast_matches_detailed_move_count() {
        let pos = Position::start_position();
        for depth in 1..=3u32 {
            let cache = PerftCache::with_byte_budget(1 << 20).unwrap();
            let fast = perft_fast(&pos, depth, &cache);
            let mut detailed = PerftCounts::default();
            perft_detailed(&pos, depth, &mut detailed);
            assert_eq!(fast, detailed.nodes, "depth {depth}");
        }
    }

    #[test]
    fn multithreaded_total_matches_single_threaded() {
        let pos = Position::start_position();
        let cache_st = PerftCache::with_byte_budget(1 << 22).unwrap();
        let single = perft_fast(&pos, 4, &cache_st);
        let cache_mt = PerftCache::with_byte_budget(1 << 22).unwrap();
        let multi = perft_fast_parallel(&pos, 4, 4, &cache_mt);
        assert_eq!(single, multi);
    }

    #[test]
    fn divide_sums_to_perft_total() {
        let pos = Position::start_position();
        let cache = PerftCache::with_byte_budget(1 << 22).unwrap();
        let breakdown = divide(&pos, 4, &cache);
        let sum: u64 = breakdown.iter().map(|(_, c)| c).sum();
        assert_eq!(sum, perft_fast(&pos, 4, &cache));
    }

    #[test]
    fn mirrored_start_position_matches_perft_total() {
        // The start position is a fixed point of `mirror` (self-symmetric),
        // so its perft total must equal the mirrored position's — §8
        // invariant 7, exercised at a depth cheap enough for a unit test.
        let pos = Position::start_position();
        let mirrored = pos.mirror();
        let cache = PerftCache::with_byte_budget(1 << 20).unwrap();
        let cache_mirrored = PerftCache::with_byte_budget(1 << 20).unwrap();
        assert_eq!(perft_fast(&pos, 3, &cache), perft_fast(&mirrored, 3, &cache_mirrored));
    }
}
