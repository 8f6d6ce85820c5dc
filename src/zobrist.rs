//! Zobrist hashing for the four-plane position encoding.
//!
//! Provides a deterministic (seeded) table of random 64-bit keys and the
//! incremental-hash invariant every reachable `Position` must satisfy:
//! `hash` equals the XOR of the piece-on-square key of every non-empty
//! square, plus the side-to-move key (if black to move), plus each
//! currently-held castling-right key.

use rand::prelude::*;
use std::sync::LazyLock;

/// Number of perft depths a single process is expected to run
/// (spec: depth-salt array indexed 0..23 — "sufficient for perft <= 12 from
/// the start position" when paired with the 60-bit packed cache count).
pub const MAX_PERFT_DEPTH: usize = 24;

pub struct ZobristKeys {
    /// Indexed by the 16 piece codes of §3 (codes 0 and 8 are unused empty
    /// placeholders and are simply never looked up).
    pub piece_on_square: [[u64; 64]; 16],
    pub black_to_move: u64,
    pub white_can_castle_short: u64,
    pub white_can_castle_long: u64,
    pub black_can_castle_short: u64,
    pub black_can_castle_long: u64,
    pub perft_depth: [u64; MAX_PERFT_DEPTH],

    /// Pre-combined keys bundling the four piece-square XORs of a castling
    /// move plus the castling-rights XOR, so `apply` can XOR a single key
    /// rather than five.
    pub do_white_castle_short: u64,
    pub do_white_castle_long: u64,
    pub do_black_castle_short: u64,
    pub do_black_castle_long: u64,
}

impl ZobristKeys {
    /// Fixed seed: the keys must be reproducible across processes so that
    /// cached counts (and test fixtures) stay valid between runs, and so
    /// that invariant 6 ("same totals regardless of ... RNG seed for the
    /// Zobrist keys") is trivially true for any single build of this crate.
    const SEED: u64 = 0x4a75_6464_5065_7266; // "JuddPerf" in ASCII hex, arbitrarily chosen

    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(Self::SEED);

        let mut piece_on_square = [[0u64; 64]; 16];
        for piece in piece_on_square.iter_mut() {
            for key in piece.iter_mut() {
                *key = rng.gen();
            }
        }

        let mut perft_depth = [0u64; MAX_PERFT_DEPTH];
        for key in perft_depth.iter_mut() {
            *key = rng.gen();
        }

        let black_to_move = rng.gen();
        let white_can_castle_short = rng.gen();
        let white_can_castle_long = rng.gen();
        let black_can_castle_short = rng.gen();
        let black_can_castle_long = rng.gen();

        let mut keys = ZobristKeys {
            piece_on_square,
            black_to_move,
            white_can_castle_short,
            white_can_castle_long,
            black_can_castle_short,
            black_can_castle_long,
            perft_depth,
            do_white_castle_short: 0,
            do_white_castle_long: 0,
            do_black_castle_short: 0,
            do_black_castle_long: 0,
        };

        use crate::position::piece;
        // Square mapping (§3 / bitboard.rs): file index runs h=0..a=7 within
        // a rank, so e1=3, g1=1, h1=0, f1=2, c1=5, a1=7, d1=4 (and +56 for
        // rank 8). King e1->g1, rook h1->f1.
        keys.do_white_castle_short = keys.piece_on_square[piece::WKING as usize][3]
            ^ keys.piece_on_square[piece::WKING as usize][1]
            ^ keys.piece_on_square[piece::WROOK as usize][0]
            ^ keys.piece_on_square[piece::WROOK as usize][2]
            ^ keys.white_can_castle_short;
        // White long: king e1->c1, rook a1->d1.
        keys.do_white_castle_long = keys.piece_on_square[piece::WKING as usize][3]
            ^ keys.piece_on_square[piece::WKING as usize][5]
            ^ keys.piece_on_square[piece::WROOK as usize][7]
            ^ keys.piece_on_square[piece::WROOK as usize][4]
            ^ keys.white_can_castle_long;
        // Black short: king e8->g8, rook h8->f8.
        keys.do_black_castle_short = keys.piece_on_square[piece::BKING as usize][59]
            ^ keys.piece_on_square[piece::BKING as usize][57]
            ^ keys.piece_on_square[piece::BROOK as usize][56]
            ^ keys.piece_on_square[piece::BROOK as usize][58]
            ^ keys.black_can_castle_short;
        // Black long: king e8->c8, rook a8->d8.
        keys.do_black_castle_long = keys.piece_on_square[piece::BKING as usize][59]
            ^ keys.piece_on_square[piece::BKING as usize][61]
            ^ keys.piece_on_square[piece::BROOK as usize][63]
            ^ keys.piece_on_square[piece::BROOK as usize][60]
            ^ keys.black_can_castle_long;

        keys
    }
}

/// Process-global, lazily-initialized, immutable Zobrist table. Constructed
/// once (§9: "construct once at process start; expose as immutable
/// reference"); no file-scope mutable global.
pub static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_reproducible_across_instances() {
        let a = ZobristKeys::new();
        let b = ZobristKeys::new();
        assert_eq!(a.piece_on_square, b.piece_on_square);
        assert_eq!(a.black_to_move, b.black_to_move);
        assert_eq!(a.do_white_castle_short, b.do_white_castle_short);
    }

    #[test]
    fn castle_keys_are_combination_of_constituent_keys() {
        use crate::position::piece;
        let k = &ZOBRIST;
        // e1=3, g1=1, h1=0, f1=2.
        let expected = k.piece_on_square[piece::WKING as usize][3]
            ^ k.piece_on_square[piece::WKING as usize][1]
            ^ k.piece_on_square[piece::WROOK as usize][0]
            ^ k.piece_on_square[piece::WROOK as usize][2]
            ^ k.white_can_castle_short;
        assert_eq!(k.do_white_castle_short, expected);
    }
}
