//! Reference-position perft totals (§8), checked against published node
//! counts for a handful of well-known positions used across the engine-test
//! corpus (starting position, Kiwipete, and friends).

use juddperft::cache::PerftCache;
use juddperft::fen::from_fen;
use juddperft::perft::perft_fast;

struct TestPosition {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(u32, u64)],
}

/// Depths kept small enough to run as part of the ordinary test suite; the
/// full depths from the reference table (§8) are exercised by the
/// `#[ignore]`d cases below.
const TEST_POSITIONS: &[TestPosition] = &[
    TestPosition {
        name: "initial position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8_902), (4, 197_281)],
    },
    TestPosition {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depths: &[(1, 48), (2, 2_039), (3, 97_862)],
    },
    TestPosition {
        name: "rook and king endgame",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depths: &[(1, 14), (2, 191), (3, 2_812)],
    },
    TestPosition {
        name: "position 4 mirror (white to move)",
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        depths: &[(1, 6), (2, 264), (3, 9_467)],
    },
    TestPosition {
        name: "position 4 mirror (black to move)",
        fen: "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
        depths: &[(1, 6), (2, 264), (3, 9_467)],
    },
    TestPosition {
        name: "position 6",
        fen: "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        depths: &[(1, 44), (2, 1_486), (3, 62_379)],
    },
];

#[test]
fn perft_reference_positions_shallow_depths() {
    for position in TEST_POSITIONS {
        let pos = from_fen(position.fen).expect("reference FEN parses");
        let cache = PerftCache::with_byte_budget(1 << 22).expect("cache allocation");
        for &(depth, expected) in position.depths {
            let nodes = perft_fast(&pos, depth, &cache);
            assert_eq!(nodes, expected, "{} at depth {depth}", position.name);
        }
    }
}

/// Full reference-table depths (§8). These run into the hundreds of
/// millions to billions of nodes and are not part of the default test run.
#[test]
#[ignore = "full reference-table depth, run explicitly with --ignored"]
fn perft_reference_table_full_depths() {
    const FULL_DEPTH_POSITIONS: &[(&str, u32, u64)] = &[
        (
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            7,
            3_195_901_860,
        ),
        (
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            5,
            193_690_690,
        ),
        ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 7, 178_633_661),
        (
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            6,
            706_045_033,
        ),
        (
            "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
            6,
            706_045_033,
        ),
        (
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            5,
            89_941_194,
        ),
    ];

    for &(fen, depth, expected) in FULL_DEPTH_POSITIONS {
        let pos = from_fen(fen).expect("reference FEN parses");
        let cache = PerftCache::with_byte_budget(1 << 26).expect("cache allocation");
        assert_eq!(perft_fast(&pos, depth, &cache), expected, "{fen} at depth {depth}");
    }
}
