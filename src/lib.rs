// Crate root - export modules
pub mod bitboard;
pub mod cache;
pub mod error;
pub mod fen;
pub mod movegen;
pub mod moves;
pub mod perft;
pub mod position;
pub mod zobrist;
