//! Domain error taxonomy (§7). No exceptions propagate through the core;
//! every fallible entry point returns a `Result<_, PerftError>` instead.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PerftError {
    /// FEN failed to parse; the position is left unmodified (or, for
    /// `Position::from_fen`, simply never constructed).
    MalformedFen(String),
    /// The transposition cache could not be allocated even at the hard
    /// floor size (~1 MiB).
    CacheAllocationFailed { requested_bytes: usize },
    /// The move generator would have written past `MOVELIST_SIZE`. No
    /// legal chess position exceeds 218 moves, well under the 256-slot
    /// buffer, so this can only fire on a corrupted position; `MoveList`
    /// itself enforces the bound with a `debug_assert!` rather than
    /// threading a `Result` through every `push`, since the invariant is a
    /// property of the rules of chess, not a runtime contingency. Kept in
    /// the taxonomy so diagnostic tooling built on top of this crate has
    /// somewhere to report the violation if the assertion is ever compiled
    /// out.
    MoveListOverflow,
    /// Diagnostic-mode check: the incrementally maintained hash diverged
    /// from a full recomputation.
    HashMismatch { incremental: u64, recomputed: u64 },
}

impl fmt::Display for PerftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerftError::MalformedFen(msg) => write!(f, "illegal position: {msg}"),
            PerftError::CacheAllocationFailed { requested_bytes } => {
                write!(f, "cache allocation failed (requested {requested_bytes} bytes)")
            }
            PerftError::MoveListOverflow => write!(f, "move list overflow"),
            PerftError::HashMismatch { incremental, recomputed } => write!(
                f,
                "hash mismatch: incremental={incremental:#018x} recomputed={recomputed:#018x}"
            ),
        }
    }
}

impl std::error::Error for PerftError {}
