//! Forsyth-Edwards Notation parsing and emission (§6).
//!
//! Six space-separated fields: piece placement (ranks 8->1, files a->h
//! within a rank, digits 1-8 for empty runs), active colour, castling
//! availability, en-passant target square, half-move clock, full-move
//! number.

use crate::error::PerftError;
use crate::position::{piece, Position};

/// Parses `fen` into a `Position`. On any malformed field the position is
/// not constructed at all (§7: "position is left empty or partially
/// loaded" — here that means the caller gets an `Err` instead of a
/// half-built value).
pub fn from_fen(fen: &str) -> Result<Position, PerftError> {
    let mut fields = fen.split_whitespace();
    let placement = fields
        .next()
        .ok_or_else(|| PerftError::MalformedFen("missing piece placement field".into()))?;

    let mut pos = Position::empty();
    let mut square: i32 = 63;
    for ch in placement.chars() {
        if square < 0 {
            return Err(PerftError::MalformedFen("piece placement overflows the board".into()));
        }
        match ch {
            '/' => continue,
            '1'..='8' => {
                let n = ch.to_digit(10).unwrap() as i32;
                square -= n;
            }
            _ => {
                let code = piece_code_for_char(ch)
                    .ok_or_else(|| PerftError::MalformedFen(format!("unknown piece letter '{ch}'")))?;
                pos.set_piece(code, square as u8);
                square -= 1;
            }
        }
    }

    if let Some(active) = fields.next() {
        pos.set_black_to_move(active.contains('b'));
    }

    if let Some(castling) = fields.next() {
        if castling != "-" {
            pos.set_white_can_castle_short(castling.contains('K'));
            pos.set_white_can_castle_long(castling.contains('Q'));
            pos.set_black_can_castle_short(castling.contains('k'));
            pos.set_black_can_castle_long(castling.contains('q'));
        }
    }

    if let Some(ep) = fields.next() {
        if ep != "-" {
            let mut chars = ep.chars();
            let file = chars
                .next()
                .filter(|c| ('a'..='h').contains(c))
                .ok_or_else(|| PerftError::MalformedFen(format!("bad en-passant square '{ep}'")))?;
            let rank = chars
                .next()
                .ok_or_else(|| PerftError::MalformedFen(format!("bad en-passant square '{ep}'")))?;
            let file_idx = 7 - (file as u8 - b'a');
            let sq = match rank {
                '3' => 16 + file_idx,
                '6' => 40 + file_idx,
                _ => return Err(PerftError::MalformedFen(format!("bad en-passant rank '{ep}'"))),
            };
            let ep_code = if rank == '3' { piece::WEP } else { piece::BEP };
            pos.set_piece(ep_code, sq);
        }
    }

    if let Some(halfmove) = fields.next() {
        pos.halfmove_clock = halfmove
            .parse()
            .map_err(|_| PerftError::MalformedFen(format!("bad half-move clock '{halfmove}'")))?;
    }

    if let Some(fullmove) = fields.next() {
        pos.move_number = fullmove
            .parse()
            .map_err(|_| PerftError::MalformedFen(format!("bad full-move number '{fullmove}'")))?;
    }

    pos.hash = pos.calculate_hash();
    Ok(pos)
}

fn piece_code_for_char(ch: char) -> Option<u8> {
    Some(match ch {
        'P' => piece::WPAWN,
        'N' => piece::WKNIGHT,
        'B' => piece::WBISHOP,
        'R' => piece::WROOK,
        'Q' => piece::WQUEEN,
        'K' => piece::WKING,
        'p' => piece::BPAWN,
        'n' => piece::BKNIGHT,
        'b' => piece::BBISHOP,
        'r' => piece::BROOK,
        'q' => piece::BQUEEN,
        'k' => piece::BKING,
        _ => return None,
    })
}

/// Algebraic name of `square` (e.g. `4` -> `"d1"`), using the same
/// file/rank formula as the en-passant field above.
pub fn square_name(square: u8) -> String {
    let file = (b'h' - (square % 8)) as char;
    let rank = (b'1' + square / 8) as char;
    format!("{file}{rank}")
}

fn char_for_piece_code(code: u8) -> Option<char> {
    Some(match code {
        piece::WPAWN => 'P',
        piece::WKNIGHT => 'N',
        piece::WBISHOP => 'B',
        piece::WROOK => 'R',
        piece::WQUEEN => 'Q',
        piece::WKING => 'K',
        piece::BPAWN => 'p',
        piece::BKNIGHT => 'n',
        piece::BBISHOP => 'b',
        piece::BROOK => 'r',
        piece::BQUEEN => 'q',
        piece::BKING => 'k',
        _ => return None,
    })
}

impl Position {
    /// Emits this position as a FEN string. Round-trips every value this
    /// crate itself produces (start position, loaded FENs, and any
    /// position reached by `apply`); EP markers are recognised and
    /// rendered as the en-passant field rather than a piece letter.
    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(64);
        let mut blanks = 0u32;
        let mut ep_square: Option<u8> = None;

        for square in (0..64u8).rev() {
            let code = self.piece_at(square);
            if piece::kind(code) == piece::WEMPTY {
                blanks += 1;
            } else if code == piece::WEP || code == piece::BEP {
                blanks += 1;
                ep_square = Some(square);
            } else {
                if blanks != 0 {
                    out.push_str(&blanks.to_string());
                    blanks = 0;
                }
                out.push(char_for_piece_code(code).expect("all non-EP, non-empty codes map to a letter"));
            }

            if square % 8 == 0 {
                if blanks != 0 {
                    out.push_str(&blanks.to_string());
                    blanks = 0;
                }
                if square != 0 {
                    out.push('/');
                }
            }
        }

        out.push(' ');
        out.push(if self.black_to_move() { 'b' } else { 'w' });
        out.push(' ');

        let any_castle = self.white_can_castle_short()
            || self.white_can_castle_long()
            || self.black_can_castle_short()
            || self.black_can_castle_long();
        if !any_castle {
            out.push('-');
        } else {
            if self.white_can_castle_short() {
                out.push('K');
            }
            if self.white_can_castle_long() {
                out.push('Q');
            }
            if self.black_can_castle_short() {
                out.push('k');
            }
            if self.black_can_castle_long() {
                out.push('q');
            }
        }
        out.push(' ');

        match ep_square {
            Some(sq) => {
                let file = (b'h' - (sq % 8)) as char;
                let rank = (b'1' + sq / 8) as char;
                out.push(file);
                out.push(rank);
            }
            None => out.push('-'),
        }
        out.push(' ');

        out.push_str(&self.halfmove_clock.to_string());
        out.push(' ');
        out.push_str(&self.move_number.to_string());
        out
    }
}
