//! FEN parsing and formatting, plus the board pretty-printer.

use crate::bits::bit;
use crate::error::FenError;
use crate::eval::evaluate;
use crate::node::Node;
use crate::params::Params;
use crate::tables::{square_value, KING_ATK, RANKS};
use crate::types::{
    color_of, sq, sqr, sqr_str, PieceBoard, BISHOP, BLACK, BLACK_LONG, BLACK_SHORT, CHECK_FLAG,
    COLOR_MASK, KING, KNIGHT, PAWN, QUEEN, ROOK, STATE_MASK, VALUE_OF, WHITE, WHITE_LONG,
    WHITE_SHORT,
};
use crate::zobrist::ZOBRIST;

fn piece_from_char(piece: char) -> Option<usize> {
    let color = if piece.is_ascii_uppercase() { WHITE } else { BLACK };
    let base = match piece.to_ascii_lowercase() {
        'p' => PAWN,
        'n' => KNIGHT,
        'b' => BISHOP,
        'r' => ROOK,
        'q' => QUEEN,
        'k' => KING,
        _ => return None,
    };
    Some(color | base)
}

fn piece_to_char(piece: usize) -> char {
    let base = match piece & !1 {
        PAWN => 'p',
        KNIGHT => 'n',
        BISHOP => 'b',
        ROOK => 'r',
        QUEEN => 'q',
        KING => 'k',
        _ => '?',
    };
    if color_of(piece) == WHITE {
        base.to_ascii_uppercase()
    } else {
        base
    }
}

/// Parse a FEN string into a fresh root node and board array.
///
/// Rejects structurally impossible positions (king counts, adjacent kings,
/// back-rank pawns, side not to move in check). Castling rights that do
/// not match the piece placement are dropped rather than rejected.
pub fn parse(fen: &str, params: &Params) -> Result<(Node, PieceBoard), FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(FenError::TooFewParts { found: parts.len() });
    }

    let mut board: PieceBoard = [0; 64];
    let mut node = Node::new(0);

    for (rank_idx, rank_str) in parts[0].split('/').enumerate() {
        if rank_idx >= 8 {
            return Err(FenError::TooManyRanks);
        }
        let rank = 7 - rank_idx;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
            } else {
                let piece = piece_from_char(c).ok_or(FenError::InvalidPiece { piece: c })?;
                if file >= 8 {
                    return Err(FenError::TooManyFiles { rank: rank + 1 });
                }
                let s = sqr(file, rank);
                board[s] = piece;
                node.pc[color_of(piece)] |= bit(s);
                node.pc[piece] |= bit(s);
                file += 1;
            }
        }
        if file > 8 {
            return Err(FenError::TooManyFiles { rank: rank + 1 });
        }
    }

    if !crate::bits::single_bit(node.pc[WHITE | KING]) {
        return Err(FenError::BadKingCount { color: "white" });
    }
    if !crate::bits::single_bit(node.pc[BLACK | KING]) {
        return Err(FenError::BadKingCount { color: "black" });
    }
    if (node.pc[WHITE | PAWN] | node.pc[BLACK | PAWN]) & (RANKS[0] | RANKS[7]) != 0 {
        return Err(FenError::PawnOnBackRank);
    }

    node.king[WHITE] = crate::bits::low_square(node.pc[WHITE | KING]);
    node.king[BLACK] = crate::bits::low_square(node.pc[BLACK | KING]);
    if KING_ATK[node.king[WHITE]] & node.pc[BLACK | KING] != 0 {
        return Err(FenError::KingsAdjacent);
    }

    node.state = match parts[1] {
        "w" => WHITE as u32,
        "b" => BLACK as u32,
        other => {
            return Err(FenError::InvalidSideToMove {
                found: other.to_string(),
            })
        }
    };

    for c in parts[2].chars() {
        match c {
            'K' => node.state |= WHITE_SHORT,
            'Q' => node.state |= WHITE_LONG,
            'k' => node.state |= BLACK_SHORT,
            'q' => node.state |= BLACK_LONG,
            '-' => {}
            _ => return Err(FenError::InvalidCastling { castling: c }),
        }
    }
    // Drop rights the piece placement cannot support; the generator
    // trusts that a castling right implies king and rook at home.
    if board[sq::E1] != (WHITE | KING) || board[sq::H1] != (WHITE | ROOK) {
        node.state &= !WHITE_SHORT;
    }
    if board[sq::E1] != (WHITE | KING) || board[sq::A1] != (WHITE | ROOK) {
        node.state &= !WHITE_LONG;
    }
    if board[sq::E8] != (BLACK | KING) || board[sq::H8] != (BLACK | ROOK) {
        node.state &= !BLACK_SHORT;
    }
    if board[sq::E8] != (BLACK | KING) || board[sq::A8] != (BLACK | ROOK) {
        node.state &= !BLACK_LONG;
    }

    node.ep = if parts[3] == "-" {
        sq::NONE
    } else {
        let chars: Vec<char> = parts[3].chars().collect();
        let valid = chars.len() == 2
            && ('a'..='h').contains(&chars[0])
            && ('1'..='8').contains(&chars[1]);
        if !valid {
            return Err(FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            });
        }
        let file = chars[0] as usize - 'a' as usize;
        let rank = chars[1] as usize - '1' as usize;
        let expected_rank = if node.state & COLOR_MASK == WHITE as u32 { 5 } else { 2 };
        if rank != expected_rank {
            return Err(FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            });
        }
        sqr(file, rank)
    };

    if parts.len() >= 5 {
        node.rcount = parts[4].parse().unwrap_or(0);
    }
    if parts.len() >= 6 {
        // Full moves to half moves played.
        let fullmove: i32 = parts[5].parse().unwrap_or(1);
        node.mcount = 2 * (fullmove.max(1) - 1) + node.color_to_move() as i32;
    }

    // Derived totals and keys.
    for s in 0..64 {
        let piece = board[s];
        if piece != 0 {
            node.piece_key ^= ZOBRIST.piece[piece][s];
            if piece & !1 != KING {
                node.material[color_of(piece)] += VALUE_OF[piece];
                node.sqr_val[color_of(piece)] += square_value(piece, s);
            }
        }
    }
    node.position_key = node.piece_key
        ^ ZOBRIST.state[(node.state & STATE_MASK) as usize]
        ^ ZOBRIST.ep[node.ep];

    node.kcross[WHITE] = node.rook_xo(node.king[WHITE]);
    node.kcross[BLACK] = node.rook_xo(node.king[BLACK]);
    node.kdiags[WHITE] = node.bishop_xo(node.king[WHITE]);
    node.kdiags[BLACK] = node.bishop_xo(node.king[BLACK]);

    let stm = node.color_to_move();
    if node.find_checkers(stm ^ 1) != 0 {
        return Err(FenError::SideNotToMoveInCheck);
    }
    node.chkrs = node.find_checkers(stm);
    if node.chkrs != 0 {
        node.state |= CHECK_FLAG;
    }

    evaluate(&mut node, None, params);
    Ok((node, board))
}

/// Format the position as a FEN string.
#[must_use]
pub fn format(node: &Node, board: &PieceBoard) -> String {
    let mut placement = String::new();
    for rank in (0..8).rev() {
        let mut empty = 0;
        for file in 0..8 {
            let piece = board[sqr(file, rank)];
            if piece == 0 {
                empty += 1;
            } else {
                if empty > 0 {
                    placement.push_str(&empty.to_string());
                    empty = 0;
                }
                placement.push(piece_to_char(piece));
            }
        }
        if empty > 0 {
            placement.push_str(&empty.to_string());
        }
        if rank > 0 {
            placement.push('/');
        }
    }

    let stm = if node.color_to_move() == WHITE { "w" } else { "b" };
    let mut castling = String::new();
    if node.state & WHITE_SHORT != 0 {
        castling.push('K');
    }
    if node.state & WHITE_LONG != 0 {
        castling.push('Q');
    }
    if node.state & BLACK_SHORT != 0 {
        castling.push('k');
    }
    if node.state & BLACK_LONG != 0 {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }
    let ep = if node.ep == sq::NONE {
        "-".to_string()
    } else {
        sqr_str(node.ep)
    };

    format!(
        "{} {} {} {} {} {}",
        placement,
        stm,
        castling,
        ep,
        node.rcount,
        1 + node.mcount / 2
    )
}

/// Multi-line diagram for the `print` debug command.
#[must_use]
pub fn pretty(node: &Node, board: &PieceBoard) -> String {
    let mut out = String::new();
    for rank in (0..8).rev() {
        out.push_str(&format!("{} ", rank + 1));
        for file in 0..8 {
            let piece = board[sqr(file, rank)];
            if piece == 0 {
                out.push_str(". ");
            } else {
                out.push(piece_to_char(piece));
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h\n");
    out.push_str(&format!("key {:016x}", node.position_key));
    if node.in_check() {
        out.push_str(" (check)");
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::count;

    pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn parse_start_position() {
        let params = Params::default();
        let (node, board) = parse(START_FEN, &params).expect("start position parses");
        assert_eq!(node.color_to_move(), WHITE);
        assert_eq!(count(node.pc[WHITE]), 16);
        assert_eq!(count(node.pc[BLACK]), 16);
        assert_eq!(node.king[WHITE], sq::E1);
        assert_eq!(node.king[BLACK], sq::E8);
        assert_eq!(board[sq::D1], WHITE | QUEEN);
        assert_eq!(node.material[WHITE], crate::types::START_MATERIAL);
        assert_eq!(node.material[BLACK], crate::types::START_MATERIAL);
        assert!(!node.in_check());
    }

    #[test]
    fn round_trip() {
        let params = Params::default();
        for fen in [
            START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        ] {
            let (node, board) = parse(fen, &params).expect("valid test fen");
            let out = format(&node, &board);
            let (renode, reboard) = parse(&out, &params).expect("round trip parses");
            assert_eq!(node.position_key, renode.position_key, "fen {fen}");
            assert_eq!(board, reboard);
        }
    }

    #[test]
    fn rejects_bad_positions() {
        let params = Params::default();
        // No black king.
        assert!(parse("8/8/8/8/8/8/8/K7 w - - 0 1", &params).is_err());
        // Two white kings.
        assert!(parse("k7/8/8/8/8/8/8/KK6 w - - 0 1", &params).is_err());
        // Adjacent kings.
        assert!(parse("8/8/8/3kK3/8/8/8/8 w - - 0 1", &params).is_err());
        // Pawn on the back rank.
        assert!(parse("k6P/8/8/8/8/8/8/K7 w - - 0 1", &params).is_err());
        // Side not to move in check.
        assert!(parse("k6R/8/8/8/8/8/8/K7 w - - 0 1", &params).is_err());
        // Garbage fields.
        assert!(parse("not a fen", &params).is_err());
        assert!(parse("8/8/8/8/8/8/8/8 x - - 0 1", &params).is_err());
    }

    #[test]
    fn drops_unsupported_castling_rights() {
        let params = Params::default();
        // Rooks are missing, so the advertised rights must be dropped.
        let (node, _) = parse("4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1", &params).expect("parses");
        assert_eq!(node.state & crate::types::CASTLE_MASK, 0);
    }
}
