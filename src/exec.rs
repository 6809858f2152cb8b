//! Move execution and retraction.
//!
//! `exec` writes the position after a move into the *child* node, leaving
//! the parent untouched; only the shared 8×8 piece array and the seen-set
//! are mutated in place. `undo` therefore has almost nothing to do:
//! restore the touched board squares and drop the parent's key from the
//! seen-set.

use crate::bits::bit;
use crate::eval::evaluate;
use crate::history::SeenSet;
use crate::moves::Move;
use crate::node::Node;
use crate::params::Params;
use crate::stats::Stats;
use crate::tables::{square_value, TOUCH};
use crate::types::{
    mt, sq, CHECK_FLAG, COLOR_MASK, KING, PAWN, ROOK, STATE_MASK, VALUE_OF, WHITE,
};
use crate::zobrist::ZOBRIST;

#[cfg(debug_assertions)]
fn validate_move(parent: &Node, board: &crate::types::PieceBoard, mv: Move) {
    use crate::types::{color_of, is_piece};
    let color = parent.color_to_move();
    assert!(mv.is_valid());
    assert!(is_piece(mv.pc()));
    assert_eq!(color_of(mv.pc()), color);
    assert_eq!(board[mv.from()], mv.pc());
    assert!(parent.pc[color] & bit(mv.from()) != 0);
    assert!(parent.pc[mv.pc()] & bit(mv.from()) != 0);
    assert!(parent.pc[color] & bit(mv.to()) == 0);
    let cap = mv.cap();
    assert!(cap == 0 || (cap >= PAWN && cap < KING && color_of(cap) != color));
    if mv.kind() == mt::EN_PASSANT {
        assert_eq!(mv.to(), parent.ep);
    } else if cap != 0 {
        assert_eq!(board[mv.to()], cap);
    }
}

/// Execute `mv` from `parent` into `dest` and evaluate the result.
pub fn exec(
    parent: &Node,
    dest: &mut Node,
    board: &mut crate::types::PieceBoard,
    seen: &mut SeenSet,
    mv: Move,
    params: &Params,
    stats: &mut Stats,
) {
    #[cfg(debug_assertions)]
    validate_move(parent, board, mv);

    let color = parent.color_to_move();
    let enemy = color ^ 1;
    let kind = mv.kind();
    let from = mv.from();
    let to = mv.to();
    let piece = mv.pc();
    let cap = mv.cap();
    let promo = mv.promo();
    let z = &*ZOBRIST;

    stats.execs += 1;
    seen.insert(parent.position_key);

    dest.pc = parent.pc;
    dest.last_move = mv;
    dest.last_piece = piece;
    dest.capture = cap;
    dest.mcount = parent.mcount + 1;
    dest.king = parent.king;
    dest.material = parent.material;
    dest.sqr_val = parent.sqr_val;

    match kind {
        mt::NORMAL => {
            dest.effected = bit(from) | bit(to);
            dest.state = (parent.state ^ COLOR_MASK) & TOUCH[from] & TOUCH[to];
            dest.ep = sq::NONE;
            dest.sqr_val[color] += square_value(piece, to) - square_value(piece, from);
            if cap != 0 {
                dest.material[enemy] -= VALUE_OF[cap];
                dest.sqr_val[enemy] -= square_value(cap, to);
                dest.rcount = 0;
                dest.piece_key = parent.piece_key
                    ^ z.piece[piece][from]
                    ^ z.piece[piece][to]
                    ^ z.piece[cap][to];
                dest.pc[enemy] ^= bit(to);
                dest.pc[cap] ^= bit(to);
            } else {
                dest.rcount = parent.rcount + 1;
                dest.piece_key = parent.piece_key ^ z.piece[piece][from] ^ z.piece[piece][to];
            }
            dest.pc[color] ^= dest.effected;
            dest.pc[piece] ^= dest.effected;
            board[to] = piece;
            board[from] = 0;
        }

        mt::PAWN_PUSH => {
            dest.effected = bit(from) | bit(to);
            dest.state = (parent.state ^ COLOR_MASK) & STATE_MASK;
            dest.ep = sq::NONE;
            dest.rcount = 0;
            if promo != 0 {
                dest.material[color] += VALUE_OF[promo] - VALUE_OF[piece];
                dest.sqr_val[color] += square_value(promo, to) - square_value(piece, from);
                dest.piece_key = parent.piece_key ^ z.piece[piece][from] ^ z.piece[promo][to];
                dest.pc[color] ^= dest.effected;
                dest.pc[piece] ^= bit(from);
                dest.pc[promo] ^= bit(to);
                board[to] = promo;
            } else {
                dest.sqr_val[color] += square_value(piece, to) - square_value(piece, from);
                dest.piece_key = parent.piece_key ^ z.piece[piece][from] ^ z.piece[piece][to];
                dest.pc[color] ^= dest.effected;
                dest.pc[piece] ^= dest.effected;
                board[to] = piece;
            }
            board[from] = 0;
        }

        mt::PAWN_LUNG => {
            dest.effected = bit(from) | bit(to);
            dest.state = (parent.state ^ COLOR_MASK) & STATE_MASK;
            dest.ep = if color == WHITE { from + 8 } else { from - 8 };
            dest.rcount = 0;
            dest.sqr_val[color] += square_value(piece, to) - square_value(piece, from);
            dest.piece_key = parent.piece_key ^ z.piece[piece][from] ^ z.piece[piece][to];
            dest.pc[color] ^= dest.effected;
            dest.pc[piece] ^= dest.effected;
            board[to] = piece;
            board[from] = 0;
        }

        mt::PAWN_CAPTURE => {
            dest.effected = bit(from) | bit(to);
            dest.state = (parent.state ^ COLOR_MASK) & TOUCH[from] & TOUCH[to];
            dest.ep = sq::NONE;
            dest.rcount = 0;
            dest.material[enemy] -= VALUE_OF[cap];
            dest.sqr_val[enemy] -= square_value(cap, to);
            if promo != 0 {
                dest.material[color] += VALUE_OF[promo] - VALUE_OF[piece];
                dest.sqr_val[color] += square_value(promo, to) - square_value(piece, from);
                dest.piece_key = parent.piece_key
                    ^ z.piece[piece][from]
                    ^ z.piece[promo][to]
                    ^ z.piece[cap][to];
                dest.pc[color] ^= dest.effected;
                dest.pc[piece] ^= bit(from);
                dest.pc[promo] ^= bit(to);
                board[to] = promo;
            } else {
                dest.sqr_val[color] += square_value(piece, to) - square_value(piece, from);
                dest.piece_key = parent.piece_key
                    ^ z.piece[piece][from]
                    ^ z.piece[piece][to]
                    ^ z.piece[cap][to];
                dest.pc[color] ^= dest.effected;
                dest.pc[piece] ^= dest.effected;
                board[to] = piece;
            }
            dest.pc[enemy] ^= bit(to);
            dest.pc[cap] ^= bit(to);
            board[from] = 0;
        }

        mt::EN_PASSANT => {
            let cap_sqr = if color == WHITE { to - 8 } else { to + 8 };
            dest.effected = bit(from) | bit(to) | bit(cap_sqr);
            dest.state = (parent.state ^ COLOR_MASK) & STATE_MASK;
            dest.ep = sq::NONE;
            dest.rcount = 0;
            dest.material[enemy] -= VALUE_OF[cap];
            dest.sqr_val[enemy] -= square_value(cap, cap_sqr);
            dest.sqr_val[color] += square_value(piece, to) - square_value(piece, from);
            dest.piece_key = parent.piece_key
                ^ z.piece[piece][from]
                ^ z.piece[piece][to]
                ^ z.piece[cap][cap_sqr];
            dest.pc[color] ^= bit(from) | bit(to);
            dest.pc[piece] ^= bit(from) | bit(to);
            dest.pc[enemy] ^= bit(cap_sqr);
            dest.pc[cap] ^= bit(cap_sqr);
            board[to] = piece;
            board[from] = 0;
            board[cap_sqr] = 0;
        }

        mt::KING_MOVE => {
            dest.effected = bit(from) | bit(to);
            dest.state = (parent.state ^ COLOR_MASK) & TOUCH[from] & TOUCH[to];
            dest.ep = sq::NONE;
            dest.king[color] = to;
            if cap != 0 {
                dest.material[enemy] -= VALUE_OF[cap];
                dest.sqr_val[enemy] -= square_value(cap, to);
                dest.rcount = 0;
                dest.piece_key = parent.piece_key
                    ^ z.piece[piece][from]
                    ^ z.piece[piece][to]
                    ^ z.piece[cap][to];
                dest.pc[enemy] ^= bit(to);
                dest.pc[cap] ^= bit(to);
            } else {
                dest.rcount = parent.rcount + 1;
                dest.piece_key = parent.piece_key ^ z.piece[piece][from] ^ z.piece[piece][to];
            }
            dest.pc[color] ^= dest.effected;
            dest.pc[piece] ^= dest.effected;
            board[to] = piece;
            board[from] = 0;
        }

        mt::CASTLE_SHORT => {
            let (rook_from, rook_to) = if color == WHITE {
                (sq::H1, sq::F1)
            } else {
                (sq::H8, sq::F8)
            };
            dest.effected = bit(from) | bit(to) | bit(rook_from) | bit(rook_to);
            dest.state = (parent.state ^ COLOR_MASK) & TOUCH[from];
            dest.ep = sq::NONE;
            dest.king[color] = to;
            dest.rcount = 0;
            dest.sqr_val[color] +=
                square_value(color | ROOK, rook_to) - square_value(color | ROOK, rook_from);
            dest.piece_key = parent.piece_key
                ^ z.piece[piece][from]
                ^ z.piece[piece][to]
                ^ z.piece[color | ROOK][rook_from]
                ^ z.piece[color | ROOK][rook_to];
            dest.pc[color] ^= dest.effected;
            dest.pc[piece] ^= bit(from) | bit(to);
            dest.pc[color | ROOK] ^= bit(rook_from) | bit(rook_to);
            board[rook_to] = color | ROOK;
            board[rook_from] = 0;
            board[to] = piece;
            board[from] = 0;
        }

        mt::CASTLE_LONG => {
            let (rook_from, rook_to) = if color == WHITE {
                (sq::A1, sq::D1)
            } else {
                (sq::A8, sq::D8)
            };
            dest.effected = bit(from) | bit(to) | bit(rook_from) | bit(rook_to);
            dest.state = (parent.state ^ COLOR_MASK) & TOUCH[from];
            dest.ep = sq::NONE;
            dest.king[color] = to;
            dest.rcount = 0;
            dest.sqr_val[color] +=
                square_value(color | ROOK, rook_to) - square_value(color | ROOK, rook_from);
            dest.piece_key = parent.piece_key
                ^ z.piece[piece][from]
                ^ z.piece[piece][to]
                ^ z.piece[color | ROOK][rook_from]
                ^ z.piece[color | ROOK][rook_to];
            dest.pc[color] ^= dest.effected;
            dest.pc[piece] ^= bit(from) | bit(to);
            dest.pc[color | ROOK] ^= bit(rook_from) | bit(rook_to);
            board[rook_from] = 0;
            board[rook_to] = color | ROOK;
            board[to] = piece;
            board[from] = 0;
        }

        _ => debug_assert!(false, "exec of invalid move"),
    }

    dest.position_key =
        dest.piece_key ^ z.state[(dest.state & STATE_MASK) as usize] ^ z.ep[dest.ep];

    // Refresh king lines only when the move disturbed them.
    for c in 0..2 {
        if piece == (c | KING) || parent.kcross[c] & dest.effected != 0 {
            dest.kcross[c] = dest.rook_xo(dest.king[c]);
        } else {
            dest.kcross[c] = parent.kcross[c];
            debug_assert_eq!(dest.kcross[c], dest.rook_xo(dest.king[c]));
        }
        if piece == (c | KING) || parent.kdiags[c] & dest.effected != 0 {
            dest.kdiags[c] = dest.bishop_xo(dest.king[c]);
        } else {
            dest.kdiags[c] = parent.kdiags[c];
            debug_assert_eq!(dest.kdiags[c], dest.bishop_xo(dest.king[c]));
        }
    }

    dest.chkrs = dest.find_checkers(enemy);
    if dest.chkrs != 0 {
        dest.state |= CHECK_FLAG;
    }

    // The pawn cache belongs to the destination slot; invalidate it when
    // it no longer matches the new pawn bitboards.
    if dest.pinfo[0].pawns != dest.pc[PAWN] || dest.pinfo[1].pawns != dest.pc[1 | PAWN] {
        dest.pinfo = Default::default();
    }

    evaluate(dest, Some(parent), params);
}

/// Execute a null move: flip the side to move, clear en passant, reset the
/// reversible-move counter. No piece moves, so the board array and
/// seen-set are untouched.
pub fn exec_null(parent: &Node, dest: &mut Node, params: &Params, stats: &mut Stats) {
    debug_assert_eq!(parent.chkrs, 0);
    stats.null_moves += 1;

    dest.pc = parent.pc;
    dest.last_move = Move::NONE;
    dest.last_piece = 0;
    dest.capture = 0;
    dest.mcount = parent.mcount;
    dest.effected = parent.effected;
    dest.state = (parent.state ^ COLOR_MASK) & STATE_MASK;
    dest.ep = sq::NONE;
    dest.king = parent.king;
    dest.material = parent.material;
    dest.sqr_val = parent.sqr_val;
    dest.rcount = 0;
    dest.piece_key = parent.piece_key;
    dest.position_key =
        dest.piece_key ^ ZOBRIST.state[(dest.state & STATE_MASK) as usize] ^ ZOBRIST.ep[sq::NONE];
    dest.kcross = parent.kcross;
    dest.kdiags = parent.kdiags;
    dest.chkrs = 0;

    if dest.pinfo[0].pawns != dest.pc[PAWN] || dest.pinfo[1].pawns != dest.pc[1 | PAWN] {
        dest.pinfo = Default::default();
    }

    evaluate(dest, Some(parent), params);
}

/// Retract `mv` executed from `parent`: restore the touched board squares
/// and remove the parent's position key from the seen-set. Every other
/// field still lives, untouched, in the parent node.
pub fn undo(parent: &Node, board: &mut crate::types::PieceBoard, seen: &mut SeenSet, mv: Move) {
    let color = parent.color_to_move();
    debug_assert!(mv.is_valid());

    board[mv.from()] = mv.pc();
    match mv.kind() {
        mt::NORMAL | mt::PAWN_CAPTURE | mt::KING_MOVE => {
            board[mv.to()] = mv.cap();
        }
        mt::PAWN_PUSH | mt::PAWN_LUNG => {
            board[mv.to()] = 0;
        }
        mt::EN_PASSANT => {
            let cap_sqr = if color == WHITE {
                mv.to() - 8
            } else {
                mv.to() + 8
            };
            board[mv.to()] = 0;
            board[cap_sqr] = (color ^ 1) | PAWN;
        }
        mt::CASTLE_SHORT => {
            let (rook_from, rook_to) = if color == WHITE {
                (sq::H1, sq::F1)
            } else {
                (sq::H8, sq::F8)
            };
            board[mv.to()] = 0;
            board[rook_from] = color | ROOK;
            board[rook_to] = 0;
        }
        mt::CASTLE_LONG => {
            let (rook_from, rook_to) = if color == WHITE {
                (sq::A1, sq::D1)
            } else {
                (sq::A8, sq::D8)
            };
            board[mv.to()] = 0;
            board[rook_from] = color | ROOK;
            board[rook_to] = 0;
        }
        _ => debug_assert!(false, "undo of invalid move"),
    }
    seen.remove(parent.position_key);
}
