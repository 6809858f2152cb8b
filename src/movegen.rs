//! Staged legal-move generation.
//!
//! Moves are produced in stages (captures and promotions, then quiets,
//! then — in quiescence only — checks), filtered through the node's pin
//! masks so that no move ever leaves the mover's king in check. Check
//! evasions replace the normal stages when the side to move is in check.
//!
//! Each generated move carries an ordering score; `next_move` runs an
//! incremental selection sort so an early beta cutoff never pays for a
//! full sort. The generated list is cached against
//! `position_key ^ stage salt` and reused when a node is re-entered in
//! the same staged sequence.

use crate::bits::{above, below, bit, low_square, multi_bit, pop_low, ALL};
use crate::geometry::{dir, is_cross, is_diag, step, NORTH, SOUTH};
use crate::history::History;
use crate::moves::Move;
use crate::node::Node;
use crate::see::static_exchange;
use crate::tables::{ray, square_value, FILES, KING_ATK, KNIGHT_ATK, PAWN_ATK, RANKS};
use crate::types::{
    color_of, mt, sq, Color, PieceBoard, BISHOP, KING, KNIGHT, PAWN, PAWN_VALUE, QUEEN, ROOK,
    VALUE_OF, WHITE,
};

// Generation stages.
pub const PROMOS_AND_CAPTURES: u32 = 1;
pub const QUIET_MOVES: u32 = 2;
pub const FINISHED: u32 = 3;

// Generation modes, each with its own cache salt. The third salt is spare.
pub const ALL_MOVES: u32 = 0;
pub const QUIESCENCE: u32 = 1;

const STAGE_SALT: [u64; 3] = [0, 0x7A50_04E2_1D7C_3B15, 0x39B8_2FF6_054C_9E34];

impl Node {
    pub fn reset_movegen(&mut self, key: u64) {
        self.movegen_key = key;
        self.stage = PROMOS_AND_CAPTURES;
        self.move_count = 0;
        self.move_index = 0;
        self.sort_index = 0;
    }

    /// Begin (or resume) a staged generation sequence of the given mode.
    pub fn init_movegen(&mut self, gen_type: u32) {
        let move_key = self.position_key ^ STAGE_SALT[gen_type as usize];
        if self.position_key != 0 && move_key == self.movegen_key {
            self.move_index = 0;
        } else {
            self.reset_movegen(move_key);
        }
    }

    /// Bubble the move at `idx` to the front, preserving order of the rest.
    pub fn scoot_move_to_front(&mut self, mut idx: usize) {
        debug_assert!(idx < self.move_count);
        while idx > 0 {
            self.moves.swap(idx, idx - 1);
            idx -= 1;
        }
    }

    /// Deterministic ordering for perft splits.
    pub fn sort_moves_lexically(&mut self) {
        self.moves[..self.move_count].sort_by_key(|m| (m.from(), m.to(), m.promo()));
    }
}

/// Move generation borrows: the node being generated for, the shared 8×8
/// board (also mutated transiently by exchange scoring), and the history
/// table for quiet-move ordering.
pub struct MoveGen<'a> {
    pub node: &'a mut Node,
    pub board: &'a mut PieceBoard,
    pub hist: &'a History,
}

#[inline]
fn fwd(color: Color) -> crate::geometry::Dir {
    if color == WHITE {
        NORTH
    } else {
        SOUTH
    }
}

#[inline]
fn fwd_shift(color: Color, bb: u64) -> u64 {
    if color == WHITE {
        bb << 8
    } else {
        bb >> 8
    }
}

impl MoveGen<'_> {
    /// Score and append a move.
    fn add_move(&mut self, kind: u32, piece: usize, from: usize, to: usize, cap: usize, promo: usize) {
        debug_assert!(self.node.move_count + 1 < crate::types::MAX_MOVES);
        debug_assert_eq!(self.board[from], piece);
        let color = color_of(piece);

        let mut score = if kind < mt::KING_MOVE {
            square_value(piece, to) - square_value(piece, from)
        } else {
            0
        };

        if (kind == mt::PAWN_PUSH || kind == mt::PAWN_CAPTURE) && promo != 0 {
            score += static_exchange(self.node, self.board, color, true, from, to)
                + VALUE_OF[promo]
                - PAWN_VALUE;
        } else {
            debug_assert_eq!(promo, 0);
            match kind {
                mt::NORMAL => {
                    score += static_exchange(self.node, self.board, color, true, from, to);
                }
                mt::PAWN_PUSH | mt::PAWN_LUNG => {
                    score += 10 + static_exchange(self.node, self.board, color, true, from, to);
                }
                mt::PAWN_CAPTURE | mt::EN_PASSANT => {
                    score += 15 + static_exchange(self.node, self.board, color, true, from, to);
                }
                mt::KING_MOVE => {
                    debug_assert!(!self.node.attacked_by(color ^ 1, to));
                    score += VALUE_OF[cap];
                }
                mt::CASTLE_SHORT | mt::CASTLE_LONG => {
                    score += 25;
                }
                _ => debug_assert!(false),
            }
        }

        let mut mv = Move::new(kind, from, to, piece, cap, promo, score);
        if !mv.is_cap_or_promo() {
            if self.node.is_killer(mv) {
                mv.score += 50;
            } else {
                mv.score += self.hist.value(mv);
            }
        }
        self.node.moves[self.node.move_count] = mv;
        self.node.move_count += 1;
    }

    // -----------------------------------------------------------------------
    // King moves
    // -----------------------------------------------------------------------

    fn add_king_moves(&mut self, color: Color, dests: u64) {
        if dests == 0 {
            return;
        }

        let sliders = self.node.chkrs & self.node.sliders(color ^ 1);
        let from = self.node.king[color];

        let mut dests =
            dests & self.node.atks[color | KING] & !self.node.atks[color ^ 1] & !self.node.pc[color];
        while dests != 0 {
            let to = pop_low(&mut dests);
            if sliders != 0 {
                // A king stepping directly away from a checking slider is
                // still on its line even though the square is not in the
                // current attack map.
                let d = dir(from, to);
                if sliders & ray(-d, from) != 0 {
                    continue;
                }
            }
            self.add_move(mt::KING_MOVE, color | KING, from, to, self.board[to], 0);
        }
    }

    /// Discovered checks delivered by moving the king off a friendly
    /// slider's line, restricted to moves the enemy king cannot escape.
    fn add_king_checks(&mut self, color: Color) {
        let from = self.node.king[color];
        if bit(from) & self.node.king_lines(color ^ 1) == 0 {
            return;
        }

        let enemy = self.node.king[color ^ 1];
        let d = dir(from, enemy);
        if d == 0 {
            return;
        }
        let revealed = if is_diag(d) {
            self.node.bishops_queens(color)
        } else {
            self.node.rooks_queens(color)
        };
        if self.node.ray_x(-d, from) & revealed == 0 {
            return;
        }

        let destinations = self.node.empty() & self.node.atks[color | KING] & !self.node.atks[color ^ 1];
        let mut dests = destinations & !ray(-d, enemy);
        let flee_sqrs = self.node.atks[(color ^ 1) | KING]
            & !self.node.atks[color]
            & !self.node.pc[color ^ 1]
            & !ray(d, from);

        while dests != 0 {
            let to = pop_low(&mut dests);
            if flee_sqrs & !KING_ATK[to] == 0 {
                self.add_move(mt::KING_MOVE, color | KING, from, to, 0, 0);
            }
        }
    }

    fn add_castle_moves(&mut self, color: Color) {
        if self.node.can_castle_short(color) {
            let from = self.node.king[color];
            let to = if color == WHITE { sq::G1 } else { sq::G8 };
            self.add_move(mt::CASTLE_SHORT, color | KING, from, to, 0, 0);
        }
        if self.node.can_castle_long(color) {
            let from = self.node.king[color];
            let to = if color == WHITE { sq::C1 } else { sq::C8 };
            self.add_move(mt::CASTLE_LONG, color | KING, from, to, 0, 0);
        }
    }

    /// Castling moves whose rook lands with check on the enemy king's file.
    fn add_castle_checks(&mut self, color: Color) {
        let enemy_bit = bit(self.node.king[color ^ 1]);
        let towards = if color == WHITE { NORTH } else { SOUTH };
        if self.node.can_castle_short(color) {
            let rook_to = if color == WHITE { sq::F1 } else { sq::F8 };
            if enemy_bit & self.node.ray_x(towards, rook_to) != 0 {
                let from = self.node.king[color];
                let to = if color == WHITE { sq::G1 } else { sq::G8 };
                self.add_move(mt::CASTLE_SHORT, color | KING, from, to, 0, 0);
            }
        }
        if self.node.can_castle_long(color) {
            let rook_to = if color == WHITE { sq::D1 } else { sq::D8 };
            if enemy_bit & self.node.ray_x(towards, rook_to) != 0 {
                let from = self.node.king[color];
                let to = if color == WHITE { sq::C1 } else { sq::C8 };
                self.add_move(mt::CASTLE_LONG, color | KING, from, to, 0, 0);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pawn moves
    // -----------------------------------------------------------------------

    fn add_ep_caps(&mut self, color: Color) {
        let ep = self.node.ep;
        debug_assert!(ep != sq::NONE);
        let mut pawns = PAWN_ATK[color ^ 1][ep] & self.node.pc[color | PAWN];
        while pawns != 0 {
            let from = pop_low(&mut pawns);
            if !self.node.pinned_move(color, from, ep) && !self.node.ep_pinned(color, from, ep) {
                self.add_move(mt::EN_PASSANT, color | PAWN, from, ep, (color ^ 1) | PAWN, 0);
            }
        }
    }

    fn add_pawn_caps(&mut self, color: Color, under_promote: bool, dests: u64) {
        if dests == 0 || self.node.pc[color | PAWN] == 0 {
            return;
        }
        let pawns = self.node.pc[color | PAWN];
        let enemy = self.node.pc[color ^ 1];
        let promo_rank = RANKS[if color == WHITE { 7 } else { 0 }];

        // Two capture directions, as (target set, from-square offset).
        let captures = if color == WHITE {
            [((pawns & !FILES[0]) << 7, -7i32), ((pawns & !FILES[7]) << 9, -9i32)]
        } else {
            [((pawns & !FILES[0]) >> 9, 9i32), ((pawns & !FILES[7]) >> 7, 7i32)]
        };

        for (targets, offset) in captures {
            let mut dest = dests & targets & enemy;
            while dest != 0 {
                let to = pop_low(&mut dest);
                let from = (to as i32 + offset) as usize;
                debug_assert!(self.board[to] != 0 && color_of(self.board[to]) != color);
                if self.node.pinned_move(color, from, to) {
                    continue;
                }
                let cap = self.board[to];
                if bit(to) & promo_rank != 0 {
                    self.add_move(mt::PAWN_CAPTURE, color | PAWN, from, to, cap, color | QUEEN);
                    if under_promote {
                        self.add_move(mt::PAWN_CAPTURE, color | PAWN, from, to, cap, color | ROOK);
                        self.add_move(mt::PAWN_CAPTURE, color | PAWN, from, to, cap, color | BISHOP);
                        self.add_move(mt::PAWN_CAPTURE, color | PAWN, from, to, cap, color | KNIGHT);
                    }
                } else {
                    self.add_move(mt::PAWN_CAPTURE, color | PAWN, from, to, cap, 0);
                }
            }
        }
    }

    fn add_pawn_pushes(&mut self, color: Color, under_promote: bool, dests: u64) {
        if dests == 0 || self.node.pc[color | PAWN] == 0 {
            return;
        }
        let empty = self.node.empty();
        let promo_rank = RANKS[if color == WHITE { 7 } else { 0 }];

        let mut pushes = empty & fwd_shift(color, self.node.pc[color | PAWN]);
        let mut lunges = empty
            & dests
            & if color == WHITE {
                (pushes & RANKS[2]) << 8
            } else {
                (pushes & RANKS[5]) >> 8
            };

        while lunges != 0 {
            let to = pop_low(&mut lunges);
            let from = if color == WHITE { to - 16 } else { to + 16 };
            if !self.node.pinned_move(color, from, to) {
                self.add_move(mt::PAWN_LUNG, color | PAWN, from, to, 0, 0);
            }
        }

        pushes &= dests;
        while pushes != 0 {
            let to = pop_low(&mut pushes);
            let from = if color == WHITE { to - 8 } else { to + 8 };
            if self.node.pinned_move(color, from, to) {
                continue;
            }
            if bit(to) & promo_rank != 0 {
                self.add_move(mt::PAWN_PUSH, color | PAWN, from, to, 0, color | QUEEN);
                if under_promote {
                    self.add_move(mt::PAWN_PUSH, color | PAWN, from, to, 0, color | ROOK);
                    self.add_move(mt::PAWN_PUSH, color | PAWN, from, to, 0, color | BISHOP);
                    self.add_move(mt::PAWN_PUSH, color | PAWN, from, to, 0, color | KNIGHT);
                }
            } else {
                self.add_move(mt::PAWN_PUSH, color | PAWN, from, to, 0, 0);
            }
        }
    }

    /// Pawn pushes and lunges that check the enemy king, directly or by
    /// discovery; only moves the enemy king cannot sidestep are kept.
    fn add_pawn_checks(&mut self, color: Color) {
        if self.node.pc[color | PAWN] == 0 {
            return;
        }

        let enemy = self.node.king[color ^ 1];
        let lung_rank = self.node.empty() & RANKS[if color == WHITE { 3 } else { 4 }];
        let flee_sqrs =
            self.node.atks[(color ^ 1) | KING] & !self.node.atks[color] & !self.node.pc[color ^ 1];

        let mut pushes = self.node.empty()
            & !RANKS[if color == WHITE { 7 } else { 0 }]
            & fwd_shift(color, self.node.pc[color | PAWN]);

        while pushes != 0 {
            let to = pop_low(&mut pushes);
            let from = if color == WHITE { to - 8 } else { to + 8 };
            if self.node.pinned_move(color, from, to) {
                continue;
            }

            let lung = lung_rank & fwd_shift(color, bit(to));
            if flee_sqrs == 0 {
                if bit(to) & PAWN_ATK[color ^ 1][enemy] != 0 {
                    self.add_move(mt::PAWN_PUSH, color | PAWN, from, to, 0, 0);
                    continue;
                }
                if lung & PAWN_ATK[color ^ 1][enemy] != 0 {
                    self.add_move(mt::PAWN_LUNG, color | PAWN, from, step(to, fwd(color)), 0, 0);
                    continue;
                }
            }

            // Discovered check: the pawn steps off a slider's line (a pawn
            // can never discover along its own file).
            let d = dir(from, enemy);
            if d == 0 || d.abs() == 8 {
                continue;
            }
            let revealed = if is_diag(d) {
                self.node.bishops_queens(color)
            } else {
                self.node.rooks_queens(color)
            };
            let mut flee_after = flee_sqrs;
            if self.node.ray_x(-d, from) & revealed != 0 {
                flee_after &= !ray(d, from);
            }

            if flee_after & !PAWN_ATK[color][to] == 0 {
                self.add_move(mt::PAWN_PUSH, color | PAWN, from, to, 0, 0);
            }
            if lung != 0 && flee_after & !PAWN_ATK[color][low_square(lung)] == 0 {
                self.add_move(mt::PAWN_LUNG, color | PAWN, from, step(to, fwd(color)), 0, 0);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Piece moves
    // -----------------------------------------------------------------------

    fn add_knight_moves(&mut self, color: Color, dests: u64) {
        if dests == 0 || self.node.pc[color | KNIGHT] == 0 {
            return;
        }
        let mut pieces = self.node.pc[color | KNIGHT];
        while pieces != 0 {
            let from = pop_low(&mut pieces);
            let mut dest = KNIGHT_ATK[from] & dests & !self.node.pc[color];
            while dest != 0 {
                let to = pop_low(&mut dest);
                if !self.node.pinned_move(color, from, to) {
                    self.add_move(mt::NORMAL, color | KNIGHT, from, to, self.board[to], 0);
                }
            }
        }
    }

    fn add_knight_checks(&mut self, color: Color) {
        if self.node.pc[color | KNIGHT] == 0 {
            return;
        }
        let enemy = self.node.king[color ^ 1];
        let flee_sqrs =
            self.node.atks[(color ^ 1) | KING] & !self.node.atks[color] & !self.node.pc[color ^ 1];

        let mut pieces = self.node.pc[color | KNIGHT];
        while pieces != 0 {
            let from = pop_low(&mut pieces);
            let mut dests = KNIGHT_ATK[from] & self.node.empty();
            if dests == 0 {
                continue;
            }

            let mut flee_after = flee_sqrs;
            let d = dir(from, enemy);
            if d == 0 {
                // No discovery possible; direct checks only.
                dests &= KNIGHT_ATK[enemy];
            } else {
                let revealed = if is_diag(d) {
                    self.node.bishops_queens(color)
                } else {
                    self.node.rooks_queens(color)
                };
                if self.node.ray_x(-d, from) & revealed != 0 {
                    flee_after &= !ray(d, from);
                }
            }

            while dests != 0 {
                let to = pop_low(&mut dests);
                if !self.node.pinned_move(color, from, to) && flee_after & !KNIGHT_ATK[to] == 0 {
                    self.add_move(mt::NORMAL, color | KNIGHT, from, to, 0, 0);
                }
            }
        }
    }

    fn add_slider_moves(&mut self, color: Color, base: usize, dests: u64) {
        if dests == 0 || self.node.pc[color | base] == 0 {
            return;
        }
        let mut pieces = self.node.pc[color | base];
        while pieces != 0 {
            let from = pop_low(&mut pieces);
            let mut dest = self.node.slider[from] & dests & !self.node.pc[color];
            while dest != 0 {
                let to = pop_low(&mut dest);
                if !self.node.pinned_move(color, from, to) {
                    self.add_move(mt::NORMAL, color | base, from, to, self.board[to], 0);
                }
            }
        }
    }

    #[inline]
    fn add_bishop_moves(&mut self, color: Color, dests: u64) {
        self.add_slider_moves(color, BISHOP, dests);
    }

    #[inline]
    fn add_rook_moves(&mut self, color: Color, dests: u64) {
        self.add_slider_moves(color, ROOK, dests);
    }

    #[inline]
    fn add_queen_moves(&mut self, color: Color, dests: u64) {
        self.add_slider_moves(color, QUEEN, dests);
    }

    fn add_bishop_checks(&mut self, color: Color) {
        if self.node.pc[color | BISHOP] == 0 {
            return;
        }
        let enemy = self.node.king[color ^ 1];
        let flee_sqrs =
            self.node.atks[(color ^ 1) | KING] & !self.node.atks[color] & !self.node.pc[color ^ 1];

        let mut pieces = self.node.pc[color | BISHOP];
        while pieces != 0 {
            let from = pop_low(&mut pieces);
            let mut dests = self.node.slider[from] & self.node.empty();
            if dests == 0 {
                continue;
            }

            // A bishop can only discover a rook or queen line.
            let mut flee_after = flee_sqrs;
            let d = dir(from, enemy);
            if is_cross(d) {
                if self.node.ray_x(-d, from) & self.node.rooks_queens(color) != 0 {
                    flee_after &= !ray(d, from);
                }
            } else {
                dests &= self.node.kdiags[color ^ 1];
            }

            while dests != 0 {
                let to = pop_low(&mut dests);
                if self.node.pinned_move(color, from, to) {
                    continue;
                }
                let mut tmp = flee_after;
                if tmp != 0 {
                    let dd = dir(to, enemy);
                    if is_diag(dd) {
                        tmp &= !ray(dd, to);
                    }
                }
                if tmp == 0 {
                    self.add_move(mt::NORMAL, color | BISHOP, from, to, 0, 0);
                }
            }
        }
    }

    fn add_rook_checks(&mut self, color: Color) {
        if self.node.pc[color | ROOK] == 0 {
            return;
        }
        let enemy = self.node.king[color ^ 1];
        let flee_sqrs =
            self.node.atks[(color ^ 1) | KING] & !self.node.atks[color] & !self.node.pc[color ^ 1];

        let mut pieces = self.node.pc[color | ROOK];
        while pieces != 0 {
            let from = pop_low(&mut pieces);
            let mut dests = self.node.slider[from] & self.node.empty();
            if dests == 0 {
                continue;
            }

            // A rook can only discover a bishop or queen line.
            let mut flee_after = flee_sqrs;
            let d = dir(from, enemy);
            if is_diag(d) {
                if self.node.ray_x(-d, from) & self.node.bishops_queens(color) != 0 {
                    flee_after &= !ray(d, from);
                }
            } else {
                dests &= self.node.kcross[color ^ 1];
            }

            while dests != 0 {
                let to = pop_low(&mut dests);
                if self.node.pinned_move(color, from, to) {
                    continue;
                }
                let mut tmp = flee_after;
                if tmp != 0 {
                    let dd = dir(to, enemy);
                    if is_cross(dd) {
                        tmp &= !ray(dd, to);
                    }
                }
                if tmp == 0 {
                    self.add_move(mt::NORMAL, color | ROOK, from, to, 0, 0);
                }
            }
        }
    }

    fn add_queen_checks(&mut self, color: Color) {
        if self.node.pc[color | QUEEN] == 0 {
            return;
        }
        let enemy = self.node.king[color ^ 1];
        let flee_sqrs =
            self.node.atks[(color ^ 1) | KING] & !self.node.atks[color] & !self.node.pc[color ^ 1];

        let mut pieces = self.node.pc[color | QUEEN];
        while pieces != 0 {
            let from = pop_low(&mut pieces);
            let mut dests =
                self.node.slider[from] & self.node.empty() & self.node.king_lines(color ^ 1);
            while dests != 0 {
                let to = pop_low(&mut dests);
                if self.node.pinned_move(color, from, to) {
                    continue;
                }
                let dd = dir(to, enemy);
                let tmp = flee_sqrs & !KING_ATK[to] & !ray(dd, to);
                if tmp == 0 {
                    self.add_move(mt::NORMAL, color | QUEEN, from, to, 0, 0);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stage drivers
    // -----------------------------------------------------------------------

    /// Single check: captures of the checker, king flights, and blocks.
    fn get_check_evasions(&mut self, color: Color) {
        let chkrs = self.node.chkrs;
        debug_assert!(crate::bits::single_bit(chkrs));

        // En-passant capture of a checking pawn on its lunge square.
        if self.node.ep != sq::NONE {
            let cap_sq = step(self.node.ep, -fwd(color));
            if bit(cap_sq) == chkrs {
                self.add_ep_caps(color);
            }
        }

        if self.node.atks[color] & chkrs != 0 {
            self.add_pawn_caps(color, true, chkrs);
            self.add_knight_moves(color, chkrs);
            self.add_bishop_moves(color, chkrs);
            self.add_rook_moves(color, chkrs);
            self.add_queen_moves(color, chkrs);
        }

        self.add_king_moves(color, ALL);

        // Block a sliding check.
        let ksq = self.node.king[color];
        if chkrs & (self.node.atks[color | KING] | KNIGHT_ATK[ksq]) == 0 {
            let d = dir(ksq, low_square(chkrs));
            debug_assert!(d != 0);
            let between = if d > 0 {
                ray(d, ksq) & below(chkrs)
            } else {
                ray(d, ksq) & above(chkrs)
            };
            self.add_pawn_pushes(color, true, between);
            self.add_knight_moves(color, between);
            self.add_bishop_moves(color, between);
            self.add_rook_moves(color, between);
            self.add_queen_moves(color, between);
        }
    }

    fn get_promos_and_captures(&mut self, color: Color, under_promote: bool) -> bool {
        let caps = (self.node.pc[color ^ 1] ^ self.node.pc[(color ^ 1) | KING]) & self.node.atks[color];

        self.add_pawn_caps(color, under_promote, caps);
        self.add_pawn_pushes(
            color,
            under_promote,
            self.node.empty() & RANKS[if color == WHITE { 7 } else { 0 }],
        );
        self.add_knight_moves(color, caps);
        self.add_bishop_moves(color, caps);
        self.add_rook_moves(color, caps);
        self.add_queen_moves(color, caps);
        self.add_king_moves(color, caps);

        if self.node.ep != sq::NONE {
            self.add_ep_caps(color);
        }

        self.node.move_count > self.node.move_index
    }

    fn get_checks(&mut self, color: Color) -> bool {
        self.add_queen_checks(color);
        self.add_rook_checks(color);
        self.add_bishop_checks(color);
        self.add_knight_checks(color);
        self.add_pawn_checks(color);
        self.add_king_checks(color);
        self.add_castle_checks(color);
        self.node.move_count > self.node.move_index
    }

    fn get_quiet_moves(&mut self, color: Color) -> bool {
        let empty = self.node.empty();
        self.add_castle_moves(color);
        self.add_pawn_pushes(color, true, empty & !RANKS[if color == WHITE { 7 } else { 0 }]);
        self.add_knight_moves(color, empty);
        self.add_bishop_moves(color, empty);
        self.add_queen_moves(color, empty);
        self.add_rook_moves(color, empty);
        self.add_king_moves(color, empty);
        self.node.move_count > self.node.move_index
    }

    /// Generate every legal move at once (root and perft entry point).
    pub fn generate_all(&mut self) {
        self.node.init_movegen(ALL_MOVES);
        if self.node.stage != FINISHED {
            debug_assert_eq!(self.node.stage, PROMOS_AND_CAPTURES);
            debug_assert_eq!(self.node.move_count, 0);
            let color = self.node.color_to_move();
            if self.node.chkrs != 0 {
                if multi_bit(self.node.chkrs) != 0 {
                    self.add_king_moves(color, ALL);
                } else {
                    self.get_check_evasions(color);
                }
            } else {
                self.get_promos_and_captures(color, true);
                self.get_quiet_moves(color);
            }
            self.node.stage = FINISHED;
        }
        self.node.move_index = 0;
        self.node.sort_index = 0;
    }

    /// Produce the next stage of moves on demand and return the
    /// highest-scored unplayed move, or `None` when the node is exhausted.
    pub fn next_move(&mut self, gen_type: u32, depth: i32) -> Option<Move> {
        let color = self.node.color_to_move();

        if self.node.move_index >= self.node.move_count {
            debug_assert_eq!(self.node.sort_index, self.node.move_count);
            match self.node.stage {
                PROMOS_AND_CAPTURES => {
                    if self.node.chkrs != 0 {
                        self.node.stage = FINISHED;
                        if multi_bit(self.node.chkrs) != 0 {
                            self.add_king_moves(color, ALL);
                        } else {
                            self.get_check_evasions(color);
                        }
                    } else if gen_type == QUIESCENCE {
                        self.node.stage = QUIET_MOVES;
                        if !self.get_promos_and_captures(color, false) {
                            self.node.stage = FINISHED;
                            if depth == 0 {
                                self.get_checks(color);
                            }
                        }
                    } else {
                        self.node.stage = FINISHED;
                        self.get_promos_and_captures(color, true);
                        self.get_quiet_moves(color);
                    }
                }
                QUIET_MOVES => {
                    debug_assert_eq!(gen_type, QUIESCENCE);
                    self.node.stage = FINISHED;
                    if depth == 0 {
                        self.get_checks(color);
                    }
                }
                _ => {}
            }
        }

        if self.node.move_index >= self.node.move_count {
            return None;
        }

        // Incremental selection sort: swap the best unsorted move forward.
        if self.node.move_index >= self.node.sort_index {
            self.node.sort_index += 1;
            let mut best_index = self.node.move_index;
            let mut best_score = self.node.moves[best_index].score;
            for i in (self.node.move_index + 1)..self.node.move_count {
                if self.node.moves[i].score > best_score {
                    best_score = self.node.moves[i].score;
                    best_index = i;
                }
            }
            if best_index > self.node.move_index {
                self.node.moves.swap(self.node.move_index, best_index);
            }
        }

        let mv = self.node.moves[self.node.move_index];
        self.node.move_index += 1;
        Some(mv)
    }
}
