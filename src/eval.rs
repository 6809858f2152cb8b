//! Static evaluation, from White's perspective.
//!
//! `evaluate` is called by every exec, because move generation depends on
//! the attack maps and pin masks it populates. Beyond material and
//! piece-square totals (maintained incrementally by exec) it scores pawn
//! structure through the lazy per-node pawn cache, per-piece terms, king
//! safety weighted by attacker count, passed pawns once all attacks are
//! known, board coverage, and a set of endgame corrections that also
//! detect dead-drawn material.

use crate::bits::{bit, count, low_bit, low_square, multi_bit, pop_low, single_bit, ALL};
use crate::geometry::{dir, dist, is_diag, step, Dir, NORTH, SOUTH};
use crate::node::{Node, PawnInfo};
use crate::params::Params;
use crate::tables::{
    ray, square_value, ADJACENT, ATK_WEIGHT, CENTER16, CENTER4, CORNER12, DARK, FILES, KING_ATK,
    KING_SQR_END, KING_SQR_MID, KING_ZONE, KNIGHT_ATK, LIGHT, NORTH_RAY, OUTPOST, PASSER_PROGRESS,
    PAWN_ATK, RANKS, SOUTH_RAY, WIDE_NORTH, WIDE_SOUTH,
};
use crate::types::{
    castle_mask, sq, threat_bit, xc, yc, Color, BISHOP, BLACK, DRAW_FLAG, KING, KNIGHT, PAWN,
    QUEEN, ROOK, WHITE,
};

#[inline]
fn fwd(color: Color) -> Dir {
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

#[inline]
fn back_shift(color: Color, bb: u64) -> u64 {
    fwd_shift(color ^ 1, bb)
}

#[inline]
fn front_ray(color: Color, sqr: usize) -> u64 {
    if color == WHITE {
        NORTH_RAY[sqr]
    } else {
        SOUTH_RAY[sqr]
    }
}

#[inline]
fn back_ray(color: Color, sqr: usize) -> u64 {
    front_ray(color ^ 1, sqr)
}

#[inline]
fn wide_front(color: Color, sqr: usize) -> u64 {
    if color == WHITE {
        WIDE_NORTH[sqr]
    } else {
        WIDE_SOUTH[sqr]
    }
}

#[inline]
fn wide_back(color: Color, sqr: usize) -> u64 {
    wide_front(color ^ 1, sqr)
}

#[inline]
fn relative_rank(color: Color, sqr: usize) -> i32 {
    if color == WHITE {
        yc(sqr) as i32
    } else {
        7 - yc(sqr) as i32
    }
}

/// Detect pinned pieces of `color` by walking outward from its king, and
/// return the pin penalty accumulated for that side.
fn get_pins(node: &mut Node, color: Color, pin_value: i32) -> i32 {
    node.pinned[color] = 0;
    let enemy = color ^ 1;
    let mut score = 0;

    let mut p = node.pc[color] & (node.kcross[color] | node.kdiags[color]);
    while p != 0 {
        let sqr = pop_low(&mut p);
        let d = dir(node.king[color], sqr);
        debug_assert!(d != 0);
        let x = node.ray_xo(d, sqr);
        let (attackers, kline) = if is_diag(d) {
            (node.bishops_queens(enemy), node.kdiags[color])
        } else {
            (node.rooks_queens(enemy), node.kcross[color])
        };
        if x & attackers != 0 {
            node.pinned[color] |= x | (kline & ray(d, node.king[color]));
            score += pin_value;
        }
    }
    score
}

/// Pawn-structure score for one side; fills the pawn cache when stale and
/// publishes the side's pawn attack map.
fn pawn_eval(node: &mut Node, color: Color) -> i32 {
    let pawns = node.pc[color | PAWN];
    debug_assert!(pawns != 0);
    let enemy = color ^ 1;
    let enemy_pawns = node.pc[enemy | PAWN];

    if node.pinfo[color].pawns != pawns {
        let mut info = PawnInfo {
            pawns,
            count: count(pawns),
            ..Default::default()
        };
        info.atks = if color == WHITE {
            ((pawns & !FILES[0]) << 7) | ((pawns & !FILES[7]) << 9)
        } else {
            ((pawns & !FILES[0]) >> 9) | ((pawns & !FILES[7]) >> 7)
        };

        let mut p = pawns;
        while p != 0 {
            let sqr = low_square(p);
            let b = low_bit(p);
            p ^= b;

            // Space in front of the rearmost pawn per file.
            if pawns & front_ray(color, sqr) == 0 {
                info.front |= front_ray(color, sqr);
            }

            info.closed |= FILES[xc(sqr)];

            if enemy_pawns & wide_front(color, sqr) == 0 {
                // Scored later, once all attack maps exist.
                info.passed |= b;
            } else if enemy_pawns & front_ray(color, sqr) == 0
                && node.occupied() & fwd_shift(color, b) == 0
            {
                // Potential passer: own file clear and enough adjacent
                // support to trade through the adjacent-file blockers.
                let blockers = (wide_front(color, sqr) ^ front_ray(color, sqr)) & enemy_pawns;
                if blockers != 0 {
                    let supporters = (wide_back(color, sqr) ^ back_ray(color, sqr)) & pawns;
                    if count(supporters) >= count(blockers) {
                        info.score += 8 * relative_rank(color, sqr);
                    }
                }
            }

            // Supported by a neighbor or defender?
            if pawns & (ADJACENT[sqr] | PAWN_ATK[enemy][sqr]) != 0 {
                info.connected |= b;
                info.behind |= back_ray(color, sqr);
                info.score += 4;
            } else if pawns & PAWN_ATK[color][sqr] != 0 {
                // Gives support without receiving any.
                info.connected |= b;
                info.behind |= back_ray(color, sqr);
            }

            // Backward or isolated: nothing beside or behind on the
            // adjacent files.
            if pawns & (wide_back(color, sqr) ^ back_ray(color, sqr)) == 0 {
                info.backward |= b;
                let guards = enemy_pawns & PAWN_ATK[color][step(sqr, fwd(color))];
                if guards != 0 {
                    info.score -= if multi_bit(guards) != 0 { 16 } else { 12 };
                } else if square_value(color | PAWN, sqr) < 12 {
                    info.score -= 8;
                }
                if enemy_pawns & front_ray(color, sqr) == 0 {
                    info.score -= 8;
                }
            }

            // Doubled, worse when also backward.
            if pawns & back_ray(color, sqr) != 0 {
                info.score -= if b & info.backward != 0 { 40 } else { 24 };
            }
        }

        node.pinfo[color] = info;
    }

    debug_assert_eq!(node.pinfo[color].pawns, pawns);
    debug_assert_eq!(node.pinfo[color].count, count(pawns));

    let info = node.pinfo[color];
    node.atks[color | PAWN] = info.atks;

    if info.atks & KING_ZONE[node.king[enemy]] != 0 {
        node.atk_count[color] += 1;
    }

    // Blocked central pawns still on their home squares.
    let central = if color == WHITE {
        bit(sq::D3) | bit(sq::E3)
    } else {
        bit(sq::D6) | bit(sq::E6)
    };
    if node.occupied() & central & fwd_shift(color, info.pawns) != 0 {
        return info.score - 16;
    }
    info.score
}

fn knight_eval(node: &mut Node, color: Color) -> i32 {
    let mut p = node.pc[color | KNIGHT];
    debug_assert!(p != 0);
    let enemy = color ^ 1;
    let mut score = 0;

    let available =
        !(node.pc[color] | node.atks[enemy | PAWN] | (node.pc[enemy | PAWN] & node.atks[enemy]));

    // Redundant knights are worth slightly less; a loner knight as the
    // only piece even more so.
    if multi_bit(p) != 0 {
        score -= 16;
    } else if single_bit(p) && p == node.majors_and_minors(color) {
        score -= 50;
    }

    while p != 0 {
        let sqr = low_square(p);
        let b = low_bit(p);
        p ^= b;

        let mut x = KNIGHT_ATK[sqr];
        node.atks[color | KNIGHT] |= x;

        if x & (KING_ATK[node.king[enemy]] | (KNIGHT_ATK[node.king[enemy]] & !node.pc[color])) != 0
        {
            node.atk_count[color] += 1;
            node.atk_score[color] += 20;
        }

        x &= available;
        if x == 0 {
            score -= if b & CORNER12 != 0 { 32 } else { 16 };
        } else {
            // Knight on c3 boxed in by its own c2/d pawns, unless castled
            // long.
            if sqr == (if color == WHITE { sq::C3 } else { sq::C6 })
                && node.pc[color | PAWN] & bit(if color == WHITE { sq::C2 } else { sq::C7 }) != 0
                && FILES[3] & node.pc[color | PAWN] != 0
                && xc(node.king[color]) > 2
            {
                score -= 10;
            }

            if b & OUTPOST[color] != 0
                && node.pc[enemy | PAWN] & (wide_front(color, sqr) ^ front_ray(color, sqr)) == 0
            {
                score += if node.minor_pieces(enemy) != 0 { 8 } else { 16 };
                if b & back_shift(color, node.pinfo[enemy].backward) != 0 {
                    score += 8;
                }
                if b & node.atks[color | PAWN] != 0 {
                    score += 8;
                }
            }
        }
    }
    score
}

fn bishop_eval(node: &mut Node, parent: Option<&Node>, color: Color) -> i32 {
    let mut p = node.pc[color | BISHOP];
    debug_assert!(p != 0);
    let enemy = color ^ 1;
    let mut score = 0;

    let available =
        !(node.pc[color] | node.atks[enemy | PAWN] | (node.pc[enemy | PAWN] & node.atks[enemy]));

    // The pair gains value as pawns leave the board.
    if p & LIGHT != 0 && p & DARK != 0 {
        score += 48 - (5 * (node.pinfo[WHITE].count + node.pinfo[BLACK].count)) / 3;
    } else if single_bit(p) && p == node.majors_and_minors(color) {
        score -= 50;
    }

    while p != 0 {
        let sqr = low_square(p);
        let b = low_bit(p);
        p ^= b;

        let mut x = match parent {
            Some(par) if node.effected & (b | par.slider[sqr]) == 0 => par.slider[sqr],
            _ => node.bishop_xo(sqr),
        };
        debug_assert_eq!(x, node.bishop_xo(sqr));
        node.slider[sqr] = x;
        node.atks[color | BISHOP] |= x;

        if x & (KING_ATK[node.king[enemy]] | (node.kdiags[enemy] & !node.pc[color])) != 0 {
            node.atk_count[color] += 1;
            node.atk_score[color] += 20;
        }

        x &= available;
        if x == 0 {
            score -= if b & CORNER12 != 0 { 32 } else { 16 };
        } else if b & OUTPOST[color] != 0
            && node.pc[enemy | PAWN] & (wide_front(color, sqr) ^ front_ray(color, sqr)) == 0
        {
            score += if node.minor_pieces(enemy) != 0 { 8 } else { 16 };
            if b & back_shift(color, node.pinfo[enemy].backward) != 0 {
                score += 8;
            }
            if b & node.atks[color | PAWN] != 0 {
                score += 8;
            }
        } else {
            // Fianchetto shapes on b2/g2 (b7/g7).
            let (home, hole) = if color == WHITE {
                (sq::B2, sq::B3)
            } else {
                (sq::B7, sq::B6)
            };
            let (ghome, ghole) = if color == WHITE {
                (sq::G2, sq::G3)
            } else {
                (sq::G7, sq::G6)
            };
            if sqr == home
                && node.pc[color | PAWN] & bit(hole) != 0
                && node.pc[color | PAWN] & PAWN_ATK[enemy][hole] != 0
            {
                score += 8;
            } else if sqr == ghome
                && node.pc[color | PAWN] & bit(ghole) != 0
                && node.pc[color | PAWN] & PAWN_ATK[enemy][ghole] != 0
            {
                score += 8;
            }
        }

        // Too many pawns fixed on this bishop's color.
        let same = node.pc[color | PAWN] & if b & LIGHT != 0 { LIGHT } else { DARK };
        if multi_bit(same) != 0 {
            let n = count(same);
            if n >= 3 {
                score -= 3 * n;
                let touching = (((same & !FILES[7]) << 9)
                    | ((same & !FILES[0]) << 7)
                    | ((same & !FILES[7]) >> 7)
                    | ((same & !FILES[0]) >> 9))
                    & same;
                if touching != 0 {
                    score -= 6 * count(touching);
                }
            }
        }
    }
    score
}

fn rook_eval(node: &mut Node, parent: Option<&Node>, color: Color) -> i32 {
    let mut p = node.pc[color | ROOK];
    debug_assert!(p != 0);
    let enemy = color ^ 1;
    let mut score = 0;

    // Rooks developed before the minor pieces.
    let advanced: u64 = if color == WHITE { ALL << 16 } else { ALL >> 16 };
    if p & advanced != 0 {
        let home_minors = node.minor_pieces(color) & !advanced;
        if home_minors != 0 {
            score -= 8 * count(home_minors);
        }
    }

    let available = !(node.pc[color]
        | node.atks[enemy | PAWN]
        | node.atks[enemy | KNIGHT]
        | node.atks[enemy | BISHOP]
        | ((node.pc[enemy | PAWN] | node.minor_pieces(enemy)) & node.atks[enemy]));

    while p != 0 {
        let sqr = low_square(p);
        let b = low_bit(p);
        p ^= b;

        let x = match parent {
            Some(par) if node.effected & (b | par.slider[sqr]) == 0 => par.slider[sqr],
            _ => node.rook_xo(sqr),
        };
        debug_assert_eq!(x, node.rook_xo(sqr));
        node.slider[sqr] = x;
        node.atks[color | ROOK] |= x;
        let mut connected = x & node.major_pieces(color);

        if x & (KING_ATK[node.king[enemy]] | (node.kcross[enemy] & !node.pc[color])) != 0 {
            node.atk_count[color] += 1;
            node.atk_score[color] += 40;
        }

        if x & ((front_ray(color, sqr) & node.pinfo[color].passed)
            | (back_ray(color, sqr) & node.pinfo[enemy].passed))
            != 0
        {
            // Behind a passer, ours or theirs.
            score += 12;
        } else if b & !(node.pinfo[color].closed | node.pinfo[enemy].closed) != 0 {
            score += if FILES[xc(sqr)] & bit(node.king[enemy]) != 0 {
                12
            } else {
                10
            };
        } else if b & !node.pinfo[color].closed != 0 {
            let z = front_ray(color, sqr);
            score += if z & (bit(node.king[enemy]) | node.pinfo[enemy].backward) != 0 {
                10
            } else {
                8
            };
        } else if b & node.pinfo[color].front == 0
            && node.state & castle_mask(color) == 0
            && node.pc[color | PAWN] & front_ray(color, sqr) != 0
        {
            // Stuck behind its own pawns on the wrong side of a king that
            // can no longer castle.
            let rx = xc(sqr);
            let kx = xc(node.king[color]);
            if (kx >= 4 && rx >= kx) || (kx < 4 && rx <= kx) {
                if x & RANKS[yc(sqr)] & !node.pinfo[color].closed & available == 0 {
                    score -= 50;
                } else {
                    score -= 20;
                }
                connected = 0;
            }
        }

        if connected != 0 && multi_bit(x & available) != 0 {
            score += 4;
        }
    }
    score
}

fn queen_eval(node: &mut Node, parent: Option<&Node>, color: Color) -> i32 {
    let mut p = node.pc[color | QUEEN];
    debug_assert!(p != 0);
    let enemy = color ^ 1;
    let mut score = 0;

    let advanced: u64 = if color == WHITE { ALL << 16 } else { ALL >> 16 };
    if p & advanced != 0 {
        let home_minors = node.minor_pieces(color) & !advanced;
        if home_minors != 0 {
            score -= 12 * count(home_minors);
        }
    }

    let available = !(node.pc[color]
        | node.atks[enemy | PAWN]
        | node.atks[enemy | KNIGHT]
        | node.atks[enemy | BISHOP]
        | node.atks[enemy | ROOK]
        | ((node.pc[enemy] ^ node.pc[enemy | QUEEN] ^ node.pc[enemy | KING]) & node.atks[enemy]));

    while p != 0 {
        let sqr = low_square(p);
        let b = low_bit(p);
        p ^= b;

        let mut x = match parent {
            Some(par) if node.effected & (b | par.slider[sqr]) == 0 => par.slider[sqr],
            _ => node.queen_xo(sqr),
        };
        debug_assert_eq!(x, node.queen_xo(sqr));
        node.slider[sqr] = x;
        node.atks[color | QUEEN] |= x;

        if x & (KING_ATK[node.king[enemy]] | (node.king_lines(enemy) & !node.pc[color])) != 0 {
            node.atk_count[color] += 1;
            node.atk_score[color] += 80;
        }

        x &= available;
        if x == 0 {
            score -= if b & CORNER12 != 0 { 32 } else { 16 };
        }
    }
    score
}

/// King placement, mobility, mate threats, shelter, and attack pressure.
/// Sets the side's threat flag when a concrete mating pattern is near.
fn king_eval(node: &mut Node, color: Color, params: &Params) -> i32 {
    let sqr = node.king[color];
    let enemy = color ^ 1;
    let ek = node.king[enemy];
    let mut score = 0;

    // King piece-square value is blended here rather than in exec, since
    // the midgame/endgame mix depends on remaining enemy material.
    let ratio = node.remaining_material(enemy);
    let midgame = ratio * KING_SQR_MID[color][sqr] as f32;
    let endgame = (1.0 - ratio) * KING_SQR_END[color][sqr] as f32;
    score += (midgame + endgame) as i32;

    let p = KING_ATK[sqr] & !(node.pc[color] | node.atks[enemy] | KING_ATK[ek]);
    if p == 0 {
        score -= 20;
        if params.test != 0 && KNIGHT_ATK[sqr] & node.atks[enemy | KNIGHT] & !node.atks[color] != 0
        {
            score -= 20;
            node.state |= threat_bit(color);
        }
    } else if params.test != 0 {
        // Imperfect but cheap mate-threat scan: find attacked, undefended
        // squares on the king's lines from which a slider check could not
        // be met, and knight checks covering every flight square. Catches
        // the bulk of real threats such as back-rank mates.
        let mut w = !node.atks[color]
            & ((node.kcross[color] & (node.atks[enemy | ROOK] | node.atks[enemy | QUEEN]))
                | (node.kdiags[color] & (node.atks[enemy | BISHOP] | node.atks[enemy | QUEEN])));
        while w != 0 {
            let chksqr = pop_low(&mut w);
            let d = dir(sqr, chksqr);
            debug_assert!(d != 0);
            let kline = if is_diag(d) {
                node.kdiags[color]
            } else {
                node.kcross[color]
            };
            let mut z = ALL;
            if p & !ray(-d, chksqr) == 0 {
                // Every flight square stays on the check line; the threat
                // stands unless we defend along the line behind the king.
                z = ray(d, sqr) & kline & node.atks[color];
            }
            if z == 0 {
                let mut contact = KING_ATK[sqr]
                    & bit(chksqr)
                    & !(node.atks[enemy | PAWN] | node.atks[enemy | KNIGHT] | KING_ATK[ek]);
                if contact != 0 {
                    let slider_kinds = (node.atks[enemy | BISHOP] != 0) as i32
                        + (node.atks[enemy | ROOK] != 0) as i32
                        + (node.atks[enemy | QUEEN] != 0) as i32;
                    if slider_kinds >= 2 {
                        contact = 0;
                    }
                }
                if contact == 0 {
                    score -= 20;
                    node.state |= threat_bit(color);
                }
            }
        }
        let mut w = KNIGHT_ATK[sqr] & node.atks[enemy | KNIGHT] & !node.atks[color];
        while w != 0 {
            let chksqr = pop_low(&mut w);
            if p & !KNIGHT_ATK[chksqr] == 0 {
                score -= 20;
                node.state |= threat_bit(color);
                break;
            }
        }
    }

    // Penalty for standing in front of own pawns.
    if bit(sqr) & node.pinfo[color].front != 0 {
        score -= (10.0 + 40.0 * ratio) as i32;
    }

    // Midgame shelter and pressure, weighted by remaining enemy material.
    if node.majors_and_minors(enemy) != 0 {
        let mut mid = 0;

        // Attack pressure first: the scale below depends on it. A single
        // attacker cannot mate, and two often cannot either, so the
        // two-attacker case is halved.
        if node.atk_count[enemy] > 1 {
            mid -= ATK_WEIGHT[node.atk_count[enemy] as usize] * node.atk_score[enemy] / 100;
            if node.atk_count[enemy] == 2 {
                mid /= 2;
            }
        }

        // Holes in the king zone.
        let back = RANKS[if color == WHITE { 0 } else { 7 }];
        let mut holes =
            KING_ZONE[sqr] & !(bit(sqr) | back | node.atks[color | PAWN] | node.pc[color | PAWN]);
        if holes != 0 {
            mid -= if node.state & castle_mask(color) != 0 {
                4 * count(holes)
            } else {
                8 * count(holes)
            };
            holes &= node.atks[enemy];
            if holes != 0 {
                mid -= 6 * count(holes);
                holes &= !node.atks[color];
                if holes != 0 {
                    mid -= 6 * count(holes);
                }
            }
        }

        // Open and half-open files near the king.
        let files: &[usize] = match xc(sqr) {
            0..=2 => &[0, 1, 2],
            3 | 4 => &[2, 3, 4, 5],
            _ => &[5, 6, 7],
        };
        for &f in files {
            mid -= 6 * i32::from(FILES[f] & node.pc[WHITE | PAWN] == 0);
            mid -= 6 * i32::from(FILES[f] & node.pc[BLACK | PAWN] == 0);
        }

        score += (ratio * mid as f32) as i32;
    }

    score
}

/// Score passed pawns; needs every attack map, so it runs last.
fn passer_eval(node: &Node, color: Color) -> i32 {
    let mut p = node.pinfo[color].passed;
    debug_assert!(p != 0);
    let enemy = color ^ 1;
    let mut score = 0;

    while p != 0 {
        let sqr = low_square(p);
        let b = low_bit(p);
        p ^= b;

        let mut bonus = PASSER_PROGRESS[relative_rank(color, sqr) as usize];

        // Without rooks or queens the king and knights must escort.
        if node.major_pieces(color) == 0 {
            let mut friends = node.pc[color | KNIGHT] | node.pc[color | KING];
            let mut near = 8;
            while friends != 0 {
                near = near.min(dist(sqr, pop_low(&mut friends)));
            }
            bonus -= 8 * near;
        }
        if node.major_pieces(enemy) == 0 {
            let mut foes = node.pc[enemy | KNIGHT] | node.pc[enemy | KING];
            let mut near = 8;
            while foes != 0 {
                near = near.min(dist(sqr, pop_low(&mut foes)));
            }
            bonus += 8 * near;
        }

        if b & node.pinfo[color].connected != 0 {
            bonus += bonus / 3;
            if node.pinfo[color].passed
                & (ADJACENT[sqr] | PAWN_ATK[color][sqr] | PAWN_ATK[enemy][sqr])
                != 0
            {
                bonus = (bonus as f32 * 1.33) as i32;
            }
        }

        if node.occupied() & bit(step(sqr, fwd(color))) != 0 {
            bonus /= 2;
        } else if node.major_pieces(enemy) & node.ray_x(-fwd(color), sqr) != 0 {
            // Enemy rook or queen directly behind it.
            bonus /= 2;
        } else {
            let path = front_ray(color, sqr);
            if path & (node.occupied() | node.atks[enemy]) == 0 {
                bonus += 20;
                if node.only_has_pawns(enemy) {
                    // Square rule: can it outrun the enemy king?
                    let dest = (if color == WHITE { sq::A8 } else { sq::A1 }) + xc(sqr);
                    let to_move_lag = i32::from(node.color_to_move() != color);
                    if dist(sqr, dest) + to_move_lag < dist(node.king[enemy], dest) {
                        bonus += 200;
                    }
                }
            }
        }

        score += bonus;
    }
    score
}

/// Full static evaluation. Populates the attack maps, pin masks, pawn
/// caches, and `stand_pat`, sets the Draw flag on dead material, and
/// returns the score from White's perspective.
pub fn evaluate(node: &mut Node, parent: Option<&Node>, params: &Params) -> i32 {
    debug_assert!(node.state & DRAW_FLAG == 0);

    node.atks = [0; crate::types::PIECE_TYPE_COUNT];
    node.atk_count = [0; 2];
    node.atk_score = [0; 2];

    let mut eval = if node.color_to_move() == BLACK {
        -params.tempo
    } else {
        params.tempo
    } + node.material[WHITE]
        - node.material[BLACK]
        + node.sqr_val[WHITE]
        - node.sqr_val[BLACK]
        + get_pins(node, BLACK, 6)
        - get_pins(node, WHITE, 6);

    // Having no pawns at all is its own penalty.
    if node.pc[WHITE | PAWN] != 0 {
        eval += pawn_eval(node, WHITE);
    } else {
        eval -= 50;
    }
    if node.pc[BLACK | PAWN] != 0 {
        eval -= pawn_eval(node, BLACK);
    } else {
        eval += 50;
    }
    if node.pc[WHITE | KNIGHT] != 0 {
        eval += knight_eval(node, WHITE);
    }
    if node.pc[BLACK | KNIGHT] != 0 {
        eval -= knight_eval(node, BLACK);
    }
    if node.pc[WHITE | BISHOP] != 0 {
        eval += bishop_eval(node, parent, WHITE);
    }
    if node.pc[BLACK | BISHOP] != 0 {
        eval -= bishop_eval(node, parent, BLACK);
    }
    if node.pc[WHITE | ROOK] != 0 {
        eval += rook_eval(node, parent, WHITE);
    }
    if node.pc[BLACK | ROOK] != 0 {
        eval -= rook_eval(node, parent, BLACK);
    }
    if node.pc[WHITE | QUEEN] != 0 {
        eval += queen_eval(node, parent, WHITE);
    }
    if node.pc[BLACK | QUEEN] != 0 {
        eval -= queen_eval(node, parent, BLACK);
    }

    // Aggregate attack maps without the kings, for king evaluation.
    node.atks[WHITE] = node.atks[WHITE | PAWN]
        | node.atks[WHITE | KNIGHT]
        | node.atks[WHITE | BISHOP]
        | node.atks[WHITE | ROOK]
        | node.atks[WHITE | QUEEN];
    node.atks[BLACK] = node.atks[BLACK | PAWN]
        | node.atks[BLACK | KNIGHT]
        | node.atks[BLACK | BISHOP]
        | node.atks[BLACK | ROOK]
        | node.atks[BLACK | QUEEN];

    eval += king_eval(node, WHITE, params);
    eval -= king_eval(node, BLACK, params);

    node.atks[WHITE | KING] = KING_ATK[node.king[WHITE]];
    node.atks[BLACK | KING] = KING_ATK[node.king[BLACK]];
    node.atks[WHITE] |= node.atks[WHITE | KING];
    node.atks[BLACK] |= node.atks[BLACK | KING];

    if node.pinfo[WHITE].passed != 0 {
        eval += passer_eval(node, WHITE);
    }
    if node.pinfo[BLACK].passed != 0 {
        eval -= passer_eval(node, BLACK);
    }

    // Board coverage, with extra weight on the centers and king rings.
    let kings_ring = node.atks[WHITE | KING] | node.atks[BLACK | KING];
    let x = node.atks[WHITE | PAWN]
        | node.atks[WHITE | KNIGHT]
        | node.atks[WHITE | BISHOP]
        | node.atks[WHITE | ROOK]
        | (node.atks[WHITE | QUEEN] & (CENTER16 | kings_ring));
    eval += count(x) + count(x & CENTER16) + count(x & CENTER4) + count(x & kings_ring);
    let x = node.atks[BLACK | PAWN]
        | node.atks[BLACK | KNIGHT]
        | node.atks[BLACK | BISHOP]
        | node.atks[BLACK | ROOK]
        | (node.atks[BLACK | QUEEN] & (CENTER16 | kings_ring));
    eval -= count(x) + count(x & CENTER16) + count(x & CENTER4) + count(x & kings_ring);

    // Loose pawns and minors.
    let loose = (node.pc[WHITE | PAWN] | node.minor_pieces(WHITE)) & !node.atks[WHITE];
    if loose != 0 {
        eval -= 6 * count(loose);
    }
    let loose = (node.pc[BLACK | PAWN] | node.minor_pieces(BLACK)) & !node.atks[BLACK];
    if loose != 0 {
        eval += 6 * count(loose);
    }

    if node.pc[WHITE | PAWN] != 0 || node.pc[BLACK | PAWN] != 0 {
        // Uncontested space behind connected pawns.
        let mut x = node.pinfo[WHITE].behind & !node.atks[BLACK];
        x &= x >> 8;
        eval += 2 * count(x);
        let mut x = node.pinfo[BLACK].behind & !node.atks[WHITE];
        x &= x >> 8;
        eval -= 2 * count(x);

        // Knights gain value with pawns on the board, rooks lose it.
        let mut density = 4 * (node.pinfo[WHITE].count + node.pinfo[BLACK].count) / 3;
        if node.pc[WHITE | KNIGHT] != 0 {
            eval += density;
        }
        if node.pc[BLACK | KNIGHT] != 0 {
            eval -= density;
        }
        density = 4 * density / 3;
        if node.pc[WHITE | ROOK] != 0 {
            eval += 28 - density;
        }
        if node.pc[BLACK | ROOK] != 0 {
            eval -= 28 - density;
        }

        // Shrink the score when the pawn wall is mutually locked.
        let mut locked = (node.pinfo[WHITE].connected << 8) & node.pinfo[BLACK].connected;
        if locked != 0 {
            locked &= !((locked & !FILES[0]) >> 1);
            let n = count(locked);
            if n > 2 {
                eval = eval * (10 - n) / 8;
            }
        }
    }

    // Dead or nearly-dead material configurations.
    let white_pcs = node.majors_and_minors(WHITE);
    let black_pcs = node.majors_and_minors(BLACK);
    let white_can_win = node.pc[WHITE | PAWN] != 0
        || node.pc[WHITE | ROOK] != 0
        || node.pc[WHITE | QUEEN] != 0
        || multi_bit(node.pc[WHITE | BISHOP]) != 0
        || (node.pc[WHITE | KNIGHT] != 0 && node.pc[WHITE | BISHOP] != 0)
        || count(white_pcs) > 2;
    let black_can_win = node.pc[BLACK | PAWN] != 0
        || node.pc[BLACK | ROOK] != 0
        || node.pc[BLACK | QUEEN] != 0
        || multi_bit(node.pc[BLACK | BISHOP]) != 0
        || (node.pc[BLACK | KNIGHT] != 0 && node.pc[BLACK | BISHOP] != 0)
        || count(black_pcs) > 2;

    if !white_can_win && !black_can_win {
        node.state |= DRAW_FLAG;
    } else if eval > 0 && !white_can_win {
        eval = 24.min(eval / 6);
    } else if eval < 0 && !black_can_win {
        eval = (-24).max(eval / 6);
    } else if single_bit(white_pcs)
        && single_bit(black_pcs)
        && white_pcs == node.pc[WHITE | BISHOP]
        && black_pcs == node.pc[BLACK | BISHOP]
        && (white_pcs & LIGHT == 0) != (black_pcs & LIGHT == 0)
    {
        // Opposite-colored bishop ending.
        eval /= 4;
    } else if node.pc[WHITE | PAWN] == 0 && node.pc[BLACK | PAWN] == 0 {
        if single_bit(white_pcs)
            && single_bit(black_pcs)
            && ((white_pcs == node.pc[WHITE | ROOK]) != (black_pcs == node.pc[BLACK | ROOK]))
        {
            // Lone rook versus lone minor or queen-less piece.
            eval /= 4;
        } else if white_pcs == node.pc[WHITE | ROOK]
            && black_pcs == node.pc[BLACK | BISHOP]
            && single_bit(white_pcs)
            && count(black_pcs) == 2
        {
            eval /= 5;
        } else if black_pcs == node.pc[BLACK | ROOK]
            && white_pcs == node.pc[WHITE | BISHOP]
            && single_bit(black_pcs)
            && count(white_pcs) == 2
        {
            eval /= 5;
        }
    } else if black_pcs == 0
        && single_bit(node.pc[BLACK | PAWN])
        && node.pc[WHITE | PAWN] == 0
        && single_bit(white_pcs)
        && white_pcs == node.minor_pieces(WHITE)
    {
        // Lone pawn versus lone minor.
        eval /= 4;
    } else if white_pcs == 0
        && single_bit(node.pc[WHITE | PAWN])
        && node.pc[BLACK | PAWN] == 0
        && single_bit(black_pcs)
        && black_pcs == node.minor_pieces(BLACK)
    {
        eval /= 4;
    } else if !black_can_win && eval > -24 {
        // The opponent cannot win and we are not clearly worse.
        eval += 150;
    } else if !white_can_win && eval < 24 {
        eval -= 150;
    }

    // Fade the score as the reversible-move counter grows. This
    // destabilizes transposition values slightly since rcount is not part
    // of the position key.
    if node.rcount > 25 && eval.abs() > 8 {
        eval = (eval as f32 * (25.0 / node.rcount as f32)) as i32;
    }

    node.stand_pat = if node.color_to_move() == BLACK {
        -eval
    } else {
        eval
    };

    #[cfg(debug_assertions)]
    node.verify();

    eval
}
