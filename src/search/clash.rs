//! Static-exchange ("clash") resolution on a single square.
//!
//! For one square and one color, a `ClashMask` packs saturating counts of
//! every piece kind covering the square into 13 bits, with dedicated
//! slots for a rook or bishop hidden behind a friendly queen on the same
//! line — those only come into play once the queen has captured. The
//! resolver plays out the capture sequence cheapest-attacker-first and
//! memoizes every (occupant, attackers, defenders) triple for the life of
//! the process: the result depends only on piece composition, never on
//! board geometry, so entries are never invalidated.

use std::collections::HashMap;

use crate::board::chess_types::{Color, PieceKind, Score, Square};
use crate::board::piece_geometry::{
    kind_slides_in, offset, pawn_attack_dirs, ray_squares, KING_DIRS, KNIGHT_STEPS,
};
use crate::search::overlay::Overlay;

/// Sentinel meaning "capturing here loses material — don't".
pub const DONT_CAPTURE: Score = -1;

const PAWN_SHIFT: u16 = 0;
const KNIGHT_SHIFT: u16 = 2;
const BISHOP_SHIFT: u16 = 4;
const ROOK_SHIFT: u16 = 6;
const HIDDEN_BISHOP_BIT: u16 = 1 << 8;
const HIDDEN_ROOK_BIT: u16 = 1 << 9;
const QUEEN_SHIFT: u16 = 10;
const KING_BIT: u16 = 1 << 12;

const COUNT_MASK: u16 = 0b11;

/// 13-bit packed census of one color's cover of a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ClashMask(u16);

impl ClashMask {
    #[inline]
    pub fn bits(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Only the king covers the square.
    #[inline]
    pub fn is_king_only(self) -> bool {
        self.0 == KING_BIT
    }

    fn count_at(self, shift: u16) -> u16 {
        (self.0 >> shift) & COUNT_MASK
    }

    fn bump(&mut self, shift: u16) {
        if self.count_at(shift) < COUNT_MASK {
            self.0 += 1 << shift;
        }
    }

    fn drop_one(&mut self, shift: u16) {
        debug_assert!(self.count_at(shift) > 0);
        self.0 -= 1 << shift;
    }

    /// Record an ordinary attacker of the given kind.
    pub fn add(&mut self, kind: PieceKind) {
        match kind {
            PieceKind::Pawn => self.bump(PAWN_SHIFT),
            PieceKind::Knight => self.bump(KNIGHT_SHIFT),
            PieceKind::Bishop => self.bump(BISHOP_SHIFT),
            PieceKind::Rook => self.bump(ROOK_SHIFT),
            PieceKind::Queen => self.bump(QUEEN_SHIFT),
            PieceKind::King => self.0 |= KING_BIT,
        }
    }

    /// Record a rook or bishop lined up behind a friendly queen. Other
    /// kinds have no hidden slot and are ignored.
    pub fn add_hidden(&mut self, kind: PieceKind) {
        match kind {
            PieceKind::Bishop => self.0 |= HIDDEN_BISHOP_BIT,
            PieceKind::Rook => self.0 |= HIDDEN_ROOK_BIT,
            _ => {}
        }
    }

    pub fn attacker_count(self) -> u32 {
        (self.count_at(PAWN_SHIFT)
            + self.count_at(KNIGHT_SHIFT)
            + self.count_at(BISHOP_SHIFT)
            + self.count_at(ROOK_SHIFT)
            + self.count_at(QUEEN_SHIFT)) as u32
            + u32::from(self.0 & HIDDEN_BISHOP_BIT != 0)
            + u32::from(self.0 & HIDDEN_ROOK_BIT != 0)
            + u32::from(self.0 & KING_BIT != 0)
    }

    /// The cheapest piece kind able to capture right now. Hidden sliders
    /// are not eligible until the queen in front of them is gone.
    pub fn cheapest(self) -> Option<PieceKind> {
        if self.count_at(PAWN_SHIFT) > 0 {
            Some(PieceKind::Pawn)
        } else if self.count_at(KNIGHT_SHIFT) > 0 {
            Some(PieceKind::Knight)
        } else if self.count_at(BISHOP_SHIFT) > 0 {
            Some(PieceKind::Bishop)
        } else if self.count_at(ROOK_SHIFT) > 0 {
            Some(PieceKind::Rook)
        } else if self.count_at(QUEEN_SHIFT) > 0 {
            Some(PieceKind::Queen)
        } else if self.0 & KING_BIT != 0 {
            Some(PieceKind::King)
        } else {
            None
        }
    }

    /// Remove the cheapest attacker, reclassifying hidden sliders into
    /// their ordinary slots when a queen leaves the square's line.
    pub fn remove_cheapest(self) -> Option<(PieceKind, ClashMask)> {
        let kind = self.cheapest()?;
        let mut rest = self;
        match kind {
            PieceKind::Pawn => rest.drop_one(PAWN_SHIFT),
            PieceKind::Knight => rest.drop_one(KNIGHT_SHIFT),
            PieceKind::Bishop => rest.drop_one(BISHOP_SHIFT),
            PieceKind::Rook => rest.drop_one(ROOK_SHIFT),
            PieceKind::Queen => {
                rest.drop_one(QUEEN_SHIFT);
                if rest.0 & HIDDEN_BISHOP_BIT != 0 {
                    rest.0 &= !HIDDEN_BISHOP_BIT;
                    rest.bump(BISHOP_SHIFT);
                }
                if rest.0 & HIDDEN_ROOK_BIT != 0 {
                    rest.0 &= !HIDDEN_ROOK_BIT;
                    rest.bump(ROOK_SHIFT);
                }
            }
            PieceKind::King => rest.0 &= !KING_BIT,
        }
        Some((kind, rest))
    }
}

/// Resolved outcome of a capture sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClashOutcome {
    /// Net material result for the capturing side; `DONT_CAPTURE` when
    /// starting the exchange loses material or is impossible.
    pub score: Score,
    /// Piece kind left standing on the square after best play.
    pub standing: PieceKind,
}

/// Process-lifetime memo table for clash resolution. Append-only; cold
/// and warm lookups give identical results since every entry is a pure
/// function of its key.
#[derive(Debug, Default)]
pub struct ClashCache {
    table: HashMap<u32, ClashOutcome>,
    hits: u64,
    misses: u64,
}

impl ClashCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn hit_rate(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Best achievable net result of capturing the piece of `occupant`
    /// kind, for the side owning `attackers`, with captures carried out in
    /// increasing order of attacker value. The defender recaptures only
    /// when that is favorable in turn.
    pub fn resolve(
        &mut self,
        occupant: PieceKind,
        attackers: ClashMask,
        defenders: ClashMask,
    ) -> ClashOutcome {
        // Occupant kind folds into the key: the mask pair alone does not
        // fix the value of the first capture.
        let key = occupant.index() as u32
            | (attackers.bits() as u32) << 3
            | (defenders.bits() as u32) << 16;
        if let Some(&cached) = self.table.get(&key) {
            self.hits += 1;
            return cached;
        }
        self.misses += 1;

        let outcome = self.resolve_uncached(occupant, attackers, defenders);
        self.table.insert(key, outcome);
        outcome
    }

    fn resolve_uncached(
        &mut self,
        occupant: PieceKind,
        attackers: ClashMask,
        defenders: ClashMask,
    ) -> ClashOutcome {
        let dont = ClashOutcome {
            score: DONT_CAPTURE,
            standing: occupant,
        };

        // A bare king cannot wade into a covered square.
        if attackers.is_empty() || (attackers.is_king_only() && !defenders.is_empty()) {
            return dont;
        }

        let (cheapest, rest) = attackers
            .remove_cheapest()
            .expect("non-empty mask has a cheapest attacker");

        // The opponent now faces our `cheapest` standing on the square.
        let counter = self.resolve(cheapest, defenders, rest);
        let recapture_loss = counter.score.max(0);
        let net = occupant.value() - recapture_loss;
        if net < 0 {
            return dont;
        }

        let standing = if counter.score > 0 {
            counter.standing
        } else {
            cheapest
        };
        ClashOutcome {
            score: net,
            standing,
        }
    }
}

/// Census of `color`'s cover of `sq` under `overlay`. The occupant of the
/// square itself is never counted. Sliding cover looks through exactly
/// one friendly queen to find a hidden rook or bishop on the same line.
pub fn build_clash_mask(color: Color, sq: Square, overlay: &Overlay) -> ClashMask {
    let mut mask = ClashMask::default();

    // Pawns attack from the squares they would capture *from*.
    for dir in pawn_attack_dirs(color) {
        if let Some(src) = offset(sq, (-dir.0, -dir.1)) {
            if let Some(piece) = overlay.piece_at(src) {
                if piece.color == color && piece.kind == PieceKind::Pawn {
                    mask.add(PieceKind::Pawn);
                }
            }
        }
    }

    for step in KNIGHT_STEPS {
        if let Some(src) = offset(sq, step) {
            if let Some(piece) = overlay.piece_at(src) {
                if piece.color == color && piece.kind == PieceKind::Knight {
                    mask.add(PieceKind::Knight);
                }
            }
        }
    }

    for dir in KING_DIRS {
        // Adjacent king cover.
        if let Some(src) = offset(sq, dir) {
            if let Some(piece) = overlay.piece_at(src) {
                if piece.color == color && piece.kind == PieceKind::King {
                    mask.add(PieceKind::King);
                }
            }
        }

        // First piece along the ray, then at most one hidden slider
        // behind a friendly queen.
        let mut front: Option<PieceKind> = None;
        for ray_sq in ray_squares(sq, dir) {
            let Some(piece) = overlay.piece_at(ray_sq) else {
                continue;
            };
            match front {
                None => {
                    if piece.color == color && kind_slides_in(piece.kind, dir) {
                        mask.add(piece.kind);
                        if piece.kind == PieceKind::Queen {
                            front = Some(PieceKind::Queen);
                            continue;
                        }
                    }
                    break;
                }
                Some(PieceKind::Queen) => {
                    if piece.color == color
                        && piece.kind != PieceKind::Queen
                        && kind_slides_in(piece.kind, dir)
                    {
                        mask.add_hidden(piece.kind);
                    }
                    break;
                }
                _ => break,
            }
        }
    }

    mask
}

/// Whether any piece of `color` covers `sq` under `overlay`.
pub fn is_square_covered_by(color: Color, sq: Square, overlay: &Overlay) -> bool {
    !build_clash_mask(color, sq, overlay).is_empty()
}

/// Whether `color`'s king is attacked under `overlay`. A side without a
/// king (study positions) is never in check.
pub fn is_in_check(color: Color, overlay: &Overlay) -> bool {
    match overlay.king_square(color) {
        Some(sq) => is_square_covered_by(color.opposite(), sq, overlay),
        None => false,
    }
}
