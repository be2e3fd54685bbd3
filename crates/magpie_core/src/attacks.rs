//! Pre-computed attack tables for move generation and attack detection.
//!
//! This module contains:
//! - Knight and king attack tables (constant)
//! - Pawn attack tables (constant, per color)
//! - BETWEEN table for check and pin mask computation (constant)
//! - Magic-indexed sliding attacks for rooks and bishops, built once at
//!   startup behind a `LazyLock`
//!
//! After initialization everything here is read-only; concurrent reads from
//! independent engine instances need no synchronization.

use std::sync::LazyLock;

use crate::bitboard::Bitboard;
use crate::types::Color;

/// Pre-computed knight attacks for each square.
pub static KNIGHT_ATTACKS: [Bitboard; 64] = {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let bb = Bitboard::from_square(sq);

        // All 8 L-shaped jumps with file-wrap masking.
        let mut result = 0u64;
        result |= (bb.0 << 17) & Bitboard::NOT_FILE_A.0;
        result |= (bb.0 << 15) & Bitboard::NOT_FILE_H.0;
        result |= (bb.0 << 10) & !(Bitboard::FILE_A.0 | Bitboard::FILE_A.0 << 1);
        result |= (bb.0 << 6) & !(Bitboard::FILE_H.0 | Bitboard::FILE_H.0 >> 1);
        result |= (bb.0 >> 6) & !(Bitboard::FILE_A.0 | Bitboard::FILE_A.0 << 1);
        result |= (bb.0 >> 10) & !(Bitboard::FILE_H.0 | Bitboard::FILE_H.0 >> 1);
        result |= (bb.0 >> 15) & Bitboard::NOT_FILE_A.0;
        result |= (bb.0 >> 17) & Bitboard::NOT_FILE_H.0;

        attacks[sq as usize] = Bitboard(result);
        sq += 1;
    }
    attacks
};

/// Pre-computed king attacks for each square.
pub static KING_ATTACKS: [Bitboard; 64] = {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let bb = Bitboard::from_square(sq);

        let mut result = 0u64;
        result |= bb.0 << 8;
        result |= bb.0 >> 8;
        result |= (bb.0 << 1) & Bitboard::NOT_FILE_A.0;
        result |= (bb.0 >> 1) & Bitboard::NOT_FILE_H.0;
        result |= (bb.0 << 9) & Bitboard::NOT_FILE_A.0;
        result |= (bb.0 << 7) & Bitboard::NOT_FILE_H.0;
        result |= (bb.0 >> 7) & Bitboard::NOT_FILE_A.0;
        result |= (bb.0 >> 9) & Bitboard::NOT_FILE_H.0;

        attacks[sq as usize] = Bitboard(result);
        sq += 1;
    }
    attacks
};

/// Pawn attacks per color and square. PAWN_ATTACKS[color][sq] is the set of
/// squares a pawn of that color on `sq` attacks.
pub static PAWN_ATTACKS: [[Bitboard; 64]; 2] = {
    let mut attacks = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0u8;
    while sq < 64 {
        let bb = Bitboard::from_square(sq);
        attacks[0][sq as usize] = Bitboard(
            ((bb.0 << 9) & Bitboard::NOT_FILE_A.0) | ((bb.0 << 7) & Bitboard::NOT_FILE_H.0),
        );
        attacks[1][sq as usize] = Bitboard(
            ((bb.0 >> 7) & Bitboard::NOT_FILE_A.0) | ((bb.0 >> 9) & Bitboard::NOT_FILE_H.0),
        );
        sq += 1;
    }
    attacks
};

/// Squares strictly between two aligned squares (rook or bishop line),
/// empty when the squares do not share a line.
pub static BETWEEN: [[Bitboard; 64]; 64] = build_between_table();

const fn build_between_table() -> [[Bitboard; 64]; 64] {
    let mut between = [[Bitboard::EMPTY; 64]; 64];

    const DIRS: [(i8, i8); 8] = [
        (0, 1),
        (1, 1),
        (1, 0),
        (1, -1),
        (0, -1),
        (-1, -1),
        (-1, 0),
        (-1, 1),
    ];

    let mut a = 0usize;
    while a < 64 {
        let af = (a % 8) as i8;
        let ar = (a / 8) as i8;

        let mut d = 0usize;
        while d < 8 {
            let (df, dr) = DIRS[d];

            // Walk outward from `a`; path accumulates the squares passed.
            let mut path = 0u64;
            let mut f = af + df;
            let mut r = ar + dr;
            while f >= 0 && f < 8 && r >= 0 && r < 8 {
                let b = (r * 8 + f) as usize;
                between[a][b] = Bitboard(path);
                path |= 1u64 << b;
                f += df;
                r += dr;
            }
            d += 1;
        }
        a += 1;
    }
    between
}

#[inline(always)]
pub fn knight_attacks(sq: u8) -> Bitboard {
    KNIGHT_ATTACKS[sq as usize]
}

#[inline(always)]
pub fn king_attacks(sq: u8) -> Bitboard {
    KING_ATTACKS[sq as usize]
}

#[inline(always)]
pub fn pawn_attacks(color: Color, sq: u8) -> Bitboard {
    PAWN_ATTACKS[color.idx()][sq as usize]
}

/// Squares strictly between `a` and `b`, empty if unaligned.
#[inline(always)]
pub fn between(a: u8, b: u8) -> Bitboard {
    BETWEEN[a as usize][b as usize]
}

// =============================================================================
// Magic bitboards for sliding pieces
// =============================================================================

/// Known-good magic multipliers for rook attack indexing.
const ROOK_MAGICS: [u64; 64] = [
    324268244150067216,
    18014467241615360,
    144133098098016288,
    9835879179034305920,
    2341893796599431808,
    72058693650744320,
    72138957906837508,
    36031718687244416,
    9429417088524417,
    3448137205161984,
    599541975809556992,
    24206986510467089,
    9225764591361853442,
    1299570010489946152,
    2324701927143178244,
    289497015695460608,
    1188950576547758144,
    22518273019486208,
    150083874115584,
    72480356527245318,
    622061898095134864,
    282574522155016,
    1513354610365432208,
    4505798717767745,
    36033475312148480,
    9042385782718464,
    9042385782706176,
    146375786131095680,
    9241461204310820864,
    11263399264125056,
    4509183089578022,
    1549379062991045888,
    36029072077234177,
    282033356030564,
    648537875641540608,
    149535804362752,
    144119588278257664,
    563023001422856,
    867242304870547969,
    140772930224896,
    36068964627415040,
    2312633594369556480,
    2882374688608223264,
    4611704443839315978,
    743376530318622736,
    288793394971541572,
    576746633916645632,
    288232035151118337,
    9337371051694237952,
    2900459172409647360,
    140806209929344,
    1153255760570908800,
    9233826195559678080,
    146648471594860800,
    9288831031312640,
    117375068610339072,
    88510713348353,
    4621348666215514117,
    145276555823317074,
    4611862391259680769,
    72620612914251778,
    844459325784069,
    36031064895947012,
    714962008014946,
];

/// Known-good magic multipliers for bishop attack indexing.
const BISHOP_MAGICS: [u64; 64] = [
    580610875736196,
    23564740739597186,
    326529222334482440,
    77691588255417536,
    1130985450111360,
    4611972303834579969,
    1130315334811664,
    2315207556594663936,
    9223970858442211456,
    18031995028275712,
    576469583309971472,
    4450265595906,
    2305865019312570880,
    217523137082843666,
    4045642047909150722,
    4710837787133356048,
    434880007787511936,
    9009433585680512,
    436849172780421152,
    108649358224916772,
    438540779691705378,
    35192970682377,
    649081313491486720,
    576847870658939912,
    27035144259896384,
    1319572837126377617,
    1155175503460828416,
    9804340787373408264,
    1153488854787851781,
    36100815047401473,
    9232521077431212034,
    2594372731718076560,
    1130573932306952,
    576614890645490304,
    2595201520813278208,
    289359031280599552,
    1154329996182815008,
    148621056000790529,
    289958812725561412,
    54330187963237376,
    144260529904435472,
    2306040990160650752,
    35326911842304,
    5931291424623436032,
    74036998572082176,
    9042389024940161,
    6944551733516304896,
    9800118666640099842,
    9235778941229858816,
    900755763354943488,
    2305845209479021065,
    578862094850990096,
    2379167309467090945,
    576496074418061450,
    2938952834131167360,
    1161933104089677892,
    18298381948686900,
    18312403876054272,
    11529496522221159426,
    4611690528285924352,
    1170936316574368768,
    8814904738050,
    7084338273224524178,
    93458500239262209,
];

/// One piece type's magic attack table: for each square, the relevant
/// occupancy mask, the magic multiplier, the index shift, and an offset into
/// one shared attack array. The multiply-shift is a perfect hash from any
/// legal blocker subset of the mask to the resulting attack set.
struct MagicTable {
    magic: [u64; 64],
    mask: [u64; 64],
    shift: [u8; 64],
    offset: [usize; 64],
    attacks: Vec<u64>,
}

impl MagicTable {
    #[inline(always)]
    fn attacks(&self, sq: u8, occ: u64) -> u64 {
        let s = sq as usize;
        let idx = self.offset[s]
            + (((occ & self.mask[s]).wrapping_mul(self.magic[s])) >> self.shift[s]) as usize;
        debug_assert!(idx < self.attacks.len());
        self.attacks[idx]
    }
}

struct SlidingAttacks {
    rook: MagicTable,
    bishop: MagicTable,
}

static SLIDING: LazyLock<SlidingAttacks> = LazyLock::new(|| SlidingAttacks {
    rook: build_table(&ROOK_MAGICS, rook_relevant_mask, rook_attacks_slow),
    bishop: build_table(&BISHOP_MAGICS, bishop_relevant_mask, bishop_attacks_slow),
});

fn build_table(
    magics: &[u64; 64],
    relevant_mask: fn(u8) -> u64,
    slow_attacks: fn(u8, u64) -> u64,
) -> MagicTable {
    let mut mask = [0u64; 64];
    let mut shift = [0u8; 64];
    let mut offset = [0usize; 64];
    let mut total = 0usize;

    for s in 0..64 {
        mask[s] = relevant_mask(s as u8);
        shift[s] = 64 - mask[s].count_ones() as u8;
        offset[s] = total;
        total += 1usize << mask[s].count_ones();
    }

    let mut attacks = vec![0u64; total];
    for s in 0..64 {
        enumerate_subsets(mask[s], |subocc| {
            let idx = offset[s] + ((subocc.wrapping_mul(magics[s])) >> shift[s]) as usize;
            let atk = slow_attacks(s as u8, subocc);
            // A non-perfect magic would map two blocker subsets with
            // different attack sets to the same slot.
            assert!(
                attacks[idx] == 0 || attacks[idx] == atk,
                "magic collision at square {s}"
            );
            attacks[idx] = atk;
        });
    }

    MagicTable {
        magic: *magics,
        mask,
        shift,
        offset,
        attacks,
    }
}

/// Visit every subset of `mask` (Carry-Rickler enumeration).
fn enumerate_subsets(mask: u64, mut f: impl FnMut(u64)) {
    let mut sub = 0u64;
    loop {
        f(sub);
        sub = sub.wrapping_sub(mask) & mask;
        if sub == 0 {
            break;
        }
    }
}

/// Rook occupancy mask: the rays from `sq`, excluding board-edge squares
/// (an edge blocker never changes the attack set).
fn rook_relevant_mask(sq: u8) -> u64 {
    let f = (sq % 8) as i32;
    let r = (sq / 8) as i32;
    let mut m = 0u64;
    for rr in r + 1..7 {
        m |= 1u64 << (rr * 8 + f);
    }
    for rr in 1..r {
        m |= 1u64 << (rr * 8 + f);
    }
    for ff in f + 1..7 {
        m |= 1u64 << (r * 8 + ff);
    }
    for ff in 1..f {
        m |= 1u64 << (r * 8 + ff);
    }
    m
}

fn bishop_relevant_mask(sq: u8) -> u64 {
    let f = (sq % 8) as i32;
    let r = (sq / 8) as i32;
    let mut m = 0u64;
    for (df, dr) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        let mut ff = f + df;
        let mut rr = r + dr;
        while (1..7).contains(&ff) && (1..7).contains(&rr) {
            m |= 1u64 << (rr * 8 + ff);
            ff += df;
            rr += dr;
        }
    }
    m
}

fn ray_attacks_slow(sq: u8, occ: u64, dirs: [(i32, i32); 4]) -> u64 {
    let f0 = (sq % 8) as i32;
    let r0 = (sq / 8) as i32;
    let mut attacks = 0u64;
    for (df, dr) in dirs {
        let mut f = f0 + df;
        let mut r = r0 + dr;
        while (0..8).contains(&f) && (0..8).contains(&r) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if occ & bit != 0 {
                break;
            }
            f += df;
            r += dr;
        }
    }
    attacks
}

fn rook_attacks_slow(sq: u8, occ: u64) -> u64 {
    ray_attacks_slow(sq, occ, [(0, 1), (0, -1), (1, 0), (-1, 0)])
}

fn bishop_attacks_slow(sq: u8, occ: u64) -> u64 {
    ray_attacks_slow(sq, occ, [(1, 1), (1, -1), (-1, 1), (-1, -1)])
}

/// Rook attacks from `sq` with the given occupancy, via magic lookup.
#[inline]
pub fn rook_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    Bitboard(SLIDING.rook.attacks(sq, occupied.0))
}

/// Bishop attacks from `sq` with the given occupancy, via magic lookup.
#[inline]
pub fn bishop_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    Bitboard(SLIDING.bishop.attacks(sq, occupied.0))
}

/// Queen attacks: union of rook and bishop attacks.
#[inline]
pub fn queen_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

#[cfg(test)]
#[path = "attacks_tests.rs"]
mod attacks_tests;
