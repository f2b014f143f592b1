use rand::Rng;

use crate::domain::Tip;

/// Quote gap below which a match counts as too close to call.
const DRAW_BAND: f64 = 0.25;
/// Quote gap above which the goal count is damped; very unequal pairings
/// would otherwise produce absurd scores.
const LOPSIDED_GAP: f64 = 7.0;
const DEFAULT_COEFFICIENT: f64 = 0.75;
const LOPSIDED_COEFFICIENT: f64 = 0.3;

/// Source of the single random goal mixed into every prediction. Injected so
/// the calculator itself stays deterministic.
pub trait RandomBit: Send {
    /// Returns 0 or 1, each with probability one half.
    fn random_bit(&mut self) -> u32;
}

pub struct ThreadRngBit;

impl RandomBit for ThreadRngBit {
    fn random_bit(&mut self) -> u32 {
        rand::thread_rng().gen_range(0..=1)
    }
}

/// Always the same bit. Makes runs reproducible.
pub struct FixedBit(pub u32);

impl RandomBit for FixedBit {
    fn random_bit(&mut self) -> u32 {
        self.0 & 1
    }
}

/// Score prediction from the home and away win quotes. The draw quote does
/// not participate in the formula; it is carried along for notifications
/// only. Rounding is half away from zero on a non-negative magnitude, so no
/// clamp is needed anywhere.
pub fn calculate_tip(home_quote: f64, away_quote: f64, random: &mut dyn RandomBit) -> Tip {
    let diff = home_quote - away_quote;
    let r = random.random_bit();

    let coefficient = if diff.abs() > LOPSIDED_GAP {
        LOPSIDED_COEFFICIENT
    } else {
        DEFAULT_COEFFICIENT
    };

    if diff.abs() < DRAW_BAND {
        Tip { home: r, away: r }
    } else if diff < 0.0 {
        // Home side favored: the gap scales into home goals.
        Tip {
            home: (-diff * coefficient).round() as u32 + r,
            away: r,
        }
    } else {
        Tip {
            home: r,
            away: (diff * coefficient).round() as u32 + r,
        }
    }
}
