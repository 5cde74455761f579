//! Pure Elo rating engine
//!
//! Given two items and an outcome, computes updated ratings and tallies
//! with no side effects; the caller persists the returned values. Built on
//! the skillratings crate's Elo implementation.

use crate::config::RatingSettings;
use crate::error::{ArenaError, Result};
use crate::types::Item;
use skillratings::elo::{elo, expected_score, EloConfig, EloRating};
use skillratings::Outcomes;

/// Elo calculator with a fixed K-factor
#[derive(Debug, Clone)]
pub struct EloEngine {
    config: EloConfig,
}

impl EloEngine {
    pub fn new(settings: &RatingSettings) -> Self {
        Self {
            config: EloConfig {
                k: settings.k_factor,
            },
        }
    }

    /// Expected scores for a pairing; the two values always sum to 1.0
    pub fn expected_scores(&self, rating_a: f64, rating_b: f64) -> (f64, f64) {
        expected_score(
            &EloRating { rating: rating_a },
            &EloRating { rating: rating_b },
        )
    }

    /// Apply a resolved match, returning updated copies of both items.
    ///
    /// On a decisive outcome the winner's wins and the loser's losses are
    /// incremented; on a draw both draw counters are. Fails when the two
    /// references share an identity.
    pub fn rate(&self, winner: &Item, loser: &Item, draw: bool) -> Result<(Item, Item)> {
        if winner.id == loser.id {
            return Err(ArenaError::InvalidSubmission {
                reason: format!("winner and loser are the same item: {}", winner.id),
            }
            .into());
        }

        let outcome = if draw { Outcomes::DRAW } else { Outcomes::WIN };
        let (new_winner_rating, new_loser_rating) = elo(
            &EloRating {
                rating: winner.rating,
            },
            &EloRating {
                rating: loser.rating,
            },
            &outcome,
            &self.config,
        );

        let mut winner = winner.clone();
        let mut loser = loser.clone();
        winner.rating = new_winner_rating.rating;
        loser.rating = new_loser_rating.rating;

        if draw {
            winner.draws += 1;
            loser.draws += 1;
        } else {
            winner.wins += 1;
            loser.losses += 1;
        }

        Ok((winner, loser))
    }
}

impl Default for EloEngine {
    fn default() -> Self {
        Self::new(&RatingSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(name: &str, rating: f64) -> Item {
        Item::new(name, rating)
    }

    #[test]
    fn test_even_match_decisive_outcome() {
        // Ra = Rb = 1200, K = 100: expected 0.5, winner gains exactly 50
        let engine = EloEngine::default();
        let a = item("A.jpg", 1200.0);
        let b = item("B.jpg", 1200.0);

        let (expected_a, expected_b) = engine.expected_scores(a.rating, b.rating);
        assert_eq!(expected_a, 0.5);
        assert_eq!(expected_b, 0.5);

        let (winner, loser) = engine.rate(&a, &b, false).unwrap();
        assert!((winner.rating - 1250.0).abs() < 1e-9);
        assert!((loser.rating - 1150.0).abs() < 1e-9);
        assert_eq!(winner.wins, 1);
        assert_eq!(winner.draws, 0);
        assert_eq!(loser.losses, 1);
        assert_eq!(loser.draws, 0);
    }

    #[test]
    fn test_favorite_beats_underdog() {
        // Ra = 1400, Rb = 1000, K = 100: expected_A = 1/(1+10^-1) = 10/11
        let engine = EloEngine::default();
        let a = item("A.jpg", 1400.0);
        let b = item("B.jpg", 1000.0);

        let (expected_a, _) = engine.expected_scores(a.rating, b.rating);
        assert!((expected_a - 10.0 / 11.0).abs() < 1e-9);

        let (winner, loser) = engine.rate(&a, &b, false).unwrap();
        assert!((winner.rating - (1400.0 + 100.0 / 11.0)).abs() < 1e-6);
        assert!((loser.rating - (1000.0 - 100.0 / 11.0)).abs() < 1e-6);

        // A heavy favorite winning moves less than an even match would
        assert!(winner.rating - 1400.0 < 50.0);
    }

    #[test]
    fn test_draw_between_equals_changes_nothing() {
        let engine = EloEngine::default();
        let a = item("A.jpg", 1330.0);
        let b = item("B.jpg", 1330.0);

        let (updated_a, updated_b) = engine.rate(&a, &b, true).unwrap();
        assert_eq!(updated_a.rating, 1330.0);
        assert_eq!(updated_b.rating, 1330.0);
        assert_eq!(updated_a.draws, 1);
        assert_eq!(updated_b.draws, 1);
        assert_eq!(updated_a.wins, 0);
        assert_eq!(updated_b.losses, 0);
    }

    #[test]
    fn test_same_item_rejected() {
        let engine = EloEngine::default();
        let a = item("A.jpg", 1200.0);
        assert!(engine.rate(&a, &a, false).is_err());
    }

    #[test]
    fn test_exactly_one_tally_kind_incremented() {
        let engine = EloEngine::default();
        let a = item("A.jpg", 1250.0);
        let b = item("B.jpg", 1180.0);

        let (winner, loser) = engine.rate(&a, &b, false).unwrap();
        assert_eq!(winner.matches_played(), 1);
        assert_eq!(loser.matches_played(), 1);
        assert_eq!(winner.draws + loser.draws, 0);

        let (drawn_a, drawn_b) = engine.rate(&a, &b, true).unwrap();
        assert_eq!(drawn_a.wins + drawn_b.wins, 0);
        assert_eq!(drawn_a.draws, 1);
        assert_eq!(drawn_b.draws, 1);
    }

    proptest! {
        #[test]
        fn prop_expected_scores_sum_to_one(
            rating_a in 0.0f64..4000.0,
            rating_b in 0.0f64..4000.0,
        ) {
            let engine = EloEngine::default();
            let (expected_a, expected_b) = engine.expected_scores(rating_a, rating_b);
            prop_assert!((expected_a + expected_b - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_decisive_outcome_moves_ratings_toward_winner(
            rating_a in 100.0f64..3000.0,
            rating_b in 100.0f64..3000.0,
        ) {
            let engine = EloEngine::default();
            let a = Item::new("A.jpg", rating_a);
            let b = Item::new("B.jpg", rating_b);
            let (winner, loser) = engine.rate(&a, &b, false).unwrap();
            // Expected score is strictly below 1 for finite ratings
            prop_assert!(winner.rating > rating_a);
            prop_assert!(loser.rating < rating_b);
            prop_assert!(winner.rating.is_finite());
            prop_assert!(loser.rating.is_finite());
        }
    }
}
