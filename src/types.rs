//! Common types used throughout the arena service

use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for catalog items
pub type ItemId = Uuid;

/// Unique identifier for recorded matches
pub type MatchId = Uuid;

/// A catalogued file from the media source, with its rating and tallies.
///
/// The file name acts as the natural dedup key; the id is the handle the
/// submission endpoint works with. Rating and tallies are only ever mutated
/// by applying the rating engine's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub rating: f64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Create a new item at the baseline rating
    pub fn new(name: impl Into<String>, initial_rating: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rating: initial_rating,
            wins: 0,
            losses: 0,
            draws: 0,
            created_at: current_timestamp(),
        }
    }

    /// Total number of resolved matches this item has taken part in
    pub fn matches_played(&self) -> u64 {
        self.wins + self.losses + self.draws
    }
}

/// Immutable record of a resolved comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub item_a: ItemId,
    pub item_b: ItemId,
    /// None for a draw
    pub winner: Option<ItemId>,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn new(item_a: ItemId, item_b: ItemId, winner: Option<ItemId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_a,
            item_b,
            winner,
            created_at: current_timestamp(),
        }
    }
}

/// Body of a POST /submit_choice request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceSubmission {
    pub winner: ItemId,
    pub loser: ItemId,
    #[serde(default)]
    pub draw: bool,
}

/// Structured Data statements extracted for one item: property key to the
/// list of values declared on the first entity in the API response.
pub type ItemMetadata = BTreeMap<String, Vec<serde_json::Value>>;

/// Matchmaking policy that produced a comparison pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    Exploratory,
    ExploratoryChallenge,
    TopMatch,
    Random,
    Challenge,
}

impl MatchPolicy {
    /// All policies, in weight-table order
    pub const ALL: [MatchPolicy; 5] = [
        MatchPolicy::Exploratory,
        MatchPolicy::ExploratoryChallenge,
        MatchPolicy::TopMatch,
        MatchPolicy::Random,
        MatchPolicy::Challenge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPolicy::Exploratory => "exploratory",
            MatchPolicy::ExploratoryChallenge => "exploratory_challenge",
            MatchPolicy::TopMatch => "top_match",
            MatchPolicy::Random => "random",
            MatchPolicy::Challenge => "challenge",
        }
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One contender in a comparison, ready for presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contender {
    #[serde(flatten)]
    pub item: Item,
    pub statements: ItemMetadata,
}

/// A selected pair with enriched metadata, as served by GET /
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonPair {
    pub policy: MatchPolicy,
    pub contenders: [Contender; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_starts_at_baseline() {
        let item = Item::new("Example.jpg", 1200.0);
        assert_eq!(item.name, "Example.jpg");
        assert_eq!(item.rating, 1200.0);
        assert_eq!(item.matches_played(), 0);
    }

    #[test]
    fn test_policy_serialization_uses_snake_case() {
        let json = serde_json::to_string(&MatchPolicy::ExploratoryChallenge).unwrap();
        assert_eq!(json, "\"exploratory_challenge\"");
        assert_eq!(MatchPolicy::TopMatch.to_string(), "top_match");
    }

    #[test]
    fn test_match_record_draw_has_no_winner() {
        let a = Item::new("A.jpg", 1200.0);
        let b = Item::new("B.jpg", 1200.0);
        let record = MatchRecord::new(a.id, b.id, None);
        assert!(record.winner.is_none());
        assert_ne!(record.item_a, record.item_b);
    }

    #[test]
    fn test_choice_submission_draw_defaults_to_false() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let body = format!("{{\"winner\":\"{a}\",\"loser\":\"{b}\"}}");
        let submission: ChoiceSubmission = serde_json::from_str(&body).unwrap();
        assert!(!submission.draw);
    }
}
