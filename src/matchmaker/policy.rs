//! Selection policy weights and weighted drawing

use crate::error::Result;
use crate::types::MatchPolicy;
use anyhow::anyhow;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Weighted distribution over the five selection policies.
///
/// Weights are relative, not required to sum to 1. A zero weight disables
/// a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyWeights {
    pub exploratory: f64,
    pub exploratory_challenge: f64,
    pub top_match: f64,
    pub random: f64,
    pub challenge: f64,
}

impl Default for PolicyWeights {
    fn default() -> Self {
        Self {
            exploratory: 0.5,
            exploratory_challenge: 0.1,
            top_match: 0.1,
            random: 0.1,
            challenge: 0.1,
        }
    }
}

impl PolicyWeights {
    /// Weights in `MatchPolicy::ALL` order
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.exploratory,
            self.exploratory_challenge,
            self.top_match,
            self.random,
            self.challenge,
        ]
    }

    /// Weights pinned to a single policy, for tests and debugging
    pub fn only(policy: MatchPolicy) -> Self {
        let mut weights = Self {
            exploratory: 0.0,
            exploratory_challenge: 0.0,
            top_match: 0.0,
            random: 0.0,
            challenge: 0.0,
        };
        match policy {
            MatchPolicy::Exploratory => weights.exploratory = 1.0,
            MatchPolicy::ExploratoryChallenge => weights.exploratory_challenge = 1.0,
            MatchPolicy::TopMatch => weights.top_match = 1.0,
            MatchPolicy::Random => weights.random = 1.0,
            MatchPolicy::Challenge => weights.challenge = 1.0,
        }
        weights
    }

    /// Parse a comma-separated list of five weights, in
    /// exploratory, exploratory_challenge, top_match, random, challenge order
    pub fn parse_csv(raw: &str) -> Result<Self> {
        let parts: Vec<f64> = raw
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|_| anyhow!("Invalid policy weight: {}", part))
            })
            .collect::<Result<_>>()?;

        if parts.len() != 5 {
            return Err(anyhow!(
                "Expected 5 policy weights, got {}: {}",
                parts.len(),
                raw
            ));
        }

        let weights = Self {
            exploratory: parts[0],
            exploratory_challenge: parts[1],
            top_match: parts[2],
            random: parts[3],
            challenge: parts[4],
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = self.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(anyhow!("Policy weights must be finite and non-negative"));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(anyhow!("At least one policy weight must be positive"));
        }
        Ok(())
    }

    /// Draw one policy from the weighted distribution
    pub fn choose(&self, rng: &mut impl Rng) -> Result<MatchPolicy> {
        let dist = WeightedIndex::new(self.as_array())
            .map_err(|e| anyhow!("Invalid policy weight distribution: {}", e))?;
        Ok(MatchPolicy::ALL[dist.sample(rng)])
    }
}
