//! The fixed score → label table.

use serde::{Deserialize, Serialize};

/// Ordinal delulu score, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: Score = Score(1);
    pub const MAX: Score = Score(5);

    /// Exact constructor; `None` outside 1..=5.
    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Score(value))
    }

    /// Clamp any integer into the score domain.
    pub fn clamped(value: i64) -> Self {
        Score(value.clamp(1, 5) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Score::MIN
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> u8 {
        score.0
    }
}

impl TryFrom<u8> for Score {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Score::new(value).ok_or_else(|| format!("score {} outside 1..=5", value))
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Five labels indexed by score.
#[derive(Debug)]
pub struct ScoreLabels {
    labels: [&'static str; 5],
}

impl ScoreLabels {
    pub const fn new(labels: [&'static str; 5]) -> Self {
        Self { labels }
    }

    pub fn label(&self, score: Score) -> &'static str {
        self.labels[(score.get() - 1) as usize]
    }

    /// Whether `text` is exactly one of the table entries.
    pub fn contains(&self, text: &str) -> bool {
        self.labels.iter().any(|l| *l == text.trim())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Score, &'static str)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, l)| (Score(i as u8 + 1), *l))
    }
}

/// The delulu scale shown to users.
pub static DELULU_LABELS: ScoreLabels = ScoreLabels::new([
    "Pookie + 1 – You're on your way to having a Pookie",
    "Situationship Final Boss – You talk most days but then they leave you on delivered for 6 hours",
    "Brainrot Baddie – You've already stalked their Spotify, Venmo, and their Mom's Facebook from 2009",
    "Wannabe Wifey – You've told your besties that you're getting married",
    "Certified Delulu – You're the mayor of Deluluville",
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_clamping() {
        assert_eq!(Score::clamped(-4).get(), 1);
        assert_eq!(Score::clamped(0).get(), 1);
        assert_eq!(Score::clamped(3).get(), 3);
        assert_eq!(Score::clamped(42).get(), 5);
    }

    #[test]
    fn test_score_new_is_exact() {
        assert!(Score::new(0).is_none());
        assert!(Score::new(6).is_none());
        assert_eq!(Score::new(5), Some(Score::MAX));
    }

    #[test]
    fn test_every_score_has_a_distinct_label() {
        let labels: Vec<&str> = DELULU_LABELS.iter().map(|(_, l)| l).collect();
        assert_eq!(labels.len(), 5);
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(DELULU_LABELS.label(Score::clamped(3)).starts_with("Brainrot Baddie"));
    }

    #[test]
    fn test_contains() {
        assert!(DELULU_LABELS.contains(DELULU_LABELS.label(Score::MAX)));
        assert!(!DELULU_LABELS.contains("Totally Grounded"));
    }

    #[test]
    fn test_score_serde_rejects_out_of_range() {
        assert_eq!(serde_json::to_string(&Score::clamped(2)).unwrap(), "2");
        assert!(serde_json::from_str::<Score>("9").is_err());
    }
}
