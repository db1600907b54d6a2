//! Leaderboard settings.

use crate::WeeklyAnchor;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How many ranked entries a board shows.
///
/// Written as a number or the keyword `all` in configuration and on the
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLimit", into = "RawLimit")]
pub enum LeaderboardLimit {
    /// The first `n` entries
    Top(usize),
    /// Every eligible member
    All,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Count(usize),
    Keyword(String),
}

impl TryFrom<RawLimit> for LeaderboardLimit {
    type Error = String;

    fn try_from(raw: RawLimit) -> Result<Self, Self::Error> {
        match raw {
            RawLimit::Count(n) => Ok(LeaderboardLimit::Top(n)),
            RawLimit::Keyword(word) => word.parse(),
        }
    }
}

impl From<LeaderboardLimit> for RawLimit {
    fn from(limit: LeaderboardLimit) -> Self {
        match limit {
            LeaderboardLimit::Top(n) => RawLimit::Count(n),
            LeaderboardLimit::All => RawLimit::Keyword("all".to_string()),
        }
    }
}

impl FromStr for LeaderboardLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(LeaderboardLimit::All);
        }
        s.parse()
            .map(LeaderboardLimit::Top)
            .map_err(|_| format!("expected a number or \"all\", got \"{}\"", s))
    }
}

impl std::fmt::Display for LeaderboardLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaderboardLimit::Top(n) => write!(f, "{}", n),
            LeaderboardLimit::All => f.write_str("all"),
        }
    }
}

/// A board shown in the messaging client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
pub struct BoardConfig {
    /// Tag resolving the display messages, e.g. `member_clan_xp`
    tag: String,
    /// Entries shown
    limit: LeaderboardLimit,
}

/// Rendering settings shared by all boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct LeaderboardConfig {
    /// Board title
    #[serde(default = "default_title")]
    title: String,
    /// Start of each tracking window
    #[serde(default)]
    anchor: WeeklyAnchor,
    /// Digit group separator
    #[serde(default = "default_thousands_separator")]
    thousands_separator: char,
    /// Boards to publish
    #[serde(default = "default_boards")]
    boards: Vec<BoardConfig>,
}

fn default_title() -> String {
    "Wöchentliche Clan XP".to_string()
}

fn default_thousands_separator() -> char {
    '.'
}

fn default_boards() -> Vec<BoardConfig> {
    vec![
        BoardConfig::new("member_clan_xp".to_string(), LeaderboardLimit::Top(10)),
        BoardConfig::new("admin_clan_xp".to_string(), LeaderboardLimit::All),
    ]
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            anchor: WeeklyAnchor::default(),
            thousands_separator: default_thousands_separator(),
            boards: default_boards(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_parses_number_or_all() {
        assert_eq!("25".parse::<LeaderboardLimit>(), Ok(LeaderboardLimit::Top(25)));
        assert_eq!("ALL".parse::<LeaderboardLimit>(), Ok(LeaderboardLimit::All));
        assert!("most".parse::<LeaderboardLimit>().is_err());
    }

    #[test]
    fn boards_deserialize_from_toml() {
        let config: LeaderboardConfig = toml::from_str(
            r#"
            anchor = { weekday = "Thu", hour = 10 }

            [[boards]]
            tag = "member_clan_xp"
            limit = 10

            [[boards]]
            tag = "admin_clan_xp"
            limit = "all"
            "#,
        )
        .unwrap();

        assert_eq!(config.title(), "Wöchentliche Clan XP");
        assert_eq!(*config.thousands_separator(), '.');
        assert_eq!(*config.boards()[0].limit(), LeaderboardLimit::Top(10));
        assert_eq!(*config.boards()[1].limit(), LeaderboardLimit::All);
    }

    #[test]
    fn limit_serializes_back() {
        let json = serde_json::to_string(&LeaderboardLimit::All).unwrap();
        assert_eq!(json, r#""all""#);
        let json = serde_json::to_string(&LeaderboardLimit::Top(3)).unwrap();
        assert_eq!(json, "3");
    }
}
