//! Ranked, paginated leaderboard rendering.

use crate::{
    LeaderboardLimit, TrackingWindow, WeeklyAnchor, escape_markdown, format_thousands,
    tracking_window,
};
use chrono::NaiveDateTime;
use clanxp_core::Member;
use derive_getters::Getters;
use tracing::debug;

/// Entries per display block.
pub const PAGE_SIZE: usize = 10;

/// Timestamp layout of the footer.
pub const FOOTER_FORMAT: &str = "%d.%m.%y %H:%M";

/// One ranked member.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct LeaderboardEntry {
    /// One-based rank
    rank: usize,
    /// Messaging identity to mention
    messaging_id: i64,
    /// Display name with markup escaped
    name: String,
    /// Weekly gain with digit grouping, never negative
    xp: String,
}

impl std::fmt::Display for LeaderboardEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "**{}.** <@{}> ({})\n{}\n",
            self.rank, self.messaging_id, self.name, self.xp
        )
    }
}

/// One page of up to [`PAGE_SIZE`] entries.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct LeaderboardBlock {
    /// `Top N` or `Total` on the first block, `None` on continuations
    heading: Option<String>,
    /// Entries on this page
    entries: Vec<LeaderboardEntry>,
}

impl LeaderboardBlock {
    /// Entries joined into one text body.
    pub fn body(&self) -> String {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

/// A rendered board ready for publishing.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Leaderboard {
    /// Board title
    title: String,
    /// Tracking window the gains belong to
    window: TrackingWindow,
    /// Pages in rank order
    blocks: Vec<LeaderboardBlock>,
    /// `Last Update: ...` line
    footer: String,
}

impl Leaderboard {
    /// Window label shown under the title.
    pub fn description(&self) -> String {
        self.window.label()
    }

    /// Total entries over all blocks.
    pub fn entry_count(&self) -> usize {
        self.blocks.iter().map(|b| b.entries.len()).sum()
    }
}

impl std::fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.description())?;
        for block in &self.blocks {
            if let Some(heading) = &block.heading {
                writeln!(f)?;
                writeln!(f, "{}", heading)?;
            }
            write!(f, "{}", block.body())?;
        }
        writeln!(f)?;
        write!(f, "{}", self.footer)
    }
}

/// Turns stored members into a [`Leaderboard`].
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_new::new)]
pub struct LeaderboardRenderer {
    /// Board title
    title: String,
    /// Start of each tracking window
    anchor: WeeklyAnchor,
    /// Digit group separator
    thousands_separator: char,
}

impl LeaderboardRenderer {
    /// Rank members by raw XP delta and split them into pages.
    ///
    /// Only members with a messaging identity are ranked. A negative delta
    /// ranks by its raw value and shows as zero. Ties keep the
    /// order of `members`. `Top(n)` yields `ceil(n / 10)` pages and `All`
    /// yields `ceil(count / 10)`; the first page is always emitted, later
    /// pages only when they hold entries.
    pub fn render(
        &self,
        members: &[Member],
        limit: LeaderboardLimit,
        now: NaiveDateTime,
    ) -> Leaderboard {
        let mut ranked: Vec<(&Member, i64, i64)> = members
            .iter()
            .filter_map(|m| m.messaging_id().map(|id| (m, id, m.raw_delta())))
            .collect();
        ranked.sort_by(|a, b| b.2.cmp(&a.2));

        let (pages, heading) = match limit {
            LeaderboardLimit::Top(n) => {
                ranked.truncate(n);
                (n.div_ceil(PAGE_SIZE), format!("Top {}", n))
            }
            LeaderboardLimit::All => (ranked.len().div_ceil(PAGE_SIZE), "Total".to_string()),
        };

        let entries: Vec<LeaderboardEntry> = ranked
            .into_iter()
            .enumerate()
            .map(|(i, (member, messaging_id, delta))| LeaderboardEntry {
                rank: i + 1,
                messaging_id,
                name: escape_markdown(member.display_name()),
                xp: format_thousands(delta.max(0), self.thousands_separator),
            })
            .collect();

        let mut chunks = entries.chunks(PAGE_SIZE);
        let mut blocks = Vec::with_capacity(pages);
        for page in 0..pages {
            let chunk = chunks.next().unwrap_or_default();
            if page > 0 && chunk.is_empty() {
                break;
            }
            blocks.push(LeaderboardBlock {
                heading: (page == 0).then(|| heading.clone()),
                entries: chunk.to_vec(),
            });
        }

        debug!(
            limit = %limit,
            entries = entries.len(),
            blocks = blocks.len(),
            "Rendered leaderboard"
        );

        Leaderboard {
            title: self.title.clone(),
            window: tracking_window(now, self.anchor),
            blocks,
            footer: format!("Last Update: {}", now.format(FOOTER_FORMAT)),
        }
    }
}
