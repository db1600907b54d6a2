//! Cron triggers for the `serve` loop.

use chrono::{DateTime, TimeZone};
use clanxp_error::ConfigError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A job the scheduler can run.
///
/// Variant order is the run order for jobs due at the same instant, so
/// uploads see the deltas of the window a rollover is about to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Job {
    /// Reconcile the roster into the store
    RosterSync,
    /// Upload positive weekly deltas
    Upload,
    /// Reconciliation cycle that closes the tracking window
    Rollover,
    /// Regular reconciliation cycle
    Cycle,
    /// Render and publish leaderboards
    Leaderboard,
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Job::RosterSync => "roster_sync",
            Job::Upload => "upload",
            Job::Rollover => "rollover",
            Job::Cycle => "cycle",
            Job::Leaderboard => "leaderboard",
        };
        f.write_str(name)
    }
}

/// Cron expressions (7 fields: sec min hour day month weekday year),
/// evaluated in local time. An empty expression disables the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ScheduleConfig {
    /// Roster sync trigger
    #[serde(default = "default_roster_sync")]
    roster_sync: String,
    /// Regular cycle trigger
    #[serde(default = "default_cycle")]
    cycle: String,
    /// Weekly rollover trigger
    #[serde(default = "default_rollover")]
    rollover: String,
    /// Delta upload trigger
    #[serde(default = "default_upload")]
    upload: String,
    /// Leaderboard refresh trigger
    #[serde(default = "default_leaderboard")]
    leaderboard: String,
}

fn default_roster_sync() -> String {
    "0 0 * * * * *".to_string()
}

fn default_cycle() -> String {
    "0 */10 * * * * *".to_string()
}

fn default_rollover() -> String {
    "0 0 10 * * Thu *".to_string()
}

fn default_upload() -> String {
    "0 55 9 * * Thu *".to_string()
}

fn default_leaderboard() -> String {
    "0 * * * * * *".to_string()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            roster_sync: default_roster_sync(),
            cycle: default_cycle(),
            rollover: default_rollover(),
            upload: default_upload(),
            leaderboard: default_leaderboard(),
        }
    }
}

impl ScheduleConfig {
    fn expressions(&self) -> [(Job, &str); 5] {
        [
            (Job::RosterSync, self.roster_sync.as_str()),
            (Job::Upload, self.upload.as_str()),
            (Job::Rollover, self.rollover.as_str()),
            (Job::Cycle, self.cycle.as_str()),
            (Job::Leaderboard, self.leaderboard.as_str()),
        ]
    }

    /// Check that every expression parses.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid expression.
    pub fn validate(&self) -> Result<(), ConfigError> {
        JobSchedule::try_from(self).map(|_| ())
    }
}

/// Parsed job triggers.
#[derive(Debug, Clone)]
pub struct JobSchedule {
    entries: Vec<(Job, cron::Schedule)>,
}

impl TryFrom<&ScheduleConfig> for JobSchedule {
    type Error = ConfigError;

    fn try_from(config: &ScheduleConfig) -> Result<Self, Self::Error> {
        let mut entries = Vec::new();
        for (job, expression) in config.expressions() {
            if expression.trim().is_empty() {
                continue;
            }
            let schedule = cron::Schedule::from_str(expression).map_err(|e| {
                ConfigError::new(format!(
                    "schedule.{} '{}' is not a valid cron expression: {}",
                    job, expression, e
                ))
            })?;
            entries.push((job, schedule));
        }
        Ok(Self { entries })
    }
}

impl JobSchedule {
    /// Jobs that are scheduled at all.
    pub fn jobs(&self) -> impl Iterator<Item = Job> + '_ {
        self.entries.iter().map(|(job, _)| *job)
    }

    /// The earliest instant strictly after `after` at which any job fires,
    /// with every job due at that instant in run order.
    pub fn next_due<Tz: TimeZone>(
        &self,
        after: &DateTime<Tz>,
    ) -> Option<(DateTime<Tz>, Vec<Job>)> {
        let mut due: Option<(DateTime<Tz>, Vec<Job>)> = None;

        for (job, schedule) in &self.entries {
            let Some(at) = schedule.after(after).next() else {
                continue;
            };
            let is_earlier = due.as_ref().is_none_or(|(earliest, _)| at < *earliest);
            if is_earlier {
                due = Some((at, vec![*job]));
            } else if let Some((earliest, jobs)) = &mut due {
                if at == *earliest {
                    jobs.push(*job);
                }
            }
        }

        if let Some((_, jobs)) = &mut due {
            jobs.sort();
        }
        due
    }
}
