//! Weekly delta uploads.

use clanxp_api::ActivitySink;
use clanxp_database::MemberRepository;
use clanxp_error::ClanXpResult;
use chrono::NaiveDateTime;
use derive_getters::Getters;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Counts from one upload run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct UploadReport {
    /// Deltas accepted by the service
    uploaded: usize,
    /// Members without a positive delta
    skipped: usize,
    /// Uploads that failed and were dropped
    failed: usize,
}

impl std::fmt::Display for UploadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "uploaded {}, skipped {}, failed {}",
            self.uploaded, self.skipped, self.failed
        )
    }
}

/// Pushes each member's current delta to the reporting service.
#[derive(Clone)]
pub struct XpUploader {
    members: Arc<dyn MemberRepository>,
    sink: Arc<dyn ActivitySink>,
}

impl XpUploader {
    /// Create an uploader.
    pub fn new(members: Arc<dyn MemberRepository>, sink: Arc<dyn ActivitySink>) -> Self {
        Self { members, sink }
    }

    /// Upload every positive delta, stamped with `timestamp`.
    ///
    /// A zero or negative delta is never sent. A failed upload is logged and
    /// not retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the member list cannot be loaded.
    #[instrument(skip(self))]
    pub async fn upload_deltas(&self, timestamp: NaiveDateTime) -> ClanXpResult<UploadReport> {
        let mut report = UploadReport::default();

        for member in self.members.list_members().await? {
            let delta = member.raw_delta();
            if delta <= 0 {
                debug!(member = %member.display_name(), delta, "Nothing to upload");
                report.skipped += 1;
                continue;
            }

            match self
                .sink
                .upload_activity(member.external_id(), delta, timestamp)
                .await
            {
                Ok(()) => report.uploaded += 1,
                Err(e) => {
                    warn!(member = %member.display_name(), delta, error = %e, "Upload failed");
                    report.failed += 1;
                }
            }
        }

        info!(%report, "Upload finished");
        Ok(report)
    }
}

impl std::fmt::Debug for XpUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XpUploader").finish_non_exhaustive()
    }
}
