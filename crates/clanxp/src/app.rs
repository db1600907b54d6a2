//! Wiring of stores, clients and jobs.

use crate::{ClanXpConfig, Job, JobSchedule};
use chrono::Local;
use clanxp_api::{
    ActivityClient, ActivitySink, HttpFetcher, MembershipClient, MembershipValidator,
    RosterClient, RosterSource, XpClient, XpReader,
};
use clanxp_database::{
    DisplayMessage, DisplayMessageRepository, MemberRepository, PgDisplayMessageRepository,
    PgMemberRepository, create_pool,
};
use clanxp_error::{ClanXpResult, ConfigError};
use clanxp_leaderboard::{BoardConfig, LeaderboardLimit, LeaderboardRenderer};
use clanxp_rate_limit::RateLimiter;
use clanxp_tracker::{
    CycleReport, LeaderboardPublisher, LeaderboardService, LogNotifier, LogPublisher, Orchestrator,
    PublishReport, RosterSyncer, SyncReport, UploadReport, XpUploader,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// External collaborators of the tracker.
///
/// [`Services::connect`] builds the HTTP clients from configuration; tests
/// substitute fakes.
#[derive(Clone)]
pub struct Services {
    /// Roster feed
    pub roster: Arc<dyn RosterSource>,
    /// Membership checks
    pub membership: Arc<dyn MembershipValidator>,
    /// XP readings
    pub xp: Arc<dyn XpReader>,
    /// Delta uploads
    pub activity: Arc<dyn ActivitySink>,
    /// Leaderboard delivery
    pub publisher: Arc<dyn LeaderboardPublisher>,
}

impl Services {
    /// HTTP clients for the configured services.
    ///
    /// All clients share one rate limiter. Boards are written to the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate limit is invalid.
    pub fn connect(config: &ClanXpConfig) -> Result<Self, ConfigError> {
        let limiter = RateLimiter::new(*config.rate_limit())
            .map_err(|e| ConfigError::new(format!("Invalid rate_limit: {}", e)))?;
        let limiter = Arc::new(limiter);

        let clan = HttpFetcher::new(limiter.clone());
        let tracker = HttpFetcher::new(limiter).with_lookup_failure_statuses(
            config.tracker_service().lookup_failure_statuses().clone(),
        );
        let clan_config = config.clan_service().clone();

        Ok(Self {
            roster: Arc::new(RosterClient::new(clan.clone(), clan_config.clone())),
            membership: Arc::new(MembershipClient::new(clan.clone(), clan_config.clone())),
            xp: Arc::new(XpClient::new(tracker, config.tracker_service().clone())),
            activity: Arc::new(ActivityClient::new(clan, clan_config)),
            publisher: Arc::new(LogPublisher),
        })
    }
}

/// The assembled tracker.
#[derive(Clone)]
pub struct ClanXp {
    config: ClanXpConfig,
    displays: Arc<dyn DisplayMessageRepository>,
    syncer: RosterSyncer,
    orchestrator: Orchestrator,
    uploader: XpUploader,
    leaderboards: LeaderboardService,
}

impl ClanXp {
    /// Connect to PostgreSQL and the configured services.
    ///
    /// # Errors
    ///
    /// Returns an error if the database URL is missing, the pool cannot be
    /// created, or the rate limit is invalid.
    #[instrument(skip(config))]
    pub fn connect(config: ClanXpConfig) -> ClanXpResult<Self> {
        let url = config.database().resolve_url()?;
        let pool = create_pool(&url, *config.database().pool_size())?;
        let services = Services::connect(&config)?;

        Ok(Self::assemble(
            config,
            Arc::new(PgMemberRepository::new(pool.clone())),
            Arc::new(PgDisplayMessageRepository::new(pool)),
            services,
        ))
    }

    /// Assemble from explicit stores and services.
    pub fn assemble(
        config: ClanXpConfig,
        members: Arc<dyn MemberRepository>,
        displays: Arc<dyn DisplayMessageRepository>,
        services: Services,
    ) -> Self {
        let mut orchestrator =
            Orchestrator::new(members.clone(), services.membership, services.xp);
        if *config.notifications().identity_change_warnings() {
            orchestrator = orchestrator.with_notifier(Arc::new(LogNotifier));
        }

        Self {
            syncer: RosterSyncer::new(services.roster, members.clone()),
            uploader: XpUploader::new(members.clone(), services.activity),
            leaderboards: LeaderboardService::new(
                members,
                displays.clone(),
                services.publisher,
                LeaderboardRenderer::from(config.leaderboard()),
            ),
            orchestrator,
            displays,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ClanXpConfig {
        &self.config
    }

    /// Reconcile the roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be fetched.
    pub async fn sync_roster(&self) -> ClanXpResult<SyncReport> {
        self.syncer.sync_roster().await
    }

    /// Run one reconciliation cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the members cannot be listed.
    pub async fn run_cycle(&self, is_rollover: bool) -> ClanXpResult<CycleReport> {
        self.orchestrator.run_cycle(is_rollover).await
    }

    /// Upload positive deltas stamped with the local time.
    ///
    /// # Errors
    ///
    /// Returns an error if the members cannot be listed.
    pub async fn upload_deltas(&self) -> ClanXpResult<UploadReport> {
        self.uploader
            .upload_deltas(Local::now().naive_local())
            .await
    }

    /// Publish the configured boards, optionally forcing one limit on all.
    ///
    /// # Errors
    ///
    /// Returns an error if members or display messages cannot be loaded.
    pub async fn publish_leaderboards(
        &self,
        limit: Option<LeaderboardLimit>,
    ) -> ClanXpResult<PublishReport> {
        let boards: Vec<BoardConfig> = self
            .config
            .leaderboard()
            .boards()
            .iter()
            .map(|board| match limit {
                Some(limit) => BoardConfig::new(board.tag().clone(), limit),
                None => board.clone(),
            })
            .collect();

        self.leaderboards
            .publish_leaderboards(&boards, Local::now().naive_local())
            .await
    }

    /// Register a channel that should show the board `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel already shows this board.
    pub async fn register_board(
        &self,
        tag: &str,
        channel_id: i64,
    ) -> ClanXpResult<DisplayMessage> {
        Ok(self.displays.register(tag, channel_id).await?)
    }

    /// Run one scheduled job.
    ///
    /// # Errors
    ///
    /// Returns the job's error.
    #[instrument(skip(self))]
    pub async fn run_job(&self, job: Job) -> ClanXpResult<()> {
        match job {
            Job::RosterSync => self.sync_roster().await.map(|_| ()),
            Job::Upload => self.upload_deltas().await.map(|_| ()),
            Job::Rollover => self.run_cycle(true).await.map(|_| ()),
            Job::Cycle => self.run_cycle(false).await.map(|_| ()),
            Job::Leaderboard => self.publish_leaderboards(None).await.map(|_| ()),
        }
    }

    /// Run scheduled jobs one at a time until `shutdown` completes.
    ///
    /// Jobs due at the same instant run in [`Job`] order. Triggers missed
    /// while a job was running are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule is invalid. Job failures are logged.
    pub async fn serve<F>(&self, shutdown: F) -> ClanXpResult<()>
    where
        F: Future<Output = ()>,
    {
        let schedule = JobSchedule::try_from(self.config.schedule())?;
        info!(jobs = ?schedule.jobs().collect::<Vec<_>>(), "Scheduler started");
        tokio::pin!(shutdown);

        let mut cursor = Local::now();
        loop {
            let Some((at, jobs)) = schedule.next_due(&cursor) else {
                warn!("No jobs scheduled, stopping");
                return Ok(());
            };

            let wait = (at - Local::now()).to_std().unwrap_or_default();
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    return Ok(());
                }
                _ = tokio::time::sleep(wait) => {}
            }

            for job in jobs {
                if let Err(e) = self.run_job(job).await {
                    error!(%job, error = %e, "Job failed");
                }
            }
            cursor = at.max(Local::now());
        }
    }
}

impl std::fmt::Debug for ClanXp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClanXp")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
