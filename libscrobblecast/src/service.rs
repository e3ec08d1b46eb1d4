//! The monthly run
//!
//! Gates on the first day of the month, fetches the previous month's top
//! album, composes the announcement and publishes it publicly. Every way a
//! run can end is a [`RunOutcome`]; runtime failures are captured as
//! `RunOutcome::Failed` instead of being propagated.

use chrono::{Datelike, NaiveDate};
use tracing::{error, info};

use crate::compose::compose_message;
use crate::error::{Result, ScrobblecastError};
use crate::period::{is_first_of_month, previous_month, ReportMonth};
use crate::platforms::Platform;
use crate::scrobbles::{fetch_top_album, ScrobbleSource};

/// Switches for a single run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Run even when today is not the first of the month
    pub force: bool,
    /// Compose the message but do not publish it
    pub dry_run: bool,
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Not the first of the month; nothing was fetched or posted
    Skipped { day: u32 },
    /// The service had no top album for the period
    NoData { month: ReportMonth },
    Posted {
        month: ReportMonth,
        post_id: String,
        message: String,
    },
    /// Message composed but publishing was disabled
    DryRun { month: ReportMonth, message: String },
    /// Fetching, composing or publishing failed
    Failed { error: ScrobblecastError },
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }

    /// Process exit code for this outcome
    ///
    /// Failures exit 0 unless `strict` is set, in which case the error's own
    /// exit code is used.
    pub fn exit_code(&self, strict: bool) -> i32 {
        match self {
            RunOutcome::Failed { error } if strict => error.exit_code(),
            _ => 0,
        }
    }
}

/// One invocation of the monthly announcement
pub struct MonthlyRun<S, P> {
    source: S,
    platform: P,
    options: RunOptions,
}

impl<S: ScrobbleSource, P: Platform> MonthlyRun<S, P> {
    pub fn new(source: S, platform: P) -> Self {
        Self {
            source,
            platform,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Run the pipeline as of `today`
    pub async fn run(&mut self, today: NaiveDate) -> RunOutcome {
        if !self.options.force && !is_first_of_month(today) {
            info!("Not the first day of the month. Exiting.");
            return RunOutcome::Skipped { day: today.day() };
        }

        let month = previous_month(today);
        match self.execute(month).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("{}", err);
                RunOutcome::Failed { error: err }
            }
        }
    }

    async fn execute(&mut self, month: ReportMonth) -> Result<RunOutcome> {
        self.source.authenticate().await?;

        let Some(album) = fetch_top_album(&self.source, &month).await? else {
            info!("No top album to post.");
            return Ok(RunOutcome::NoData { month });
        };

        let message = compose_message(&album, &month.name);

        if self.options.dry_run {
            info!("Dry run: not posting to {}.", self.platform.name());
            return Ok(RunOutcome::DryRun { month, message });
        }

        self.platform.prepare().await?;
        let post_id = self.platform.post(&message).await?;
        info!(post_id = %post_id, "Message posted to {}.", self.platform.name());

        Ok(RunOutcome::Posted {
            month,
            post_id,
            message,
        })
    }
}
