//! Shared helpers for command handlers.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::{self, error::TryRecvError};

use podoscan_core::{Clinic, EntityStore, Notice, NoticeLevel, StoreView, model::Entity};

use crate::cli::{GlobalOpts, ListArgs};
use crate::error::CliError;
use crate::output;

/// Prints store notices as they arrive and turns swallowed read failures
/// into a failing exit status.
pub struct NoticeSink {
    rx: broadcast::Receiver<Notice>,
    color: bool,
    quiet: bool,
}

impl NoticeSink {
    pub fn new(clinic: &Clinic, global: &GlobalOpts) -> Self {
        Self {
            rx: clinic.notices(),
            color: output::should_color(&global.color),
            quiet: global.quiet,
        }
    }

    /// Print everything queued so far. Returns the last error message, if any.
    pub fn print_pending(&mut self) -> Option<String> {
        let mut failure = None;
        loop {
            match self.rx.try_recv() {
                Ok(notice) => {
                    output::print_notice(&notice, self.color, self.quiet);
                    if notice.level == NoticeLevel::Error {
                        failure = Some(notice.message);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notice stream lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        failure
    }

    /// Print everything queued so far; a reported failure fails the command.
    pub fn flush(&mut self) -> Result<(), CliError> {
        match self.print_pending() {
            Some(message) => Err(CliError::ApiError {
                code: "request_failed".into(),
                message,
            }),
            None => Ok(()),
        }
    }
}

/// Refresh a whole collection and return its search-filtered view.
pub async fn fetch_filtered<T, R>(
    store: &EntityStore<T, R>,
    list: &ListArgs,
) -> std::sync::Arc<StoreView<T>>
where
    T: Entity,
    R: podoscan_core::store::RemoteCollection<T>,
{
    store.fetch_all().await;
    if let Some(ref term) = list.search {
        store.apply_search(term);
    }
    store.snapshot()
}

/// Parse an RFC 3339 timestamp argument.
pub fn parse_datetime(field: &str, raw: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| CliError::Validation {
            field: field.into(),
            reason: format!("expected RFC 3339 (e.g. 2024-06-15T09:30:00Z): {e}"),
        })
}

/// `value` or `-` for table cells and detail views.
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}

/// Minute-precision UTC timestamp for tables.
pub fn short_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Status line on stderr, honouring `--quiet`.
pub fn status(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}
