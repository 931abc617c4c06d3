//! Session command handlers, including the live `watch` view.

use std::sync::Arc;
use std::time::Duration;

use tabled::Tabled;

use podoscan_core::model::{EntityId, Session};
use podoscan_core::{Clinic, SessionPoint, SessionView, session_series};

use crate::cli::{GlobalOpts, SessionsArgs, SessionsCommand, WatchView};
use crate::error::CliError;
use crate::output;

use super::util::{self, NoticeSink};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Started (UTC)")]
    started: String,
    #[tabled(rename = "Ended (UTC)")]
    ended: String,
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Records")]
    records: usize,
}

impl From<&Session> for SessionRow {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.to_string(),
            started: util::short_time(&s.started_at),
            ended: s
                .ended_at
                .as_ref()
                .map_or_else(|| "-".into(), util::short_time),
            patient: util::or_dash(s.patient.as_ref().map(|p| p.user.fullname.as_str())),
            records: s.records.len(),
        }
    }
}

#[derive(Tabled)]
struct AverageRow {
    #[tabled(rename = "Session")]
    label: String,
    #[tabled(rename = "ID")]
    short_id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "P1")]
    p1: f64,
    #[tabled(rename = "P2")]
    p2: f64,
    #[tabled(rename = "P3")]
    p3: f64,
    #[tabled(rename = "AX")]
    ax: f64,
    #[tabled(rename = "AY")]
    ay: f64,
    #[tabled(rename = "AZ")]
    az: f64,
    #[tabled(rename = "GX")]
    gx: f64,
    #[tabled(rename = "GY")]
    gy: f64,
    #[tabled(rename = "GZ")]
    gz: f64,
}

impl From<&SessionPoint> for AverageRow {
    fn from(point: &SessionPoint) -> Self {
        let a = &point.averages;
        Self {
            label: point.label.clone(),
            short_id: point.short_id.clone(),
            date: point.started_on.to_string(),
            p1: a.p1,
            p2: a.p2,
            p3: a.p3,
            ax: a.ax,
            ay: a.ay,
            az: a.az,
            gx: a.gx,
            gy: a.gy,
            gz: a.gz,
        }
    }
}

fn detail(s: &Arc<Session>) -> String {
    let mut lines = vec![
        format!("ID:      {}", s.id),
        format!("Started: {}", s.started_at.to_rfc3339()),
        format!(
            "Ended:   {}",
            s.ended_at.map_or_else(|| "-".into(), |at| at.to_rfc3339())
        ),
        format!(
            "Patient: {}",
            util::or_dash(s.patient.as_ref().map(|p| p.user.fullname.as_str()))
        ),
        format!(
            "Device:  {}",
            util::or_dash(s.device.as_ref().map(|d| d.serial_number.as_str()))
        ),
        format!("Records: {}", s.records.len()),
    ];
    if let Some(last) = s.records.last() {
        lines.push(format!(
            "Last:    p1={} p2={} p3={} p4={} p5={} at {}",
            last.p1,
            last.p2,
            last.p3,
            last.p4,
            last.p5,
            last.recorded_at.to_rfc3339()
        ));
    }
    lines.join("\n")
}

fn render_sessions(global: &GlobalOpts, sessions: &[Arc<Session>]) -> Result<String, CliError> {
    output::render_list(
        &global.output,
        sessions,
        |s| SessionRow::from(s.as_ref()),
        |s| s.id.to_string(),
    )
}

fn render_averages(global: &GlobalOpts, sessions: &[Arc<Session>]) -> Result<String, CliError> {
    let series = session_series(sessions);
    output::render_list(
        &global.output,
        &series,
        |p: &SessionPoint| AverageRow::from(p),
        |p| p.short_id.clone(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    clinic: &Clinic,
    args: SessionsArgs,
    global: &GlobalOpts,
    notices: &mut NoticeSink,
) -> Result<(), CliError> {
    let store = clinic.sessions();
    match args.command {
        SessionsCommand::List { list, patient } => {
            let view = match patient {
                Some(patient) => {
                    store.fetch_by_patient(&EntityId::from(patient)).await;
                    if let Some(ref term) = list.search {
                        store.apply_search(term);
                    }
                    store.snapshot()
                }
                None => util::fetch_filtered(store, &list).await,
            };
            output::print_output(&render_sessions(global, &view.filtered)?, global.quiet);
            Ok(())
        }

        SessionsCommand::Get { session } => {
            let s = store.find_one(&EntityId::from(session)).await?;
            let out = output::render_single(&global.output, &s, detail, |s| s.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SessionsCommand::Averages { patient } => {
            store.fetch_by_patient(&EntityId::from(patient)).await;
            let view = store.snapshot();
            output::print_output(&render_averages(global, &view.data)?, global.quiet);
            Ok(())
        }

        SessionsCommand::Watch {
            patient,
            interval_ms,
            view,
            count,
        } => {
            watch(
                clinic,
                global,
                notices,
                EntityId::from(patient),
                interval_ms.map(Duration::from_millis),
                view,
                count,
            )
            .await
        }
    }
}

/// Mount a poller on the patient and print every settled snapshot until
/// interrupted (or `count` updates were shown).
async fn watch(
    clinic: &Clinic,
    global: &GlobalOpts,
    notices: &mut NoticeSink,
    patient: EntityId,
    period: Option<Duration>,
    view: WatchView,
    count: Option<usize>,
) -> Result<(), CliError> {
    let view = match view {
        WatchView::Charts => SessionView::Charts,
        WatchView::Table => SessionView::Table,
    };
    // The table view is never refreshed, so one update is all it will show.
    let limit = match view {
        SessionView::Charts => count,
        SessionView::Table => Some(1),
    };

    let mut updates = clinic.sessions().subscribe();
    let poller = clinic.session_poller(period);
    poller.set_view(view);
    poller.mount(Some(patient.clone()));
    util::status(
        global,
        &format!(
            "Watching sessions of patient {patient} ({view} view, every {}ms). Ctrl-C to stop.",
            poller.period().as_millis()
        ),
    );

    let mut shown = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            snapshot = updates.changed() => {
                let Some(snapshot) = snapshot else { break };
                notices.print_pending();
                if snapshot.is_loading {
                    continue;
                }
                let out = match view {
                    SessionView::Charts => render_averages(global, &snapshot.data)?,
                    SessionView::Table => render_sessions(global, &snapshot.data)?,
                };
                output::print_output(&out, global.quiet);
                shown += 1;
                if limit.is_some_and(|limit| shown >= limit) {
                    break;
                }
            }
        }
    }

    poller.unmount();
    Ok(())
}
