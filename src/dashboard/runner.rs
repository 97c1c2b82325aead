use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{
    cursor,
    event::{self, Event, KeyEvent},
    execute, terminal,
};
use std::io::stdout;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::client::ApiClient;
use super::input::{handle_key, KeyAction};
use super::render::render;
use super::state::DashboardState;
use crate::types::{IngestResponse, LogsResponse};

/// Interval between automatic refreshes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Interval of the clock that expires notices and ages timestamps.
const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum DashEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Fetched {
        seq: u64,
        result: Result<LogsResponse>,
    },
    Submitted(Result<IngestResponse>),
}

/// Raw mode and the alternate screen, restored on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(stdout(), cursor::Show, terminal::LeaveAlternateScreen);
    }
}

/// Starts a fetch tagged with a fresh sequence number. Fetches are never
/// cancelled; overlapping results are ordered by `DashboardState`.
fn spawn_fetch(client: &ApiClient, state: &mut DashboardState, tx: &mpsc::UnboundedSender<DashEvent>) {
    let seq = state.begin_fetch();
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.fetch_logs().await;
        let _ = tx.send(DashEvent::Fetched { seq, result });
    });
}

fn spawn_submit(client: &ApiClient, state: &mut DashboardState, tx: &mpsc::UnboundedSender<DashEvent>) {
    let request = match state.validate_form() {
        Ok(request) => request,
        Err(msg) => {
            state.submit_failed(msg, Instant::now());
            return;
        }
    };

    state.form.submitting = true;
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.submit(&request).await;
        let _ = tx.send(DashEvent::Submitted(result));
    });
}

/// Forwards terminal input to the event loop until the loop goes away.
fn spawn_input_reader(tx: mpsc::UnboundedSender<DashEvent>) {
    tokio::task::spawn_blocking(move || loop {
        if event::poll(Duration::from_millis(100)).unwrap_or(false) {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) => tx.send(DashEvent::Key(key)),
                Ok(Event::Resize(w, h)) => tx.send(DashEvent::Resize(w, h)),
                _ => Ok(()),
            };
            if forwarded.is_err() {
                break;
            }
        } else if tx.is_closed() {
            break;
        }
    });
}

/// Follow-up work the event loop starts after an event has been applied.
#[derive(Debug, PartialEq, Eq)]
enum Effect {
    Idle,
    Fetch,
    Submit,
    RestartPoll,
    Quit,
}

/// Decides whether a poll tick starts a fetch.
fn on_poll_tick(state: &DashboardState) -> Effect {
    if state.auto_refresh && !state.closing {
        Effect::Fetch
    } else {
        Effect::Idle
    }
}

/// Applies one event to the state and names the work it calls for.
fn on_event(
    state: &mut DashboardState,
    event: DashEvent,
    now: Instant,
    wall: DateTime<Utc>,
) -> Effect {
    match event {
        DashEvent::Key(key) => match handle_key(state, key) {
            KeyAction::Quit => {
                state.close();
                Effect::Quit
            }
            KeyAction::Refresh => Effect::Fetch,
            KeyAction::AutoRefreshEnabled => Effect::RestartPoll,
            KeyAction::Submit => Effect::Submit,
            KeyAction::None => Effect::Idle,
        },
        DashEvent::Resize(..) => Effect::Idle,
        DashEvent::Fetched { seq, result } => {
            match result {
                Ok(response) => {
                    let count = response.count;
                    if state.apply_fetch(seq, response.logs, wall) {
                        debug!("Applied fetch #{} ({} entries)", seq, count);
                    }
                }
                Err(e) => state.fetch_failed(seq, e.to_string()),
            }
            Effect::Idle
        }
        DashEvent::Submitted(Ok(receipt)) => {
            info!("Submitted log entry {}", receipt.id);
            state.submit_succeeded(receipt.id, now);
            if state.closing {
                Effect::Idle
            } else {
                Effect::Fetch
            }
        }
        DashEvent::Submitted(Err(e)) => {
            error!("Submit log error: {}", e);
            state.submit_failed(e.to_string(), now);
            Effect::Idle
        }
    }
}

/// Runs the terminal dashboard until the user quits.
pub async fn run_dashboard(client: ApiClient) -> Result<()> {
    info!("Starting terminal dashboard");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<DashEvent>();
    let _guard = TerminalGuard::enter()?;
    let mut size = terminal::size()?;
    let mut state = DashboardState::new();
    let mut out = stdout();

    spawn_input_reader(event_tx.clone());
    spawn_fetch(&client, &mut state, &event_tx);

    let mut poll = tokio::time::interval_at(tokio::time::Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
    let mut clock = tokio::time::interval(CLOCK_INTERVAL);

    render(&mut out, &state, size, Utc::now())?;

    loop {
        let effect = tokio::select! {
            _ = poll.tick() => on_poll_tick(&state),
            _ = clock.tick() => {
                state.expire_notice(Instant::now());
                Effect::Idle
            }
            Some(event) = event_rx.recv() => {
                if let DashEvent::Resize(w, h) = event {
                    size = (w, h);
                }
                on_event(&mut state, event, Instant::now(), Utc::now())
            }
        };

        match effect {
            Effect::Quit => break,
            Effect::Fetch => spawn_fetch(&client, &mut state, &event_tx),
            Effect::Submit => spawn_submit(&client, &mut state, &event_tx),
            Effect::RestartPoll => poll.reset(),
            Effect::Idle => {}
        }

        render(&mut out, &state, size, Utc::now())?;
    }

    info!("Terminal dashboard stopped");
    Ok(())
}
