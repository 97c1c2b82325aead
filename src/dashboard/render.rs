use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{
    cursor, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::Write;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::state::{time_ago, DashboardState, NoticeKind, Phase};
use crate::types::Severity;

/// Rows reserved at the bottom for the notice, the form and the status bar.
const FOOTER_ROWS: u16 = 3;

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Blue,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

/// Replaces control characters with spaces. Messages come from any HTTP
/// client and must not move the cursor or restyle the terminal.
pub fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Cuts `text` to at most `width` terminal columns, control characters
/// blanked.
fn fit(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let c = if c.is_control() { ' ' } else { c };
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

pub fn render(
    out: &mut impl Write,
    state: &DashboardState,
    (width, height): (u16, u16),
    now: DateTime<Utc>,
) -> Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;

    let body_rows = height.saturating_sub(FOOTER_ROWS);
    match state.phase {
        Phase::Loading => render_loading(out, state, width, body_rows)?,
        Phase::Ready => render_ready(out, state, width, body_rows, now)?,
    }

    render_footer(out, state, width, body_rows)?;
    out.flush()?;
    Ok(())
}

fn render_loading(out: &mut impl Write, state: &DashboardState, width: u16, rows: u16) -> Result<()> {
    let text = "Loading dashboard...";
    let col = (width as usize).saturating_sub(text.len()) / 2;
    let row = rows / 2;
    queue!(out, cursor::MoveTo(col as u16, row), Print(text))?;

    if let Some(err) = &state.last_error {
        queue!(
            out,
            cursor::MoveTo(0, row + 1),
            SetForegroundColor(Color::Red),
            Print(fit(err, width as usize)),
            ResetColor
        )?;
    }
    Ok(())
}

fn render_ready(
    out: &mut impl Write,
    state: &DashboardState,
    width: u16,
    rows: u16,
    now: DateTime<Utc>,
) -> Result<()> {
    let w = width as usize;
    let mut row: u16 = 0;

    let updated = state
        .last_update
        .map(|t| format!("Updated {}", time_ago(t, now)))
        .unwrap_or_default();
    let auto = if state.auto_refresh {
        "auto-refresh ON"
    } else {
        "auto-refresh OFF"
    };
    queue!(
        out,
        cursor::MoveTo(0, row),
        SetAttribute(Attribute::Bold),
        Print(fit(&format!("Log Dashboard  |  {}  |  {}", updated, auto), w)),
        SetAttribute(Attribute::Reset)
    )?;
    row += 2;

    let stats = state.stats;
    queue!(out, cursor::MoveTo(0, row), Print(format!("Total {}   ", stats.total)))?;
    for (label, value, severity) in [
        ("Info", stats.info, Severity::Info),
        ("Warnings", stats.warnings, Severity::Warning),
        ("Errors", stats.errors, Severity::Error),
    ] {
        queue!(
            out,
            SetForegroundColor(severity_color(severity)),
            Print(format!("{} {}   ", label, value)),
            ResetColor
        )?;
    }
    row += 1;

    if stats.total > 0 && row < rows {
        render_distribution(out, state, w, row)?;
        row += 1;
    }

    if let Some(err) = &state.last_error {
        queue!(
            out,
            cursor::MoveTo(0, row),
            SetForegroundColor(Color::Red),
            Print(fit(&format!("Refresh failed, showing previous data: {}", err), w)),
            ResetColor
        )?;
    }
    row += 1;

    let timeline = state.timeline();
    if !timeline.is_empty() {
        queue!(out, cursor::MoveTo(0, row), Print("Timeline (UTC, per hour)"))?;
        row += 1;

        let peak = timeline.iter().map(|b| b.total()).max().unwrap_or(1).max(1);
        let bar_width = w.saturating_sub(16).max(1);
        for bucket in &timeline {
            if row >= rows {
                return Ok(());
            }
            queue!(out, cursor::MoveTo(0, row), Print(format!("{} ", bucket.label())))?;
            for (count, severity) in [
                (bucket.info, Severity::Info),
                (bucket.warning, Severity::Warning),
                (bucket.error, Severity::Error),
            ] {
                let cells = count * bar_width / peak;
                queue!(
                    out,
                    SetForegroundColor(severity_color(severity)),
                    Print("█".repeat(cells)),
                    ResetColor
                )?;
            }
            queue!(out, Print(format!(" {}", bucket.total())))?;
            row += 1;
        }
        row += 1;
    }

    if row >= rows {
        return Ok(());
    }
    let visible = state.stats.count(state.filter);
    queue!(
        out,
        cursor::MoveTo(0, row),
        SetAttribute(Attribute::Bold),
        Print(format!(
            "Recent logs [{}] ({} of {})",
            state.filter.label(),
            visible,
            state.logs.len()
        )),
        SetAttribute(Attribute::Reset)
    )?;
    row += 1;

    if visible == 0 && row < rows {
        queue!(out, cursor::MoveTo(0, row), Print("No logs found"))?;
        return Ok(());
    }

    for log in state.visible_logs() {
        if row >= rows {
            break;
        }
        let badge = format!("{:<7}", log.severity.as_str().to_uppercase());
        let age = format!(" {:>8}  ", time_ago(log.timestamp, now));
        let remaining = w.saturating_sub(UnicodeWidthStr::width(badge.as_str()) + age.len());
        queue!(
            out,
            cursor::MoveTo(0, row),
            SetForegroundColor(severity_color(log.severity)),
            Print(badge),
            ResetColor,
            Print(age),
            Print(fit(&log.message, remaining))
        )?;
        row += 1;
    }

    Ok(())
}

/// One proportional bar split by severity, followed by the percentages.
fn render_distribution(
    out: &mut impl Write,
    state: &DashboardState,
    width: usize,
    row: u16,
) -> Result<()> {
    const LABEL: &str = "Distribution ";
    let severities = [Severity::Info, Severity::Warning, Severity::Error];
    let legend: Vec<String> = severities
        .iter()
        .map(|s| format!("{} {:.0}%", s, state.stats.share(*s) * 100.0))
        .collect();
    let legend = format!("  {}", legend.join("  "));
    let bar_width = width.saturating_sub(LABEL.len() + legend.len()).min(40);

    queue!(out, cursor::MoveTo(0, row), Print(LABEL))?;
    for severity in severities {
        let cells = (state.stats.share(severity) * bar_width as f64).round() as usize;
        queue!(
            out,
            SetForegroundColor(severity_color(severity)),
            Print("█".repeat(cells)),
            ResetColor
        )?;
    }
    queue!(out, Print(fit(&legend, width.saturating_sub(LABEL.len() + bar_width))))?;
    Ok(())
}

fn render_footer(out: &mut impl Write, state: &DashboardState, width: u16, row: u16) -> Result<()> {
    let w = width as usize;

    if let Some(notice) = &state.notice {
        let color = match notice.kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        queue!(
            out,
            cursor::MoveTo(0, row),
            SetForegroundColor(color),
            Print(fit(&notice.text, w)),
            ResetColor
        )?;
    }

    let prompt = format!("submit [{}]> ", state.form.severity);
    let input = if state.form.submitting {
        "Submitting...".to_string()
    } else {
        state.form.message.clone()
    };
    queue!(
        out,
        cursor::MoveTo(0, row + 1),
        SetForegroundColor(severity_color(state.form.severity)),
        Print(&prompt),
        ResetColor,
        Print(fit(&input, w.saturating_sub(prompt.len())))
    )?;

    let status = fit(
        " F5 refresh | F2 auto-refresh | F3 filter | Tab severity | Enter submit | Esc quit",
        w,
    );
    let padding = w.saturating_sub(UnicodeWidthStr::width(status.as_str()));
    queue!(
        out,
        cursor::MoveTo(0, row + 2),
        SetBackgroundColor(Color::DarkGrey),
        SetForegroundColor(Color::White),
        Print(status),
        Print(" ".repeat(padding)),
        ResetColor
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LogRecord, LOG_PARTITION};
    use uuid::Uuid;

    #[test]
    fn fit_respects_wide_characters() {
        assert_eq!(fit("hello", 3), "hel");
        assert_eq!(fit("日本語", 4), "日本");
        assert_eq!(fit("a\nb", 10), "a b");
    }

    #[test]
    fn escape_sequences_never_reach_the_terminal() {
        let hostile = "ok\x1b[2Jboom\ttab\x07";
        assert!(!fit(hostile, 80).chars().any(char::is_control));
        assert_eq!(printable(hostile), "ok [2Jboom tab ");
    }

    #[test]
    fn renders_severity_distribution() {
        let mut state = DashboardState::new();
        let now = Utc::now();
        let logs = [Severity::Info, Severity::Info, Severity::Info, Severity::Error]
            .into_iter()
            .map(|severity| LogRecord {
                partition: LOG_PARTITION.to_string(),
                timestamp: now,
                id: Uuid::new_v4(),
                severity,
                message: "event".to_string(),
            })
            .collect();
        let seq = state.begin_fetch();
        state.apply_fetch(seq, logs, now);

        let mut buf = Vec::new();
        render(&mut buf, &state, (120, 40), now).unwrap();

        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("Distribution"));
        assert!(text.contains("info 75%"));
        assert!(text.contains("warning 0%"));
        assert!(text.contains("error 25%"));
    }

    #[test]
    fn renders_loading_screen() {
        let state = DashboardState::new();
        let mut buf = Vec::new();
        render(&mut buf, &state, (80, 24), Utc::now()).unwrap();

        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("Loading dashboard..."));
        assert!(text.contains("F5 refresh"));
    }

    #[test]
    fn renders_stats_and_entries() {
        let mut state = DashboardState::new();
        let now = Utc::now();
        let seq = state.begin_fetch();
        state.apply_fetch(
            seq,
            vec![LogRecord {
                partition: LOG_PARTITION.to_string(),
                timestamp: now,
                id: Uuid::new_v4(),
                severity: Severity::Error,
                message: "disk full".to_string(),
            }],
            now,
        );

        let mut buf = Vec::new();
        render(&mut buf, &state, (100, 40), now).unwrap();

        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("Errors 1"));
        assert!(text.contains("disk full"));
        assert!(text.contains("Recent logs [all] (1 of 1)"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut state = DashboardState::new();
        let seq = state.begin_fetch();
        state.apply_fetch(seq, Vec::new(), Utc::now());

        let mut buf = Vec::new();
        render(&mut buf, &state, (5, 2), Utc::now()).unwrap();
    }
}
