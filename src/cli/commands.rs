use crate::dashboard::render::printable;
use crate::dashboard::state::time_ago;
use crate::dashboard::ApiClient;
use crate::types::{iso_millis, IngestRequest, LogRecord, Severity};
use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};

fn badge(severity: Severity) -> ColoredString {
    let label = format!("{:<7}", severity.as_str().to_uppercase());
    match severity {
        Severity::Info => label.blue(),
        Severity::Warning => label.yellow(),
        Severity::Error => label.red().bold(),
    }
}

/// Formats one entry as a single terminal line.
pub fn format_entry(log: &LogRecord, now: DateTime<Utc>) -> String {
    format!(
        "{} {:>8}  {}  {}",
        badge(log.severity),
        time_ago(log.timestamp, now),
        printable(&log.message),
        log.id.to_string().dimmed()
    )
}

/// Submits one entry and prints the assigned id and timestamp.
pub async fn submit(client: &ApiClient, severity: &str, message: &str) -> Result<()> {
    let receipt = client
        .submit(&IngestRequest {
            severity: Some(severity.to_string()),
            message: Some(message.to_string()),
        })
        .await?;

    println!(
        "{} {} at {}",
        "Stored".green().bold(),
        receipt.id,
        iso_millis::format(&receipt.date_time)
    );
    Ok(())
}

/// Prints the most recent entries, newest first.
pub async fn recent(client: &ApiClient, limit: Option<usize>) -> Result<()> {
    let response = client.fetch_logs().await?;
    let now = Utc::now();

    if response.logs.is_empty() {
        println!("{}", "No logs found".dimmed());
        return Ok(());
    }

    let shown = limit.unwrap_or(response.count).min(response.logs.len());
    for log in response.logs.iter().take(shown) {
        println!("{}", format_entry(log, now));
    }
    println!("{}", format!("({} of {} entries)", shown, response.count).dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LOG_PARTITION;
    use chrono::TimeDelta;
    use uuid::Uuid;

    #[test]
    fn entry_line_carries_message_age_and_id() {
        colored::control::set_override(false);
        let now = Utc::now();
        let log = LogRecord {
            partition: LOG_PARTITION.to_string(),
            timestamp: now - TimeDelta::minutes(3),
            id: Uuid::new_v4(),
            severity: Severity::Warning,
            message: "slow query".to_string(),
        };

        let line = format_entry(&log, now);
        assert!(line.starts_with("WARNING"));
        assert!(line.contains("3m ago"));
        assert!(line.contains("slow query"));
        assert!(line.contains(&log.id.to_string()));
    }

    #[test]
    fn entry_line_blanks_control_characters() {
        colored::control::set_override(false);
        let now = Utc::now();
        let log = LogRecord {
            partition: LOG_PARTITION.to_string(),
            timestamp: now,
            id: Uuid::new_v4(),
            severity: Severity::Error,
            message: "\x1b[2Jwiped\r\nscreen".to_string(),
        };

        let line = format_entry(&log, now);
        assert!(!line.chars().any(char::is_control));
        assert!(line.contains(" [2Jwiped  screen"));
    }
}
