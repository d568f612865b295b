use chrono::Duration;

pub fn reaction_time(seconds: Option<f64>) -> String {
    match seconds {
        Some(value) => format!("{value:.3}s"),
        None => "-".to_string(),
    }
}

pub fn percentage(value: f64) -> String {
    format!("{value:.0}%")
}

/// `m:ss`, negative durations clamp to zero.
pub fn duration(value: Duration) -> String {
    let total = value.num_seconds().max(0);
    format!("{}:{:02}", total / 60, total % 60)
}
