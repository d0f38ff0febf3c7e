//! Time helpers shared by the editor and the controller

/// Shown instead of a timestamp when there is nothing meaningful to format.
pub const TIME_PLACEHOLDER: &str = "--:--";

/// Round a time value to the nearest tenth of a second.
pub fn snap(seconds: f64) -> f64 {
    (seconds * 10.0).round() / 10.0
}

/// Clamp without panicking when the bounds cross (`max` wins).
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Format seconds as `M:SS`, or `H:MM:SS` from one hour up.
///
/// `None`, negative, NaN and infinite inputs yield [`TIME_PLACEHOLDER`].
pub fn format_time(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => s,
        _ => return TIME_PLACEHOLDER.to_string(),
    };

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
