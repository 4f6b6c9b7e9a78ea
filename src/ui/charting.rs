use typeline::time_series::HistoryPoint;

/// Compute X (seconds) and Y (WPM) bounds for the results chart
pub fn compute_chart_params(history: &[HistoryPoint], fallback_secs: Option<u32>) -> (f64, f64) {
    let highest_wpm = history.iter().map(|p| p.wpm).fold(0.0, f64::max);

    let overall_duration = match history.last() {
        Some(p) if p.time > 0 => p.time as f64,
        _ => fallback_secs.map_or(1.0, f64::from),
    };

    (overall_duration.max(1.0), highest_wpm.round().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
