use crate::progress::PlanDay;

/// Bar labels (short weekday) and values (whole minutes) for the weekly plan
pub fn plan_bars(plan: &[PlanDay]) -> Vec<(String, u64)> {
    plan.iter()
        .map(|day| {
            (
                day.date.format("%a").to_string(),
                day.minutes.max(0.0).round() as u64,
            )
        })
        .collect()
}

/// Upper bound of the bar chart: the daily target or the busiest day, at least 1
pub fn plan_chart_max(plan: &[PlanDay]) -> u64 {
    plan.iter()
        .map(|day| u64::from(day.target_minutes).max(day.minutes.max(0.0).ceil() as u64))
        .max()
        .unwrap_or(0)
        .max(1)
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
