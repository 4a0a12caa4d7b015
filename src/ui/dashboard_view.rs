use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{
        BarChart, Block, Borders, Cell, Gauge, Paragraph, Row, StatefulWidget, Table, TableState,
        Widget,
    },
};

use super::charting::{format_label, plan_bars, plan_chart_max};
use super::{bold, difficulty_color, dim, legend, status_span, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::dashboard::Dashboard;
use crate::progress::{PlanDay, ProgressSnapshot};
use crate::util::{format_ago, format_long_date};

const LEGEND: &str =
    "(↑/↓) select  (enter) start  (d)ifficulty  (t)ype  (r)efresh  (q)uit";

pub fn render(dashboard: &Dashboard, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Length(3), // stats
            Constraint::Length(9), // weekly plan
            Constraint::Min(5),    // catalog
            Constraint::Length(1), // legend
        ])
        .split(area);

    render_header(dashboard, chunks[0], buf);
    let empty = ProgressSnapshot::default();
    let snapshot = dashboard.snapshot().unwrap_or(&empty);
    render_stats(snapshot, chunks[1], buf);
    render_plan(snapshot, chunks[2], buf);
    render_catalog(dashboard, chunks[3], buf);
    legend(LEGEND).render(chunks[4], buf);
}

fn render_header(dashboard: &Dashboard, area: Rect, buf: &mut Buffer) {
    let now = Local::now();
    let status = match (dashboard.fetch_error(), dashboard.updated_at()) {
        (Some(e), _) => Span::styled(
            format!("progress unavailable: {e}"),
            Style::default().fg(Color::Red),
        ),
        (None, Some(at)) => {
            let secs = now.signed_duration_since(at).num_seconds().max(0) as u64;
            Span::styled(format!("updated {}", format_ago(secs)), dim())
        }
        (None, None) => Span::styled("loading progress...", dim()),
    };

    Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Speech Coach", bold().fg(Color::Cyan)),
            Span::raw("  "),
            Span::styled(format_long_date(&now), dim()),
        ]),
        Line::from(status),
    ])
    .render(area, buf);
}

fn render_stats(snapshot: &ProgressSnapshot, area: Rect, buf: &mut Buffer) {
    let stats = [
        ("Points", snapshot.total_points.to_string()),
        ("Completed", snapshot.exercises_completed.to_string()),
        ("Streak", format!("{} days", snapshot.streak_days)),
        ("Average", format_label(snapshot.average_score)),
        ("Best", format_label(snapshot.best_score())),
        ("Minutes", format_label(snapshot.total_minutes())),
    ];

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, stats.len() as u32); 6])
        .split(area);

    for ((label, value), chunk) in stats.iter().zip(chunks.iter()) {
        Paragraph::new(Span::styled(value.as_str(), bold()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(*label))
            .render(*chunk, buf);
    }
}

fn render_plan(snapshot: &ProgressSnapshot, area: Rect, buf: &mut Buffer) {
    let today = Local::now().date_naive();
    let plan = snapshot.weekly_plan(today);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let bars = plan_bars(&plan);
    let data: Vec<(&str, u64)> = bars.iter().map(|(l, v)| (l.as_str(), *v)).collect();
    let done = plan.iter().filter(|d| d.completed).count();
    let today_percent = plan.last().map_or(0, PlanDay::percent);
    let title = format!(
        "This week: {done}/7 days at {} min/day, today {today_percent}%",
        snapshot.daily_target_minutes()
    );
    BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(data.as_slice())
        .bar_width(5)
        .bar_gap(2)
        .max(plan_chart_max(&plan))
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(bold().fg(Color::Black).bg(Color::Magenta))
        .render(chunks[0], buf);

    let percent = snapshot.weekly_percent(today);
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Weekly goal"))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(percent.min(100))
        .label(format!("{percent}% of {} min", snapshot.weekly_goal))
        .render(chunks[1], buf);
}

fn render_catalog(dashboard: &Dashboard, area: Rect, buf: &mut Buffer) {
    let filter = dashboard.filter();
    let rows: Vec<Row> = dashboard
        .visible_exercises()
        .map(|e| {
            Row::new(vec![
                Cell::from(status_span(dashboard.status_of(e.id))),
                Cell::from(e.title.clone()),
                Cell::from(e.exercise_type.to_string()),
                Cell::from(Span::styled(
                    e.difficulty.to_string(),
                    Style::default().fg(difficulty_color(e.difficulty)),
                )),
                Cell::from(format!("{} min", e.duration)),
            ])
        })
        .collect();
    let count = rows.len();

    let title = format!(
        "Exercises ({count}) difficulty: {} type: {}",
        filter.difficulty(),
        filter.exercise_type()
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(13),
            Constraint::Length(7),
        ],
    )
    .header(Row::new(vec!["Status", "Exercise", "Type", "Difficulty", "Time"]).style(bold()))
    .block(Block::default().borders(Borders::ALL).title(title))
    .row_highlight_style(Style::default().bg(Color::DarkGray))
    .highlight_symbol("> ");

    let mut state = TableState::default().with_selected((count > 0).then_some(dashboard.selected()));
    StatefulWidget::render(table, area, buf, &mut state);
}
