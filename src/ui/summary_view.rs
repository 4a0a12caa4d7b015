use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::charting::format_label;
use super::{bold, dim, legend, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::dashboard::SessionSummary;
use crate::progress::AnalysisOutcome;
use crate::util::format_clock;

pub fn render(summary: &SessionSummary, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(8),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(area);

    let report = &summary.report;
    let saved = if report.recorded {
        Span::styled("saved to your progress", Style::default().fg(Color::Green))
    } else {
        Span::styled("not saved, the server did not accept it", Style::default().fg(Color::Red))
    };
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Score      "),
            Span::styled(format_label(report.score), bold()),
        ]),
        Line::from(vec![
            Span::raw("Time       "),
            Span::styled(format_clock(report.time_spent_secs), bold()),
            Span::styled(format!("  ({} min)", report.duration_minutes), dim()),
        ]),
        Line::from(vec![
            Span::raw("Progress   "),
            Span::styled(format!("{}%", format_label(report.progress_percent)), bold()),
        ]),
        Line::from(saved),
    ];
    if let Some(recording) = &report.recording {
        let file = recording
            .path
            .as_ref()
            .map_or_else(|| "not written".to_string(), |p| p.display().to_string());
        lines.push(Line::from(Span::styled(
            format!("Recording  {:.0}s, {file}", recording.duration.as_secs_f64()),
            dim(),
        )));
    }

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!("Completed: {}", report.exercise.title),
                    bold().fg(Color::Cyan),
                )),
        )
        .render(chunks[0], buf);

    let analysis = match &summary.analysis {
        None => vec![Line::from(Span::styled("Analyzing your session...", dim()))],
        Some(Err(e)) => vec![Line::from(Span::styled(
            format!("Analysis failed: {e}"),
            Style::default().fg(Color::Red),
        ))],
        Some(Ok(outcome)) => analysis_lines(outcome),
    };
    Paragraph::new(analysis)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Speech analysis"))
        .render(chunks[1], buf);

    legend("(enter) back  (q)uit").render(chunks[2], buf);
}

fn analysis_lines(outcome: &AnalysisOutcome) -> Vec<Line<'static>> {
    let scores = &outcome.scores;
    let mut lines = vec![
        Line::from(format!(
            "Pronunciation {}  Fluency {}  Clarity {}",
            format_label(scores.pronunciation),
            format_label(scores.fluency),
            format_label(scores.clarity)
        )),
        Line::from(vec![
            Span::raw("Overall "),
            Span::styled(format_label(scores.overall), bold()),
            Span::raw(format!("  +{} points", outcome.points)),
        ]),
    ];
    if !outcome.recorded {
        lines.push(Line::from(Span::styled(
            "points could not be saved",
            Style::default().fg(Color::Yellow),
        )));
    }
    if !outcome.suggestions.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Suggestions", bold())));
        lines.extend(
            outcome
                .suggestions
                .iter()
                .map(|s| Line::from(format!("- {s}"))),
        );
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{Dashboard, View};
    use crate::progress::{AnalysisScores, ProgressEvent};
    use crate::ui::{buffer_lines, test_support};

    fn completed() -> Dashboard {
        let (mut d, _commands) = test_support::dashboard();
        d.start_exercise(1);
        let runner = d.runner_mut().unwrap();
        runner.start();
        let mut report = runner.complete().unwrap();
        report.recorded = true;
        d.handle_progress(ProgressEvent::CompletionRecorded(report));
        assert_eq!(d.view(), View::Summary);
        d
    }

    fn rendered(d: &Dashboard) -> String {
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        render(d.summary().unwrap(), area, &mut buf);
        buffer_lines(&buf).join("\n")
    }

    #[test]
    fn test_pending_analysis() {
        let d = completed();
        let text = rendered(&d);
        assert!(text.contains("Completed: Vowel Warm-Up"));
        assert!(text.contains("saved to your progress"));
        assert!(text.contains("Analyzing your session..."));
        assert!(text.contains("(enter) back"));
    }

    #[test]
    fn test_analysis_results_and_suggestions() {
        let mut d = completed();
        d.handle_progress(ProgressEvent::Analysis {
            exercise_id: 1,
            result: Ok(AnalysisOutcome {
                exercise_id: 1,
                scores: AnalysisScores {
                    pronunciation: 80.0,
                    fluency: 70.0,
                    clarity: 90.0,
                    overall: 80.0,
                },
                points: 80,
                suggestions: vec!["Slow down on long vowels".to_string()],
                recorded: false,
            }),
        });

        let text = rendered(&d);
        assert!(text.contains("Pronunciation 80  Fluency 70  Clarity 90"));
        assert!(text.contains("+80 points"));
        assert!(text.contains("points could not be saved"));
        assert!(text.contains("- Slow down on long vowels"));
    }

    #[test]
    fn test_analysis_failure() {
        let mut d = completed();
        d.handle_progress(ProgressEvent::Analysis {
            exercise_id: 1,
            result: Err("analysis rejected: no audio".to_string()),
        });
        assert!(rendered(&d).contains("Analysis failed: analysis rejected: no audio"));
    }
}
