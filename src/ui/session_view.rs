use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use super::{bold, difficulty_color, dim, italic, legend, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::devices::RecordingState;
use crate::session::{SessionPhase, SessionRunner};
use crate::util::format_clock;

pub fn render(runner: &SessionRunner, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);

    render_title(runner, chunks[0], buf);
    match runner.phase() {
        SessionPhase::Instructions => render_instructions(runner, chunks[1], buf),
        _ => render_active(runner, chunks[1], buf),
    }
    legend(legend_for(runner.phase())).render(chunks[2], buf);
}

fn legend_for(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Instructions => "(enter) start  (esc) back",
        SessionPhase::Running => "(enter) next step  (p)ause  (c)omplete  (esc) back",
        SessionPhase::Paused => "(p) resume  (c)omplete  (esc) back",
        SessionPhase::Completed => "(esc) back",
    }
}

fn render_title(runner: &SessionRunner, area: Rect, buf: &mut Buffer) {
    let exercise = runner.exercise();
    Paragraph::new(vec![
        Line::from(Span::styled(exercise.title.as_str(), bold().fg(Color::Cyan))),
        Line::from(vec![
            Span::styled(
                exercise.difficulty.to_string(),
                Style::default().fg(difficulty_color(exercise.difficulty)),
            ),
            Span::styled(
                format!("  {}  {} min", exercise.exercise_type, exercise.duration),
                dim(),
            ),
        ]),
    ])
    .render(area, buf);
}

fn microphone_line(runner: &SessionRunner) -> Line<'static> {
    if !runner.has_microphone() {
        return Line::from(Span::styled("microphone unavailable, practicing without recording", dim()));
    }
    match runner.recording_state() {
        RecordingState::Recording => {
            Line::from(Span::styled("● REC", bold().fg(Color::Red)))
        }
        RecordingState::Paused => Line::from(Span::styled("❚❚ recording paused", dim())),
        RecordingState::Idle => Line::from(Span::styled("microphone ready", dim())),
    }
}

fn practice_lines(runner: &SessionRunner) -> Vec<Line<'static>> {
    let practice = runner.practice();
    let mut lines = vec![Line::from(Span::styled(practice.title, bold()))];
    lines.extend(practice.lines.iter().map(|l| Line::from(*l)));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(format!("Tip: {}", practice.tip), italic())));
    lines
}

fn render_instructions(runner: &SessionRunner, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mut lines = vec![
        Line::from(runner.exercise().description.clone()),
        Line::default(),
    ];
    lines.extend(
        runner
            .steps()
            .iter()
            .enumerate()
            .map(|(i, step)| Line::from(format!("{}. {step}", i + 1))),
    );
    lines.push(Line::default());
    lines.push(microphone_line(runner));

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Instructions"))
        .render(chunks[0], buf);

    Paragraph::new(practice_lines(runner))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Practice"))
        .render(chunks[1], buf);
}

fn render_active(runner: &SessionRunner, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // progress
            Constraint::Length(5), // step
            Constraint::Min(3),    // practice
        ])
        .split(area);

    let elapsed = runner.elapsed_secs();
    let target = runner.exercise().target_secs();
    let percent = runner.progress_percent().clamp(0.0, 100.0).round() as u16;
    let status = match runner.phase() {
        SessionPhase::Paused => " PAUSED",
        SessionPhase::Completed => " DONE",
        _ => "",
    };
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            "{} / {}{status}",
            format_clock(elapsed),
            format_clock(target)
        )))
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(percent)
        .label(format!("{percent}%"))
        .render(chunks[0], buf);

    let mut step_lines = if runner.phase() == SessionPhase::Completed {
        vec![Line::from(Span::styled("Saving your session...", italic()))]
    } else {
        vec![Line::from(Span::styled(runner.current_step(), bold()))]
    };
    if let Some(caption) = runner.caption() {
        step_lines.push(Line::from(Span::styled(format!("» {caption}"), dim())));
    }
    step_lines.push(microphone_line(runner));

    let step_title = format!(
        "Step {} of {}",
        (runner.step_index() + 1).min(runner.step_count()),
        runner.step_count()
    );
    Paragraph::new(step_lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(step_title))
        .render(chunks[1], buf);

    Paragraph::new(practice_lines(runner))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Practice"))
        .render(chunks[2], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{buffer_lines, test_support};

    fn rendered(runner: &SessionRunner) -> String {
        let area = Rect::new(0, 0, 140, 40);
        let mut buf = Buffer::empty(area);
        render(runner, area, &mut buf);
        buffer_lines(&buf).join("\n")
    }

    #[test]
    fn test_instructions_list_steps_and_practice() {
        let (mut d, _commands) = test_support::dashboard();
        assert!(d.start_exercise(1));
        let text = rendered(d.runner().unwrap());

        assert!(text.contains("Vowel Warm-Up"));
        assert!(text.contains("1. Take a deep breath"));
        assert!(text.contains("Vowel Sound Practice"));
        assert!(text.contains("microphone ready"));
        assert!(text.contains("(enter) start"));
    }

    #[test]
    fn test_running_shows_step_clock_and_recording() {
        let (mut d, _commands) = test_support::dashboard();
        d.start_exercise(1);
        let runner = d.runner_mut().unwrap();
        assert!(runner.start());

        let text = rendered(runner);
        assert!(text.contains("0:00 / 5:00"));
        assert!(text.contains("Step 1 of 5"));
        assert!(text.contains("● REC"));
        assert!(text.contains("(p)ause"));

        runner.advance_step();
        let text = rendered(runner);
        assert!(text.contains("Step 2 of 5"));
        assert!(text.contains("Listen carefully to the target sound"));
        assert!(text.contains("40%"));
    }

    #[test]
    fn test_paused_is_marked() {
        let (mut d, _commands) = test_support::dashboard();
        d.start_exercise(1);
        let runner = d.runner_mut().unwrap();
        runner.start();
        runner.pause();

        let text = rendered(runner);
        assert!(text.contains("PAUSED"));
        assert!(text.contains("recording paused"));
        assert!(text.contains("(p) resume"));
    }
}
