pub mod charting;
pub mod dashboard_view;
pub mod screen;
pub mod session_view;
pub mod summary_view;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

use unicode_width::UnicodeWidthStr;

use crate::catalog::Difficulty;
use crate::dashboard::{Alert, Dashboard};
use crate::progress::ExerciseStatus;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const ALERT_MIN_WIDTH: u16 = 30;
const ALERT_MAX_WIDTH: u16 = 60;

/// Draw the whole application for the current view
pub fn draw(f: &mut Frame, dashboard: &Dashboard) {
    let area = f.area();
    render(dashboard, area, f.buffer_mut());
}

pub fn render(dashboard: &Dashboard, area: Rect, buf: &mut Buffer) {
    screen::current_screen(dashboard.view()).render(dashboard, area, buf);
    if let Some(alert) = dashboard.alert() {
        render_alert(alert, area, buf);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Beginner => Color::Green,
        Difficulty::Intermediate => Color::Yellow,
        Difficulty::Advanced => Color::Red,
    }
}

fn status_span(status: ExerciseStatus) -> Span<'static> {
    match status {
        ExerciseStatus::Completed => Span::styled("✓ done", Style::default().fg(Color::Green)),
        ExerciseStatus::InProgress => {
            Span::styled("● in progress", Style::default().fg(Color::Yellow))
        }
        ExerciseStatus::Locked => Span::styled("○ new", dim()),
    }
}

fn legend(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(text, italic()))
}

/// Rectangle of the given size centered in `area`, clipped to it
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Popup width fitting the longer of title and message, plus borders and padding
fn alert_width(alert: &Alert) -> u16 {
    let text = alert.title.width().max(alert.message.width());
    u16::try_from(text + 4)
        .unwrap_or(u16::MAX)
        .clamp(ALERT_MIN_WIDTH, ALERT_MAX_WIDTH)
}

fn render_alert(alert: &Alert, area: Rect, buf: &mut Buffer) {
    let popup = centered(alert_width(alert), 7, area);
    Clear.render(popup, buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(alert.title.as_str(), bold().fg(Color::Red)))
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(popup);
    block.render(popup, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    Paragraph::new(alert.message.as_str())
        .wrap(Wrap { trim: true })
        .render(chunks[0], buf);
    Paragraph::new(Line::from(Span::styled("(enter) dismiss", italic())))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
}

/// Rows of a rendered buffer, for assertions in tests
#[cfg(test)]
pub(crate) fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (0..area.height)
        .map(|y| {
            (0..area.width)
                .filter_map(|x| buf.cell((area.x + x, area.y + y)))
                .map(|c| c.symbol())
                .collect::<String>()
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressEvent;

    #[test]
    fn test_centered_clips_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered(20, 4, area), Rect::new(10, 3, 20, 4));
        assert_eq!(centered(80, 40, area), area);
    }

    #[test]
    fn test_alert_width_follows_text() {
        let short = Alert {
            title: "Oops".to_string(),
            message: "no".to_string(),
        };
        assert_eq!(alert_width(&short), ALERT_MIN_WIDTH);

        let wide = Alert {
            title: "Could not start exercise".to_string(),
            message: "x".repeat(40),
        };
        assert_eq!(alert_width(&wide), 44);

        let long = Alert {
            title: "t".to_string(),
            message: "x".repeat(200),
        };
        assert_eq!(alert_width(&long), ALERT_MAX_WIDTH);
    }

    #[test]
    fn test_alert_overlays_current_view() {
        let (mut d, _commands) = test_support::dashboard();
        d.start_exercise(1);
        d.handle_progress(ProgressEvent::StatusUpdated {
            exercise_id: 1,
            status: ExerciseStatus::InProgress,
            result: Err("server responded with 503".to_string()),
        });

        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        render(&d, area, &mut buf);

        let text = buffer_lines(&buf).join("\n");
        assert!(text.contains("Could not start exercise"));
        assert!(text.contains("server responded with 503"));
        assert!(text.contains("(enter) dismiss"));
    }

    #[test]
    fn test_draw_through_test_backend() {
        use ratatui::{backend::TestBackend, Terminal};

        let (mut d, _commands) = test_support::dashboard();
        let mut terminal = Terminal::new(TestBackend::new(110, 45)).unwrap();
        terminal.draw(|f| draw(f, &d)).unwrap();
        let text = buffer_lines(terminal.backend().buffer()).join("\n");
        assert!(text.contains("Speech Coach"));

        d.start_selected();
        terminal.draw(|f| draw(f, &d)).unwrap();
        let text = buffer_lines(terminal.backend().buffer()).join("\n");
        assert!(text.contains("Instructions"));
    }

    #[test]
    fn test_renders_in_tiny_area_without_panic() {
        let (d, _commands) = test_support::dashboard();
        for (w, h) in [(1, 1), (10, 3), (20, 8), (200, 60)] {
            let area = Rect::new(0, 0, w, h);
            let mut buf = Buffer::empty(area);
            render(&d, area, &mut buf);
        }
    }
}
