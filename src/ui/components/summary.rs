use factdrill::session::{Outcome, SessionResult};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;

/// End-of-session results. A failed save is shown as a banner with a retry
/// hint; the result stays on screen until it is saved or dismissed.
pub struct Summary<'a> {
    pub result: &'a SessionResult,
    pub persist_error: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> Summary<'a> {
    pub fn new(result: &'a SessionResult, persist_error: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            result,
            persist_error,
            theme,
        }
    }
}

fn missed_facts(result: &SessionResult) -> String {
    let missed: Vec<String> = result
        .records
        .iter()
        .filter(|r| r.outcome == Outcome::Incorrect)
        .map(|r| r.problem.canonical())
        .collect();
    if missed.is_empty() {
        "none".to_string()
    } else {
        missed.join("  ")
    }
}

impl Widget for Summary<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let result = self.result;

        let block = Block::bordered()
            .title(format!(" {} Complete ", result.mode.label()))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(inner);

        let heading = if result.expired { "Time's up!" } else { "All done!" };
        let title = Paragraph::new(Line::from(Span::styled(
            heading,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let correct_text = format!("{} of {}", result.correct, result.attempted());
        let accuracy_text = format!("  ({:.0}%)", result.accuracy());
        Paragraph::new(Line::from(vec![
            Span::styled("  Correct:  ", Style::default().fg(colors.fg())),
            Span::styled(
                &*correct_text,
                Style::default()
                    .fg(colors.correct())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(&*accuracy_text, Style::default().fg(colors.border())),
        ]))
        .render(layout[1], buf);

        let dcpm_text = format!("{:.1}", result.digits_correct_per_minute);
        let digits_text = format!("  ({} digits)", result.digits_correct);
        Paragraph::new(Line::from(vec![
            Span::styled("  DCPM:     ", Style::default().fg(colors.fg())),
            Span::styled(
                &*dcpm_text,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(&*digits_text, Style::default().fg(colors.border())),
        ]))
        .render(layout[2], buf);

        let secs = result.total_duration_ms / 1000;
        let time_text = format!("{}:{:02}", secs / 60, secs % 60);
        let mut extra = Vec::new();
        if result.skipped > 0 {
            extra.push(format!("{} skipped", result.skipped));
        }
        if result.unanswered > 0 {
            extra.push(format!("{} unanswered", result.unanswered));
        }
        let extra_text = if extra.is_empty() {
            String::new()
        } else {
            format!("  ({})", extra.join(", "))
        };
        Paragraph::new(Line::from(vec![
            Span::styled("  Time:     ", Style::default().fg(colors.fg())),
            Span::styled(&*time_text, Style::default().fg(colors.fg())),
            Span::styled(&*extra_text, Style::default().fg(colors.border())),
        ]))
        .render(layout[3], buf);

        let missed_text = missed_facts(result);
        Paragraph::new(Line::from(vec![
            Span::styled("  Missed:   ", Style::default().fg(colors.fg())),
            Span::styled(&*missed_text, Style::default().fg(colors.incorrect())),
        ]))
        .wrap(Wrap { trim: true })
        .render(layout[4], buf);

        if let Some(err) = self.persist_error {
            let banner = Paragraph::new(vec![
                Line::from(Span::styled(
                    "  Results were not saved",
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(format!("  {err}"), Style::default().fg(colors.warning()))),
            ])
            .wrap(Wrap { trim: false });
            banner.render(layout[5], buf);
        }

        let help = if self.persist_error.is_some() {
            "  [s] Retry save  [r] Practice again  [q] Menu"
        } else {
            "  [r] Practice again  [q] Menu"
        };
        Paragraph::new(Line::from(Span::styled(
            help,
            Style::default().fg(colors.accent()),
        )))
        .render(layout[6], buf);
    }
}
