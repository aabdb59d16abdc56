use factdrill::session::InterventionMode;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

pub struct MenuItem {
    pub key: String,
    pub mode: InterventionMode,
    pub description: String,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    /// Shown under the title, e.g. "ava | multiplication".
    pub subtitle: String,
    pub benchmark_due: bool,
    pub theme: &'a Theme,
}

fn describe(mode: InterventionMode) -> &'static str {
    match mode {
        InterventionMode::CoverCopyCompare => "Look at the fact, cover it, copy it from memory, then compare",
        InterventionMode::ExplicitTiming => "Answer as many facts as you can before time runs out",
        InterventionMode::TapedProblems => "Answer each fact, the answer is shown if you miss",
        InterventionMode::Benchmark => "Timed check of your fluency, no help given",
    }
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            items: InterventionMode::ALL
                .iter()
                .enumerate()
                .map(|(i, &mode)| MenuItem {
                    key: (i + 1).to_string(),
                    mode,
                    description: describe(mode).to_string(),
                })
                .collect(),
            selected: 0,
            subtitle: String::new(),
            benchmark_due: false,
            theme,
        }
    }

    pub fn selected_mode(&self) -> InterventionMode {
        self.items[self.selected].mode
    }

    pub fn select(&mut self, mode: InterventionMode) {
        if let Some(i) = self.items.iter().position(|item| item.mode == mode) {
            self.selected = i;
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "factdrill",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.subtitle.as_str(),
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];

        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        title.render(layout[0], buf);

        if self.benchmark_due {
            let notice = Paragraph::new(Line::from(Span::styled(
                "A benchmark is due",
                Style::default()
                    .fg(colors.warning())
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center);
            notice.render(layout[1], buf);
        }

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{key}] {label}", key = item.key, label = item.mode.label());
            let desc_text = format!("     {}", item.description);

            let lines = vec![
                Line::from(Span::styled(
                    &*label_text,
                    Style::default()
                        .fg(if is_selected {
                            colors.accent()
                        } else {
                            colors.fg()
                        })
                        .add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                )),
                Line::from(Span::styled(
                    &*desc_text,
                    Style::default().fg(colors.border()),
                )),
            ];

            let p = Paragraph::new(lines);
            if i < menu_layout.len() {
                p.render(menu_layout[i], buf);
            }
        }
    }
}
