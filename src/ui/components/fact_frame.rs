use factdrill::display::frame::{COLS, ROWS};
use factdrill::display::{Frame, LineTone};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

const CELL_WIDTH: u16 = 3;
const GRID_WIDTH: u16 = CELL_WIDTH * COLS as u16;
// three rows plus the divider line
const GRID_HEIGHT: u16 = ROWS as u16 + 1;

/// Draws a `Frame` as a stacked fact inside a bordered panel.
pub struct FactFrame<'a> {
    title: &'a str,
    frame: Frame,
    tone: LineTone,
    covered: bool,
    accent: Option<Color>,
    theme: &'a Theme,
}

impl<'a> FactFrame<'a> {
    pub fn new(title: &'a str, frame: Frame, tone: LineTone, theme: &'a Theme) -> Self {
        Self {
            title,
            frame,
            tone,
            covered: false,
            accent: None,
            theme,
        }
    }

    pub fn covered(mut self, covered: bool) -> Self {
        self.covered = covered;
        self
    }

    /// Border color override, e.g. red while showing a correction.
    pub fn accent(mut self, color: Color) -> Self {
        self.accent = Some(color);
        self
    }
}

impl Widget for FactFrame<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(self.accent.unwrap_or(colors.border())))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < GRID_WIDTH || inner.height < GRID_HEIGHT {
            return;
        }

        let x0 = inner.x + (inner.width - GRID_WIDTH) / 2;
        let y0 = inner.y + (inner.height - GRID_HEIGHT) / 2;
        let cell_style = Style::default()
            .fg(colors.fg())
            .bg(colors.cell_bg())
            .add_modifier(Modifier::BOLD);

        if self.covered {
            let cover_style = Style::default().fg(colors.cover()).bg(colors.cover());
            for dy in 0..GRID_HEIGHT {
                for dx in 0..GRID_WIDTH {
                    buf[(x0 + dx, y0 + dy)].set_symbol("\u{2591}").set_style(cover_style);
                }
            }
            return;
        }

        for row in 0..ROWS {
            // the divider sits between operand B and the answer
            let y = if row < 2 { y0 + row as u16 } else { y0 + row as u16 + 1 };
            for col in 0..COLS {
                let x = x0 + col as u16 * CELL_WIDTH;
                let text = format!(" {} ", self.frame.cells[row][col]);
                buf.set_string(x, y, &text, cell_style);
            }
        }

        let line_style = Style::default().fg(colors.line(self.tone)).bg(colors.cell_bg());
        let line = "\u{2500}".repeat(GRID_WIDTH as usize);
        buf.set_string(x0, y0 + 2, &line, line_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factdrill::display::layout;

    fn rendered(widget: FactFrame<'_>) -> Buffer {
        let area = Rect::new(0, 0, 20, 8);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect::<String>()
    }

    #[test]
    fn draws_stacked_fact() {
        let theme = Theme::default();
        let buf = rendered(FactFrame::new("Copy", layout("7+7=14"), LineTone::Solid, &theme));
        let all: String = (0..8).map(|y| row_text(&buf, y)).collect::<Vec<_>>().join("\n");
        assert!(all.contains(" 7 "));
        assert!(all.contains(" + "));
        assert!(all.contains(" 1  4 "));
        assert!(all.contains("\u{2500}\u{2500}\u{2500}"));
    }

    #[test]
    fn covered_hides_digits() {
        let theme = Theme::default();
        let buf = rendered(
            FactFrame::new("Look", layout("9x9=81"), LineTone::Gray, &theme).covered(true),
        );
        let all: String = (0..8).map(|y| row_text(&buf, y)).collect();
        assert!(!all.contains('8'));
        assert!(all.contains('\u{2591}'));
    }
}
