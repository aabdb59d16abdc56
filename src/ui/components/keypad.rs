use factdrill::session::{EntryMode, SessionEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeypadKey {
    Char(char),
    Backspace,
    Clear,
    Check,
}

impl KeypadKey {
    pub fn label(self) -> String {
        match self {
            KeypadKey::Char('x') => "\u{00d7}".to_string(),
            KeypadKey::Char('/') => "\u{00f7}".to_string(),
            KeypadKey::Char(ch) => ch.to_string(),
            KeypadKey::Backspace => "\u{232b}".to_string(),
            KeypadKey::Clear => "C".to_string(),
            KeypadKey::Check => "\u{2713}".to_string(),
        }
    }

    /// The session event for a plain press. `Check` is resolved by the host
    /// because its meaning depends on the phase, exactly like the space bar.
    pub fn event(self) -> Option<SessionEvent> {
        match self {
            KeypadKey::Char(ch) => Some(SessionEvent::Input(ch)),
            KeypadKey::Backspace => Some(SessionEvent::Backspace),
            KeypadKey::Clear => Some(SessionEvent::Clear),
            KeypadKey::Check => None,
        }
    }
}

const ANSWER_ROWS: [[KeypadKey; 3]; 4] = [
    [KeypadKey::Char('7'), KeypadKey::Char('8'), KeypadKey::Char('9')],
    [KeypadKey::Char('4'), KeypadKey::Char('5'), KeypadKey::Char('6')],
    [KeypadKey::Char('1'), KeypadKey::Char('2'), KeypadKey::Char('3')],
    [KeypadKey::Backspace, KeypadKey::Char('0'), KeypadKey::Check],
];

const OPERATOR_COLUMN: [KeypadKey; 4] = [
    KeypadKey::Char('+'),
    KeypadKey::Char('-'),
    KeypadKey::Char('x'),
    KeypadKey::Char('/'),
];

const PROBLEM_EXTRA_ROW: [KeypadKey; 2] = [KeypadKey::Char('='), KeypadKey::Clear];

/// On-screen keypad. Answer entry shows digits only; problem entry adds an
/// operator column and an `=` key.
pub struct Keypad<'a> {
    mode: EntryMode,
    theme: &'a Theme,
}

impl<'a> Keypad<'a> {
    pub fn new(mode: EntryMode, theme: &'a Theme) -> Self {
        Self { mode, theme }
    }

    /// Key rectangles inside `area`, shared by rendering and click handling.
    pub fn key_areas(mode: EntryMode, area: Rect) -> Vec<(Rect, KeypadKey)> {
        let inner = Block::bordered().inner(area);
        let columns: u16 = if mode == EntryMode::ProblemEntry { 4 } else { 3 };
        let rows: u16 = if mode == EntryMode::ProblemEntry { 5 } else { 4 };
        if inner.width < columns * 3 || inner.height < rows {
            return Vec::new();
        }
        let key_w = inner.width / columns;
        let key_h = (inner.height / rows).min(3);
        let cell = |col: u16, row: u16| Rect::new(inner.x + col * key_w, inner.y + row * key_h, key_w, key_h);

        let mut keys = Vec::new();
        for (r, row) in ANSWER_ROWS.iter().enumerate() {
            for (c, key) in row.iter().enumerate() {
                keys.push((cell(c as u16, r as u16), *key));
            }
        }
        if mode == EntryMode::ProblemEntry {
            for (r, key) in OPERATOR_COLUMN.iter().enumerate() {
                keys.push((cell(3, r as u16), *key));
            }
            for (c, key) in PROBLEM_EXTRA_ROW.iter().enumerate() {
                keys.push((cell(c as u16, 4), *key));
            }
        }
        keys
    }

    pub fn hit(mode: EntryMode, area: Rect, column: u16, row: u16) -> Option<KeypadKey> {
        Self::key_areas(mode, area)
            .into_iter()
            .find(|(rect, _)| rect.contains(Position::new(column, row)))
            .map(|(_, key)| key)
    }
}

impl Widget for Keypad<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Keypad ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        block.render(area, buf);

        let key_style = Style::default()
            .fg(colors.key_fg())
            .bg(colors.key_bg())
            .add_modifier(Modifier::BOLD);
        for (rect, key) in Self::key_areas(self.mode, area) {
            if rect.width < 3 || rect.height == 0 {
                continue;
            }
            // one-cell gap between keys
            let face = Rect::new(rect.x, rect.y, rect.width - 1, rect.height.saturating_sub(1).max(1));
            buf.set_style(face, key_style);
            let label = key.label();
            let x = face.x + face.width.saturating_sub(label.chars().count() as u16) / 2;
            let y = face.y + face.height / 2;
            let style = match key {
                KeypadKey::Check => key_style.fg(colors.correct()),
                _ => key_style,
            };
            buf.set_string(x, y, &label, style);
        }
    }
}
