use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥70 cols: frames side by side with the keypad on the right
    Narrow, // <70 cols: frames stacked, keypad below
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 70 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }
}

/// Screen regions for the practice screen. Computed the same way for drawing
/// and for mapping mouse clicks onto the keypad.
pub struct PracticeLayout {
    pub header: Rect,
    pub timer: Rect,
    pub stimulus: Rect,
    pub response: Rect,
    pub keypad: Rect,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl PracticeLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        match tier {
            LayoutTier::Wide => {
                let horizontal = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([
                        Constraint::Percentage(30),
                        Constraint::Percentage(30),
                        Constraint::Percentage(40),
                    ])
                    .split(vertical[2]);
                Self {
                    header: vertical[0],
                    timer: vertical[1],
                    stimulus: horizontal[0],
                    response: horizontal[1],
                    keypad: horizontal[2],
                    footer: vertical[3],
                    tier,
                }
            }
            LayoutTier::Narrow => {
                let stacked = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(vertical[2]);
                let frames = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(stacked[0]);
                Self {
                    header: vertical[0],
                    timer: vertical[1],
                    stimulus: frames[0],
                    response: frames[1],
                    keypad: stacked[1],
                    footer: vertical[3],
                    tier,
                }
            }
        }
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
    const MIN_POPUP_HEIGHT: u16 = 16;

    let target_w = (area.width.saturating_mul(percent_x.min(100)) / 100)
        .max(MIN_POPUP_WIDTH)
        .min(area.width);
    let target_h = (area.height.saturating_mul(percent_y.min(100)) / 100)
        .max(MIN_POPUP_HEIGHT)
        .min(area.height);

    let left = area.x + area.width.saturating_sub(target_w) / 2;
    let top = area.y + area.height.saturating_sub(target_h) / 2;
    Rect::new(left, top, target_w, target_h)
}
