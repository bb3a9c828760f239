use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::models::Priority;
use crate::state::NoticeKind;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// First and one-past-last index of the items that fit in `capacity` rows
/// while keeping `selected` visible.
pub(crate) fn visible_window(selected: usize, len: usize, capacity: usize) -> (usize, usize) {
    let capacity = capacity.max(1);
    let mut start = if selected >= capacity {
        selected + 1 - capacity
    } else {
        0
    };
    if start + capacity > len {
        start = len.saturating_sub(capacity);
    }
    (start, (start + capacity).min(len))
}

/// Terminal column count for `len` characters, saturating at `u16::MAX`.
pub(crate) fn to_column(len: usize) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX)
}

pub(crate) fn notice_style(kind: NoticeKind) -> Style {
    match kind {
        NoticeKind::Info => Style::default().fg(Color::Green),
        NoticeKind::Error => Style::default().fg(Color::Red),
    }
}

pub(crate) fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::Low => Style::default().fg(Color::DarkGray),
        Priority::Medium => Style::default().fg(Color::Blue),
        Priority::High => Style::default().fg(Color::Yellow),
        Priority::Urgent => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

/// `[key]` span followed by its description, as shown in the footer.
pub(crate) fn key_hint(key: &str, action: &str) -> [Span<'static>; 2] {
    [
        Span::styled(
            format!("[{key}]"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {action}   ")),
    ]
}
