use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Top-level areas of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Verses,
    Store,
    Analytics,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Verses, Section::Store, Section::Analytics];

    pub fn label(self) -> &'static str {
        match self {
            Section::Verses => "Verse Manager",
            Section::Store => "Store",
            Section::Analytics => "Analytics",
        }
    }

    /// Digit that jumps straight to this section.
    pub fn hotkey(self) -> char {
        match self {
            Section::Verses => '1',
            Section::Store => '2',
            Section::Analytics => '3',
        }
    }

    pub fn from_hotkey(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.hotkey() == ch)
    }

    pub fn next(self) -> Self {
        match self {
            Section::Verses => Section::Store,
            Section::Store => Section::Analytics,
            Section::Analytics => Section::Verses,
        }
    }
}

/// Navigation lines for the given active section.
pub(crate) fn sidebar_lines(active: Section) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "ONIMIX",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Artist dashboard",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    for section in Section::ALL {
        let text = format!("[{}] {}", section.hotkey(), section.label());
        if section == active {
            lines.push(Line::from(Span::styled(
                format!("▶ {text}"),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(format!("  {text}")));
        }
    }
    lines
}

pub(crate) fn draw_sidebar(frame: &mut Frame, area: Rect, active: Section) {
    let block = Block::default().borders(Borders::RIGHT);
    let paragraph = Paragraph::new(sidebar_lines(active)).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotkeys_round_trip_sections() {
        for section in Section::ALL {
            assert_eq!(Section::from_hotkey(section.hotkey()), Some(section));
        }
        assert_eq!(Section::from_hotkey('9'), None);
    }

    #[test]
    fn tab_order_wraps() {
        assert_eq!(Section::Analytics.next(), Section::Verses);
        assert_eq!(Section::Verses.next().next(), Section::Analytics);
    }

    #[test]
    fn only_active_section_is_marked() {
        let lines = sidebar_lines(Section::Store);
        let rendered: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
        assert!(rendered.iter().any(|line| line == "▶ [2] Store"));
        assert!(rendered.iter().any(|line| line == "  [1] Verse Manager"));
        assert_eq!(rendered.iter().filter(|line| line.starts_with('▶')).count(), 1);
    }
}
