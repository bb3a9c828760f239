//! Rendering for each section and its popups. Everything here reads state and
//! draws; nothing mutates it.

use std::collections::BTreeMap;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::analytics::{
    bar, format_currency, group_thousands, Dashboard, DashboardView, LOAD_ERROR_MESSAGE,
};
use crate::models::{Verse, VerseCategory};
use crate::state::Edit;
use crate::store::{ProductDraft, ProductField, Store};
use crate::verses::{Confirmation, VerseDraft, VerseField, VerseManager};

use super::forms::{ProductForm, VerseForm};
use super::helpers::{centered_rect, priority_style, to_column, visible_window};

/// Height allocation per verse card.
const VERSE_CARD_HEIGHT: u16 = 5;
const EXCERPT_CHARS: usize = 90;
const BAR_WIDTH: usize = 24;

pub(crate) fn draw_verses(frame: &mut Frame, area: Rect, manager: &VerseManager) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    let mut header = vec![
        Span::styled(
            manager.filters().summary(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   sorted by {}", manager.sort().label()),
            Style::default().fg(Color::Gray),
        ),
    ];
    if manager.bulk_mode() {
        header.push(Span::styled(
            format!("   BULK: {} selected", manager.selection().len()),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    }
    if manager.is_loading() {
        header.push(Span::styled("   loading...", Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

    let list_area = chunks[1];
    if manager.verses().is_empty() {
        let text = if !manager.has_loaded() {
            "Loading verses..."
        } else if manager.filters().is_active() {
            "No verses match the current filters."
        } else {
            "No verses yet. Press 'n' to write one."
        };
        let message = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(message, list_area);
        return;
    }

    render_verse_cards(frame, list_area, manager);
}

fn render_verse_cards(frame: &mut Frame, area: Rect, manager: &VerseManager) {
    if area.height == 0 {
        return;
    }
    let verses = manager.verses();
    let selected = manager.selected_index();
    let capacity = (area.height / VERSE_CARD_HEIGHT) as usize;
    let (start, end) = visible_window(selected, verses.len(), capacity);

    let constraints: Vec<Constraint> = (start..end)
        .map(|_| Constraint::Length(VERSE_CARD_HEIGHT))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (chunk, index) in rows.iter().zip(start..end) {
        let verse = &verses[index];
        let is_current = index == selected;
        let lines = verse_card_lines(
            verse,
            is_current,
            manager.bulk_mode(),
            manager.is_selected(&verse.id),
        );

        let mut block = Block::default().borders(Borders::ALL);
        if is_current {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, *chunk);
    }
}

fn verse_card_lines(
    verse: &Verse,
    is_current: bool,
    bulk_mode: bool,
    is_checked: bool,
) -> Vec<Line<'static>> {
    let mut title = Vec::new();
    if bulk_mode {
        title.push(Span::raw(if is_checked { "[x] " } else { "[ ] " }));
    }
    let marker = if is_current { "▶ " } else { "" };
    title.push(Span::styled(
        format!("{marker}{}", verse.title),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    title.push(Span::styled(
        format!("  {}", verse.category.label()),
        Style::default().fg(Color::Gray),
    ));
    title.push(Span::styled(
        format!("  {}", verse.priority.label()),
        priority_style(verse.priority),
    ));
    title.push(if verse.is_complete {
        Span::styled("  ✔ Complete", Style::default().fg(Color::Green))
    } else {
        Span::styled("  ✎ Draft", Style::default().fg(Color::DarkGray))
    });

    let mut meta = vec![Span::raw(format!("{} words", verse.display_word_count()))];
    if !verse.tags.is_empty() {
        meta.push(Span::styled(
            format!("  #{}", verse.tags.join(" #")),
            Style::default().fg(Color::Magenta),
        ));
    }
    if let Some(beat) = verse.beat_name.as_deref().filter(|b| !b.trim().is_empty()) {
        meta.push(Span::raw(format!("  ♪ {}", beat.trim())));
    }
    if verse.beat_link().is_some() {
        meta.push(Span::styled("  [link]", Style::default().fg(Color::Cyan)));
    }

    vec![
        Line::from(title),
        Line::from(Span::styled(
            verse.excerpt(EXCERPT_CHARS),
            Style::default().fg(Color::Gray),
        )),
        Line::from(meta),
    ]
}

pub(crate) fn draw_verse_form(
    frame: &mut Frame,
    area: Rect,
    edit: &Edit<VerseDraft>,
    saving: bool,
    form: &VerseForm,
) {
    let popup_area = centered_rect(90, 90, area);
    frame.render_widget(Clear, popup_area);

    let title = match (&edit.target, saving) {
        (_, true) => "Saving...",
        (Some(_), false) => "Edit Verse",
        (None, false) => "New Verse",
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner);

    let fields: Vec<VerseField> = VerseField::ALL
        .into_iter()
        .filter(|field| *field != VerseField::Lyrics)
        .collect();
    let mut lines: Vec<Line> = fields
        .iter()
        .map(|field| form.build_line(&edit.draft, *field))
        .collect();
    lines.push(Line::from(""));
    if let Some(error) = &edit.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter/Ctrl+S to save • Tab to switch • ←→ to change • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), columns[0]);

    let lyrics_active = form.active == VerseField::Lyrics;
    let lyrics_title = format!(
        "Lyrics · {} words · {} lines",
        edit.draft.word_count(),
        edit.draft.line_count()
    );
    let mut lyrics_block = Block::default().title(lyrics_title).borders(Borders::ALL);
    if lyrics_active {
        lyrics_block = lyrics_block.border_style(Style::default().fg(Color::Yellow));
    }
    let lyrics_inner = lyrics_block.inner(columns[1]);
    let lyrics = if edit.draft.lyrics.is_empty() {
        Paragraph::new(Span::styled("<required>", Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(edit.draft.lyrics.clone())
    };
    frame.render_widget(lyrics.block(lyrics_block), columns[1]);

    if saving {
        return;
    }
    if lyrics_active {
        let last_line = edit.draft.lyrics.split('\n').last().unwrap_or("");
        let row = to_column(edit.draft.lyrics.split('\n').count().saturating_sub(1));
        let cursor_x = lyrics_inner
            .x
            .saturating_add(to_column(last_line.chars().count()));
        let cursor_y = lyrics_inner
            .y
            .saturating_add(row.min(lyrics_inner.height.saturating_sub(1)));
        frame.set_cursor_position((cursor_x, cursor_y));
    } else if let Some(offset) = form.cursor_offset(&edit.draft) {
        let row = to_column(fields.iter().position(|field| *field == form.active).unwrap_or(0));
        frame.set_cursor_position((
            columns[0].x.saturating_add(offset),
            columns[0].y.saturating_add(row),
        ));
    }
}

pub(crate) fn draw_confirmation(frame: &mut Frame, area: Rect, confirmation: &Confirmation) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title("Confirm Deletion")
        .borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let question = match confirmation {
        Confirmation::Delete { title, .. } => format!("Delete \"{title}\"?"),
        Confirmation::BulkDelete { ids } => format!("Delete {} selected verses?", ids.len()),
    };
    let lines = vec![
        Line::from(question),
        Line::from("This cannot be undone."),
        Line::from(""),
        Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

pub(crate) fn draw_export_prompt(frame: &mut Frame, area: Rect, title: &str) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default().title("Export Verse").borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(format!("Export \"{title}\" as:")),
        Line::from(""),
        Line::from(vec![Span::styled("[t]", key), Span::raw(" Plain text")]),
        Line::from(vec![Span::styled("[m]", key), Span::raw(" Markdown")]),
        Line::from(vec![Span::styled("[j]", key), Span::raw(" JSON")]),
        Line::from(""),
        Line::from(Span::styled("Esc to cancel.", Style::default().fg(Color::Gray))),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Single-line input bar pinned to the top of `area`.
pub(crate) fn draw_input_bar(frame: &mut Frame, area: Rect, label: &str, query: &str) {
    let height = 3u16.min(area.height);
    let popup_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height,
    };
    frame.render_widget(Clear, popup_area);

    let block = Block::default().borders(Borders::ALL).title(label.to_string());
    let prefix = format!("{label}: ");
    let paragraph = Paragraph::new(Span::raw(format!("{prefix}{query}"))).block(block.clone());
    frame.render_widget(paragraph, popup_area);

    let inner = block.inner(popup_area);
    let cursor_x = inner
        .x
        .saturating_add(to_column(prefix.chars().count() + query.chars().count()));
    frame.set_cursor_position((cursor_x, inner.y));
}

pub(crate) fn draw_store(frame: &mut Frame, area: Rect, store: &Store) {
    let title = if store.is_loading() {
        "Products (loading...)"
    } else {
        "Products"
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if store.products().is_empty() {
        let text = if store.has_loaded() {
            "No products yet. Press '+' to add one."
        } else {
            "Loading products..."
        };
        let message = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(message, area);
        return;
    }

    let items: Vec<ListItem> = store
        .products()
        .iter()
        .map(|product| {
            let mut spans = vec![
                Span::styled(
                    product.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", format_currency(product.price)),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    format!(
                        "  {} · {}",
                        product.category.label(),
                        product.product_type.label()
                    ),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(format!("  stock {}", product.stock_quantity)),
            ];
            if !product.is_active {
                spans.push(Span::styled("  inactive", Style::default().fg(Color::Red)));
            }
            let mut lines = vec![Line::from(spans)];
            if !product.description.trim().is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {}", product.description.trim()),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(store.selected_index()));
    frame.render_stateful_widget(list, area, &mut state);
}

pub(crate) fn draw_product_form(
    frame: &mut Frame,
    area: Rect,
    edit: &Edit<ProductDraft>,
    saving: bool,
    form: &ProductForm,
) {
    let popup_area = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup_area);

    let title = if saving { "Saving..." } else { "Add Product" };
    let block = Block::default().title(title).borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let mut lines: Vec<Line> = ProductField::ALL
        .iter()
        .map(|field| form.build_line(&edit.draft, *field))
        .collect();
    lines.push(Line::from(""));
    if let Some(error) = &edit.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter to save • Tab to switch • ←→ to change • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

    if saving {
        return;
    }
    if let Some(offset) = form.cursor_offset(&edit.draft) {
        let row = ProductField::ALL
            .iter()
            .position(|field| *field == form.active)
            .map_or(0, to_column);
        frame.set_cursor_position((inner.x.saturating_add(offset), inner.y.saturating_add(row)));
    }
}

pub(crate) fn draw_analytics(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let snapshot = match dashboard.view() {
        DashboardView::Ready(snapshot) => snapshot,
        DashboardView::Failed => {
            let message = Paragraph::new(LOAD_ERROR_MESSAGE)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red))
                .block(Block::default().title("Analytics").borders(Borders::ALL));
            frame.render_widget(message, area);
            return;
        }
        DashboardView::NotLoaded | DashboardView::Loading => {
            let message = Paragraph::new("Loading analytics...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().title("Analytics").borders(Borders::ALL));
            frame.render_widget(message, area);
            return;
        }
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(8),
        ])
        .split(area);

    let stats = &snapshot.dashboard;
    let totals = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);
    let cards = [
        ("Verses", group_thousands(stats.total_verses)),
        ("Products", group_thousands(stats.total_products)),
        ("Orders", group_thousands(stats.total_orders)),
        ("Revenue", format_currency(stats.total_revenue)),
    ];
    for ((label, value), chunk) in cards.into_iter().zip(totals.iter()) {
        let card = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().title(label).borders(Borders::ALL));
        frame.render_widget(card, *chunk);
    }

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let verses = &snapshot.verses;
    let mut left = count_bars(&stats.verse_by_category, category_label);
    left.push(Line::from(""));
    left.push(Line::from(format!(
        "Complete: {} of {}",
        group_thousands(verses.complete_verses),
        group_thousands(verses.total_verses)
    )));
    left.push(Line::from(format!(
        "Words: {} (avg {:.1} per verse)",
        group_thousands(verses.total_words),
        verses.average_words
    )));
    if !verses.by_priority.is_empty() {
        left.push(Line::from(""));
        left.extend(count_bars(&verses.by_priority, capitalize));
    }
    if !verses.by_mood.is_empty() {
        left.push(Line::from(""));
        left.extend(count_bars(&verses.by_mood, capitalize));
    }
    let verse_title = if snapshot.legacy {
        "Verses (legacy stats)"
    } else {
        "Verses"
    };
    frame.render_widget(
        Paragraph::new(left).block(Block::default().title(verse_title).borders(Borders::ALL)),
        middle[0],
    );

    let max_revenue = stats
        .revenue_series
        .iter()
        .map(|point| point.revenue)
        .fold(0.0, f64::max);
    let mut right: Vec<Line> = stats
        .revenue_series
        .iter()
        .map(|point| {
            Line::from(vec![
                Span::raw(format!("{:<10} ", point.date)),
                Span::styled(
                    format!(
                        "{:<width$}",
                        bar(point.revenue, max_revenue, BAR_WIDTH),
                        width = BAR_WIDTH
                    ),
                    Style::default().fg(Color::Green),
                ),
                Span::raw(format!(" {}", format_currency(point.revenue))),
            ])
        })
        .collect();
    if right.is_empty() {
        right.push(Line::from(Span::styled(
            "No revenue recorded.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    if !stats.top_products.is_empty() {
        right.push(Line::from(""));
        right.push(Line::from(Span::styled(
            "Top products",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (rank, product) in stats.top_products.iter().enumerate() {
            right.push(Line::from(format!(
                "{}. {}  {} sold  {}",
                rank + 1,
                product.name,
                group_thousands(product.units_sold),
                format_currency(product.revenue)
            )));
        }
    }
    frame.render_widget(
        Paragraph::new(right).block(Block::default().title("Revenue").borders(Borders::ALL)),
        middle[1],
    );

    let activity: Vec<Line> = if stats.recent_activity.is_empty() {
        vec![Line::from(Span::styled(
            "No recent activity.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        stats
            .recent_activity
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<8} ", entry.kind),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(entry.description.clone()),
                    Span::styled(
                        entry
                            .timestamp
                            .as_deref()
                            .map(|ts| format!("  {ts}"))
                            .unwrap_or_default(),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };
    frame.render_widget(
        Paragraph::new(activity)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Recent Activity").borders(Borders::ALL)),
        rows[2],
    );
}

fn count_bars(counts: &BTreeMap<String, u64>, label: fn(&str) -> String) -> Vec<Line<'static>> {
    let max = counts.values().copied().max().unwrap_or(0) as f64;
    counts
        .iter()
        .map(|(key, count)| {
            Line::from(vec![
                Span::raw(format!("{:<16} ", label(key))),
                Span::styled(
                    format!(
                        "{:<width$}",
                        bar(*count as f64, max, BAR_WIDTH),
                        width = BAR_WIDTH
                    ),
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw(format!(" {count}")),
            ])
        })
        .collect()
}

fn category_label(key: &str) -> String {
    VerseCategory::ALL
        .into_iter()
        .find(|category| category.as_str() == key)
        .map(|category| category.label().to_string())
        .unwrap_or_else(|| key.to_string())
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
