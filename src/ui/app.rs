use std::mem;
use std::path::PathBuf;

use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::analytics::{Dashboard, DashboardMsg};
use crate::api::ApiError;
use crate::models::{ExportFormat, ExportedVerse, Priority, VerseCategory};
use crate::state::{Notice, Outcome};
use crate::store::{Store, StoreMsg};
use crate::verses::{save_export, split_list, VerseFilters, VerseManager, VerseMsg};
use crate::worker::{Response, Worker};

use super::forms::{ProductForm, VerseForm};
use super::helpers::{key_hint, notice_style};
use super::screens::{
    draw_analytics, draw_confirmation, draw_export_prompt, draw_input_bar, draw_product_form,
    draw_store, draw_verse_form, draw_verses,
};
use super::sidebar::{draw_sidebar, Section};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const SIDEBAR_WIDTH: u16 = 24;

/// Modes owned by the shell rather than by a reducer.
enum Mode {
    Normal,
    Filtering(FilterInput),
    Exporting { id: String, title: String },
}

/// Which filter an input bar is editing.
enum FilterTarget {
    Search,
    Tags,
}

struct FilterInput {
    target: FilterTarget,
    query: String,
}

impl FilterTarget {
    fn label(&self) -> &'static str {
        match self {
            FilterTarget::Search => "Search",
            FilterTarget::Tags => "Tags",
        }
    }
}

/// Central application state: the active section, the three components, and
/// the worker that runs their requests.
pub struct App {
    section: Section,
    verses: VerseManager,
    store: Store,
    dashboard: Dashboard,
    worker: Worker,
    mode: Mode,
    verse_form: VerseForm,
    product_form: ProductForm,
    status: Option<Notice>,
    export_dir: PathBuf,
}

impl App {
    /// Build the shell and mount the initial section.
    pub fn new(worker: Worker, export_dir: PathBuf) -> Self {
        let mut app = Self {
            section: Section::default(),
            verses: VerseManager::new(),
            store: Store::new(),
            dashboard: Dashboard::new(),
            worker,
            mode: Mode::Normal,
            verse_form: VerseForm::default(),
            product_form: ProductForm::default(),
            status: None,
            export_dir,
        };
        app.mount(Section::default());
        app
    }

    /// Switch to `section`; the component fetches its own data on mount.
    fn mount(&mut self, section: Section) {
        self.section = section;
        self.mode = Mode::Normal;
        info!(section = section.label(), "mounting section");
        let outcome = match section {
            Section::Verses => self.verses.update(VerseMsg::Mounted),
            Section::Store => self.store.update(StoreMsg::Mounted),
            Section::Analytics => self.dashboard.update(DashboardMsg::Mounted),
        };
        self.apply(outcome);
    }

    /// Hand requests to the worker and surface the notice, if any.
    fn apply(&mut self, outcome: Outcome) {
        for request in outcome.requests {
            self.worker.send(request);
        }
        if let Some(notice) = outcome.notice {
            self.status = Some(notice);
        }
    }

    /// Route every response that arrived since the last tick.
    pub fn process_responses(&mut self) {
        for response in self.worker.drain() {
            self.handle_response(response);
        }
    }

    fn handle_response(&mut self, response: Response) {
        let outcome = match response {
            Response::VersesListed { ticket, result } => {
                self.verses.update(VerseMsg::ListLoaded { ticket, result })
            }
            Response::VerseSaved(Ok(verse)) => {
                self.verses.update(VerseMsg::SubmitSucceeded(verse))
            }
            Response::VerseSaved(Err(err)) => self.verses.update(VerseMsg::SubmitFailed(err)),
            Response::VersesDeleted { ids, bulk, result } => {
                self.verses.update(VerseMsg::DeleteFinished { ids, bulk, result })
            }
            Response::VerseExported(result) => self.finish_export(result),
            Response::ProductsListed { ticket, result } => {
                self.store.update(StoreMsg::Loaded { ticket, result })
            }
            Response::ProductCreated(Ok(product)) => {
                self.store.update(StoreMsg::SubmitSucceeded(product))
            }
            Response::ProductCreated(Err(err)) => self.store.update(StoreMsg::SubmitFailed(err)),
            Response::AnalyticsLoaded { ticket, result } => {
                self.dashboard.update(DashboardMsg::Loaded { ticket, result })
            }
        };
        self.apply(outcome);
    }

    fn finish_export(&mut self, result: Result<ExportedVerse, ApiError>) -> Outcome {
        let exported = match result {
            Ok(exported) => exported,
            Err(err) => {
                warn!(error = %err, "export failed");
                return Outcome::notice(Notice::error(format!("Export failed: {err}")));
            }
        };
        match save_export(&self.export_dir, &exported) {
            Ok(path) => Outcome::notice(Notice::info(format!("Exported to {}", path.display()))),
            Err(err) => {
                warn!(error = %err, dir = %self.export_dir.display(), "writing export failed");
                Outcome::notice(Notice::error(format!("Could not write export: {err}")))
            }
        }
    }

    /// Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Filtering(input) => self.mode = self.handle_filter_input(code, input),
            Mode::Exporting { id, title } => self.mode = self.handle_export_choice(code, id, title),
            Mode::Normal => match self.section {
                Section::Verses if self.verses.confirmation().is_some() => {
                    self.handle_confirmation(code)
                }
                Section::Verses if !self.verses.editor().is_idle() => self.handle_verse_form(code),
                Section::Store if !self.store.editor().is_idle() => self.handle_product_form(code),
                _ => return self.handle_normal_key(code),
            },
        }
        false
    }

    /// Ctrl+S saves whichever form is open.
    pub(crate) fn handle_ctrl_s(&mut self) {
        let outcome = match self.section {
            Section::Verses if !self.verses.editor().is_idle() => {
                self.verses.update(VerseMsg::SubmitRequested)
            }
            Section::Store if !self.store.editor().is_idle() => {
                self.store.update(StoreMsg::SubmitRequested)
            }
            _ => return,
        };
        self.apply(outcome);
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => {
                self.mount(self.section.next());
                return false;
            }
            KeyCode::Char(ch) => {
                if let Some(section) = Section::from_hotkey(ch) {
                    self.mount(section);
                    return false;
                }
            }
            _ => {}
        }

        match self.section {
            Section::Verses => self.handle_verses_key(code),
            Section::Store => self.handle_store_key(code),
            Section::Analytics => {
                if code == KeyCode::Char('r') {
                    let outcome = self.dashboard.update(DashboardMsg::Mounted);
                    self.apply(outcome);
                }
            }
        }
        false
    }

    fn handle_verses_key(&mut self, code: KeyCode) {
        let current = self.verses.current_verse().cloned();
        let outcome = match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.verses.move_selection(-1);
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.verses.move_selection(1);
                return;
            }
            KeyCode::Home => {
                self.verses.select_first();
                return;
            }
            KeyCode::End => {
                self.verses.select_last();
                return;
            }
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.mode = Mode::Filtering(FilterInput {
                    target: FilterTarget::Search,
                    query: self.verses.filters().search.clone(),
                });
                return;
            }
            KeyCode::Char('g') => {
                self.mode = Mode::Filtering(FilterInput {
                    target: FilterTarget::Tags,
                    query: self.verses.filters().tags.join(", "),
                });
                return;
            }
            KeyCode::Char('c') => {
                let mut filters = self.verses.filters().clone();
                filters.category =
                    cycle_optional(filters.category, |c| c.cycle(true), &VerseCategory::ALL);
                self.verses.update(VerseMsg::FiltersChanged(filters))
            }
            KeyCode::Char('p') => {
                let mut filters = self.verses.filters().clone();
                filters.priority =
                    cycle_optional(filters.priority, |p| p.cycle(true), &Priority::ALL);
                self.verses.update(VerseMsg::FiltersChanged(filters))
            }
            KeyCode::Char('x') if self.verses.filters().is_active() => {
                self.verses
                    .update(VerseMsg::FiltersChanged(VerseFilters::default()))
                    .with_notice(Notice::info("Filters cleared."))
            }
            KeyCode::Char('o') => {
                let mut sort = self.verses.sort();
                sort.field = sort.field.next();
                self.verses.update(VerseMsg::SortChanged(sort))
            }
            KeyCode::Char('O') => {
                let mut sort = self.verses.sort();
                sort.order = sort.order.flip();
                self.verses.update(VerseMsg::SortChanged(sort))
            }
            KeyCode::Char('n') | KeyCode::Char('+') => {
                self.verse_form = VerseForm::default();
                self.verses.update(VerseMsg::StartEdit(None))
            }
            KeyCode::Char('e') => match current {
                Some(verse) => {
                    self.verse_form = VerseForm::default();
                    self.verses.update(VerseMsg::StartEdit(Some(verse)))
                }
                None => Outcome::notice(Notice::error("No verse selected to edit.")),
            },
            KeyCode::Char('-') | KeyCode::Delete => match current {
                Some(verse) => self.verses.update(VerseMsg::DeleteRequested(verse.id)),
                None => Outcome::notice(Notice::error("No verse selected.")),
            },
            KeyCode::Char('b') => {
                let outcome = self.verses.update(VerseMsg::BulkModeToggled);
                let text = if self.verses.bulk_mode() {
                    "Bulk mode on. Space selects, D deletes."
                } else {
                    "Bulk mode off."
                };
                outcome.with_notice(Notice::info(text))
            }
            KeyCode::Char(' ') => match current {
                Some(verse) if self.verses.bulk_mode() => {
                    self.verses.update(VerseMsg::SelectionToggled(verse.id))
                }
                Some(_) => Outcome::notice(Notice::error("Press 'b' to enter bulk mode first.")),
                None => Outcome::none(),
            },
            KeyCode::Char('D') => self.verses.update(VerseMsg::BulkDeleteRequested),
            KeyCode::Char('s') => match current {
                Some(verse) => {
                    self.mode = Mode::Exporting {
                        id: verse.id,
                        title: verse.title,
                    };
                    return;
                }
                None => Outcome::notice(Notice::error("No verse selected to export.")),
            },
            KeyCode::Enter => match current {
                Some(verse) => open_beat_link(verse.beat_link()),
                None => Outcome::none(),
            },
            KeyCode::Char('r') => self.verses.update(VerseMsg::Mounted),
            _ => return,
        };
        self.apply(outcome);
    }

    fn handle_store_key(&mut self, code: KeyCode) {
        let outcome = match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.store.move_selection(-1);
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.store.move_selection(1);
                return;
            }
            KeyCode::Char('+') | KeyCode::Char('n') => {
                self.product_form = ProductForm::default();
                self.store.update(StoreMsg::StartCreate)
            }
            KeyCode::Char('r') => self.store.update(StoreMsg::Mounted),
            _ => return,
        };
        self.apply(outcome);
    }

    fn handle_confirmation(&mut self, code: KeyCode) {
        let msg = match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => VerseMsg::ConfirmAccepted,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => VerseMsg::ConfirmDismissed,
            _ => return,
        };
        let outcome = self.verses.update(msg);
        self.apply(outcome);
    }

    fn handle_verse_form(&mut self, code: KeyCode) {
        let Some(edit) = self.verses.editor().current() else {
            return;
        };
        if let Some(msg) = self.verse_form.handle_key(code, &edit.draft) {
            let outcome = self.verses.update(msg);
            self.apply(outcome);
        }
    }

    fn handle_product_form(&mut self, code: KeyCode) {
        let Some(edit) = self.store.editor().current() else {
            return;
        };
        if let Some(msg) = self.product_form.handle_key(code, &edit.draft) {
            let outcome = self.store.update(msg);
            self.apply(outcome);
        }
    }

    fn handle_filter_input(&mut self, code: KeyCode, mut input: FilterInput) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Enter => {
                let mut filters = self.verses.filters().clone();
                match input.target {
                    FilterTarget::Search => filters.search = input.query.trim().to_string(),
                    FilterTarget::Tags => filters.tags = split_list(&input.query),
                }
                let outcome = self.verses.update(VerseMsg::FiltersChanged(filters));
                self.apply(outcome);
                Mode::Normal
            }
            KeyCode::Backspace => {
                input.query.pop();
                Mode::Filtering(input)
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                input.query.push(ch);
                Mode::Filtering(input)
            }
            _ => Mode::Filtering(input),
        }
    }

    fn handle_export_choice(&mut self, code: KeyCode, id: String, title: String) -> Mode {
        let format = match code {
            KeyCode::Char('t') => ExportFormat::Text,
            KeyCode::Char('m') => ExportFormat::Markdown,
            KeyCode::Char('j') => ExportFormat::Json,
            KeyCode::Esc => return Mode::Normal,
            _ => return Mode::Exporting { id, title },
        };
        let outcome = self
            .verses
            .update(VerseMsg::ExportRequested { id, format })
            .with_notice(Notice::info(format!("Exporting \"{title}\"...")));
        self.apply(outcome);
        Mode::Normal
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (main_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(main_area);
        draw_sidebar(frame, columns[0], self.section);

        let content_area = inner_content(columns[1]);
        match self.section {
            Section::Verses => draw_verses(frame, content_area, &self.verses),
            Section::Store => draw_store(frame, content_area, &self.store),
            Section::Analytics => draw_analytics(frame, content_area, &self.dashboard),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match (&self.mode, self.section) {
            (Mode::Filtering(input), _) => {
                draw_input_bar(frame, content_area, input.target.label(), &input.query)
            }
            (Mode::Exporting { title, .. }, _) => draw_export_prompt(frame, area, title),
            (Mode::Normal, Section::Verses) => {
                if let Some(confirmation) = self.verses.confirmation() {
                    draw_confirmation(frame, area, confirmation);
                } else if let Some(edit) = self.verses.editor().current() {
                    let saving = self.verses.editor().is_saving();
                    draw_verse_form(frame, area, edit, saving, &self.verse_form);
                }
            }
            (Mode::Normal, Section::Store) => {
                if let Some(edit) = self.store.editor().current() {
                    let saving = self.store.editor().is_saving();
                    draw_product_form(frame, area, edit, saving, &self.product_form);
                }
            }
            (Mode::Normal, Section::Analytics) => {}
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), notice_style(status.kind))])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&str, &str)] = match (&self.mode, self.section) {
            (Mode::Filtering(_), _) => &[("Enter", "Apply"), ("Esc", "Cancel")],
            (Mode::Exporting { .. }, _) => &[("t/m/j", "Format"), ("Esc", "Cancel")],
            (Mode::Normal, Section::Verses) if self.verses.confirmation().is_some() => {
                &[("Y", "Confirm"), ("N", "Cancel")]
            }
            (Mode::Normal, Section::Verses) if !self.verses.editor().is_idle() => &[
                ("Tab", "Next Field"),
                ("Ctrl+S", "Save"),
                ("Esc", "Cancel"),
            ],
            (Mode::Normal, Section::Store) if !self.store.editor().is_idle() => {
                &[("Tab", "Next Field"), ("Enter", "Save"), ("Esc", "Cancel")]
            }
            (Mode::Normal, Section::Verses) if self.verses.bulk_mode() => &[
                ("Space", "Select"),
                ("D", "Delete Selected"),
                ("b", "Exit Bulk"),
                ("q", "Quit"),
            ],
            (Mode::Normal, Section::Verses) => &[
                ("↑↓", "Navigate"),
                ("n", "New"),
                ("e", "Edit"),
                ("-", "Delete"),
                ("f", "Search"),
                ("g", "Tags"),
                ("c/p", "Category/Priority"),
                ("o/O", "Sort"),
                ("b", "Bulk"),
                ("s", "Export"),
                ("Enter", "Open Beat"),
                ("Tab", "Section"),
                ("q", "Quit"),
            ],
            (Mode::Normal, Section::Store) => &[
                ("↑↓", "Navigate"),
                ("+", "Add Product"),
                ("r", "Reload"),
                ("Tab", "Section"),
                ("q", "Quit"),
            ],
            (Mode::Normal, Section::Analytics) => {
                &[("r", "Reload"), ("Tab", "Section"), ("q", "Quit")]
            }
        };
        Line::from(
            hints
                .iter()
                .flat_map(|(key, action)| key_hint(key, action))
                .collect::<Vec<_>>(),
        )
    }
}

fn inner_content(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        width: area.width.saturating_sub(1),
        ..area
    }
}

/// Step an optional filter through every value in turn, then back to `None`.
fn cycle_optional<T: Copy + PartialEq>(
    current: Option<T>,
    next: impl Fn(T) -> T,
    all: &[T],
) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => {
            let following = next(value);
            if all.first() == Some(&following) {
                None
            } else {
                Some(following)
            }
        }
    }
}

fn open_beat_link(link: Option<&str>) -> Outcome {
    let Some(link) = link else {
        return Outcome::notice(Notice::error("This verse has no beat link."));
    };
    match open_link(link) {
        Ok(()) => Outcome::notice(Notice::info(format!("Opened {link}"))),
        Err(err) => {
            warn!(error = %err, link, "opening beat link failed");
            Outcome::notice(Notice::error(format!("Could not open link: {err}")))
        }
    }
}
