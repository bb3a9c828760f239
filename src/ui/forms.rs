//! Keystroke handling for the two forms. The drafts live in the reducers; the
//! form only tracks focus and turns keys into field-change messages.

use crossterm::event::KeyCode;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use super::helpers::to_column;
use crate::store::{ProductDraft, ProductField, ProductValue, StoreMsg};
use crate::verses::{FieldValue, VerseDraft, VerseField, VerseMsg};

/// Focus within the verse form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VerseForm {
    pub(crate) active: VerseField,
}

impl Default for VerseForm {
    fn default() -> Self {
        Self {
            active: VerseField::Title,
        }
    }
}

impl VerseForm {
    /// Translate a key into a message for the verse manager. Focus changes are
    /// handled here and produce no message.
    pub(crate) fn handle_key(&mut self, code: KeyCode, draft: &VerseDraft) -> Option<VerseMsg> {
        match code {
            KeyCode::Esc => Some(VerseMsg::CancelEdit),
            KeyCode::Tab | KeyCode::Down => {
                self.active = self.active.step(true);
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.active = self.active.step(false);
                None
            }
            KeyCode::Enter if self.active.is_multiline() => self.append(draft, '\n'),
            KeyCode::Enter => Some(VerseMsg::SubmitRequested),
            KeyCode::Left => self.cycle(draft, false),
            KeyCode::Right => self.cycle(draft, true),
            KeyCode::Char(' ') if !self.active.is_text() => self.cycle(draft, true),
            KeyCode::Char(ch) => self.append(draft, ch),
            KeyCode::Backspace => {
                if !self.active.is_text() {
                    return None;
                }
                let mut text = draft.text(self.active);
                text.pop()?;
                Some(VerseMsg::FieldChanged(self.active, FieldValue::Text(text)))
            }
            _ => None,
        }
    }

    fn cycle(&self, draft: &VerseDraft, forward: bool) -> Option<VerseMsg> {
        let value = match self.active {
            VerseField::Category => FieldValue::Category(draft.category.cycle(forward)),
            VerseField::Priority => FieldValue::Priority(draft.priority.cycle(forward)),
            VerseField::Complete => FieldValue::Flag(!draft.is_complete),
            _ => return None,
        };
        Some(VerseMsg::FieldChanged(self.active, value))
    }

    fn append(&self, draft: &VerseDraft, ch: char) -> Option<VerseMsg> {
        if !self.active.is_text() || (ch.is_control() && ch != '\n') {
            return None;
        }
        if self.active == VerseField::Bpm && !ch.is_ascii_digit() {
            return None;
        }
        let mut text = draft.text(self.active);
        text.push(ch);
        Some(VerseMsg::FieldChanged(self.active, FieldValue::Text(text)))
    }

    /// Render one field row. Multiline values are flattened onto the line.
    pub(crate) fn build_line(&self, draft: &VerseDraft, field: VerseField) -> Line<'static> {
        let is_active = self.active == field;
        let value = match field {
            VerseField::Complete => {
                if draft.is_complete {
                    "[x] complete".to_string()
                } else {
                    "[ ] draft".to_string()
                }
            }
            VerseField::Category | VerseField::Priority if is_active => {
                format!("◀ {} ▶", draft.text(field))
            }
            _ if field.is_multiline() => draft.text(field).replace('\n', " ⏎ "),
            _ => draft.text(field),
        };
        field_line(field.label(), value, field.is_required(), is_active)
    }

    /// Column of the cursor after the label on single-line fields.
    pub(crate) fn cursor_offset(&self, draft: &VerseDraft) -> Option<u16> {
        if !self.active.is_text() || self.active.is_multiline() {
            return None;
        }
        let prefix = self.active.label().chars().count() + 2;
        Some(to_column(prefix + draft.text(self.active).chars().count()))
    }
}

/// Focus within the add-product form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProductForm {
    pub(crate) active: ProductField,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            active: ProductField::Name,
        }
    }
}

impl ProductForm {
    pub(crate) fn handle_key(&mut self, code: KeyCode, draft: &ProductDraft) -> Option<StoreMsg> {
        match code {
            KeyCode::Esc => Some(StoreMsg::CancelCreate),
            KeyCode::Tab | KeyCode::Down => {
                self.active = self.active.step(true);
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.active = self.active.step(false);
                None
            }
            KeyCode::Enter => Some(StoreMsg::SubmitRequested),
            KeyCode::Left => self.cycle(draft, false),
            KeyCode::Right => self.cycle(draft, true),
            KeyCode::Char(' ') if self.active.is_choice() => self.cycle(draft, true),
            KeyCode::Char(ch) => {
                if !self.accepts(ch) {
                    return None;
                }
                let mut text = draft.text(self.active);
                text.push(ch);
                Some(StoreMsg::FieldChanged(self.active, ProductValue::Text(text)))
            }
            KeyCode::Backspace => {
                if self.active.is_choice() {
                    return None;
                }
                let mut text = draft.text(self.active);
                text.pop()?;
                Some(StoreMsg::FieldChanged(self.active, ProductValue::Text(text)))
            }
            _ => None,
        }
    }

    fn accepts(&self, ch: char) -> bool {
        match self.active {
            ProductField::Category | ProductField::ProductType => false,
            ProductField::Price => ch.is_ascii_digit() || ch == '.',
            ProductField::StockQuantity => ch.is_ascii_digit(),
            _ => !ch.is_control(),
        }
    }

    fn cycle(&self, draft: &ProductDraft, forward: bool) -> Option<StoreMsg> {
        let value = match self.active {
            ProductField::Category => ProductValue::Category(draft.category.cycle(forward)),
            ProductField::ProductType => ProductValue::Type(draft.product_type.cycle(forward)),
            _ => return None,
        };
        Some(StoreMsg::FieldChanged(self.active, value))
    }

    pub(crate) fn build_line(&self, draft: &ProductDraft, field: ProductField) -> Line<'static> {
        let is_active = self.active == field;
        let value = if field.is_choice() && is_active {
            format!("◀ {} ▶", draft.text(field))
        } else {
            draft.text(field)
        };
        field_line(field.label(), value, field.is_required(), is_active)
    }

    pub(crate) fn cursor_offset(&self, draft: &ProductDraft) -> Option<u16> {
        if self.active.is_choice() {
            return None;
        }
        let prefix = self.active.label().chars().count() + 2;
        Some(to_column(prefix + draft.text(self.active).chars().count()))
    }
}

fn field_line(label: &str, value: String, required: bool, is_active: bool) -> Line<'static> {
    let empty = value.is_empty();
    let display = if empty {
        (if required { "<required>" } else { "<optional>" }).to_string()
    } else {
        value
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if empty {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(display, style),
    ])
}
