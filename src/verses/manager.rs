use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::draft::{FieldValue, VerseDraft, VerseField};
use super::filter::{VerseFilters, VerseSort};
use crate::api::ApiError;
use crate::models::{ExportFormat, Verse};
use crate::state::{EditPhase, Notice, Outcome, Sequencer};
use crate::worker::Request;

/// Every transition the verse manager understands.
#[derive(Debug, Clone, PartialEq)]
pub enum VerseMsg {
    /// The section became visible; fetch with the current parameters.
    Mounted,
    FiltersChanged(VerseFilters),
    SortChanged(VerseSort),
    ListLoaded {
        ticket: u64,
        result: Result<Vec<Verse>, ApiError>,
    },
    /// Open the form on a record, or on a blank template with `None`.
    StartEdit(Option<Verse>),
    FieldChanged(VerseField, FieldValue),
    CancelEdit,
    SubmitRequested,
    SubmitSucceeded(Verse),
    SubmitFailed(ApiError),
    DeleteRequested(String),
    BulkModeToggled,
    SelectionToggled(String),
    BulkDeleteRequested,
    ConfirmAccepted,
    ConfirmDismissed,
    DeleteFinished {
        ids: Vec<String>,
        bulk: bool,
        result: Result<(), ApiError>,
    },
    ExportRequested {
        id: String,
        format: ExportFormat,
    },
}

/// Pending destructive action awaiting an explicit yes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Delete { id: String, title: String },
    BulkDelete { ids: Vec<String> },
}

/// Verse list, filter/sort parameters, bulk selection, and the edit form.
///
/// The list is never patched locally: every acknowledged mutation triggers a
/// full re-fetch. That costs a round trip per change but keeps the view equal
/// to what the backend holds.
#[derive(Debug, Default)]
pub struct VerseManager {
    verses: Vec<Verse>,
    filters: VerseFilters,
    sort: VerseSort,
    editor: EditPhase<VerseDraft>,
    bulk_mode: bool,
    selection: BTreeSet<String>,
    confirmation: Option<Confirmation>,
    tickets: Sequencer,
    loading: bool,
    loaded: bool,
    selected: usize,
}

impl VerseManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, msg: VerseMsg) -> Outcome {
        match msg {
            VerseMsg::Mounted => self.refresh(),
            VerseMsg::FiltersChanged(filters) => {
                self.filters = filters;
                self.refresh()
            }
            VerseMsg::SortChanged(sort) => {
                self.sort = sort;
                self.sort.apply(&mut self.verses);
                self.refresh()
            }
            VerseMsg::ListLoaded { ticket, result } => self.apply_list(ticket, result),
            VerseMsg::StartEdit(verse) => self.start_edit(verse),
            VerseMsg::FieldChanged(field, value) => {
                if let Some(edit) = self.editor.editing_mut() {
                    if edit.draft.set(field, value) {
                        edit.error = None;
                    }
                }
                Outcome::none()
            }
            VerseMsg::CancelEdit => {
                if self.editor.cancel() {
                    Outcome::notice(Notice::info("Edit cancelled."))
                } else {
                    Outcome::none()
                }
            }
            VerseMsg::SubmitRequested => self.submit(),
            VerseMsg::SubmitSucceeded(verse) => {
                if !self.editor.save_succeeded() {
                    return Outcome::none();
                }
                info!(id = %verse.id, version = verse.version, "verse saved");
                self.refresh()
                    .with_notice(Notice::info(format!("Saved \"{}\".", verse.title)))
            }
            VerseMsg::SubmitFailed(err) => {
                warn!(error = %err, "saving verse failed");
                let message = err.to_string();
                self.editor.save_failed(message.clone());
                Outcome::notice(Notice::error(message))
            }
            VerseMsg::DeleteRequested(id) => self.request_delete(id),
            VerseMsg::BulkModeToggled => {
                self.bulk_mode = !self.bulk_mode;
                if !self.bulk_mode {
                    self.selection.clear();
                }
                Outcome::none()
            }
            VerseMsg::SelectionToggled(id) => {
                if self.bulk_mode && !self.selection.remove(&id) {
                    self.selection.insert(id);
                }
                Outcome::none()
            }
            VerseMsg::BulkDeleteRequested => self.request_bulk_delete(),
            VerseMsg::ConfirmAccepted => self.confirm(),
            VerseMsg::ConfirmDismissed => {
                if self.confirmation.take().is_some() {
                    Outcome::notice(Notice::info("Deletion cancelled."))
                } else {
                    Outcome::none()
                }
            }
            VerseMsg::DeleteFinished { ids, bulk, result } => self.finish_delete(ids, bulk, result),
            VerseMsg::ExportRequested { id, format } => {
                Outcome::request(Request::ExportVerse { id, format })
            }
        }
    }

    /// Issue a list request with a fresh ticket.
    fn refresh(&mut self) -> Outcome {
        let ticket = self.tickets.next();
        self.loading = true;
        debug!(ticket, "requesting verse list");
        Outcome::request(Request::ListVerses {
            ticket,
            filters: self.filters.clone(),
            sort: self.sort,
        })
    }

    fn apply_list(&mut self, ticket: u64, result: Result<Vec<Verse>, ApiError>) -> Outcome {
        if !self.tickets.is_current(ticket) {
            debug!(ticket, "dropping stale verse list response");
            return Outcome::none();
        }
        self.loading = false;

        match result {
            Ok(verses) => {
                let mut visible: Vec<Verse> = verses
                    .into_iter()
                    .filter(|verse| self.filters.matches(verse))
                    .collect();
                self.sort.apply(&mut visible);
                self.verses = visible;
                // Bulk deletion only ever targets verses on screen.
                let verses = &self.verses;
                self.selection.retain(|id| verses.iter().any(|verse| &verse.id == id));
                self.loaded = true;
                self.ensure_in_bounds();
                Outcome::none()
            }
            Err(err) => {
                warn!(error = %err, "fetching verses failed");
                Outcome::notice(Notice::error(format!("Could not load verses: {err}")))
            }
        }
    }

    fn start_edit(&mut self, verse: Option<Verse>) -> Outcome {
        let (target, draft) = match verse {
            Some(verse) => (Some(verse.id.clone()), VerseDraft::from_verse(&verse)),
            None => (None, VerseDraft::default()),
        };
        if self.editor.start(target, draft) {
            Outcome::none()
        } else {
            Outcome::notice(Notice::error("Wait for the current save to finish."))
        }
    }

    fn submit(&mut self) -> Outcome {
        let (target, payload) = {
            let Some(edit) = self.editor.current() else {
                return Outcome::none();
            };
            if self.editor.is_saving() {
                return Outcome::none();
            }
            match edit.draft.to_payload() {
                Ok(payload) => (edit.target.clone(), payload),
                Err(err) => {
                    let message = err.to_string();
                    self.editor.reject(message.clone());
                    return Outcome::notice(Notice::error(message));
                }
            }
        };

        self.editor.begin_save();
        Outcome::request(Request::SaveVerse { target, payload })
            .with_notice(Notice::info("Saving verse..."))
    }

    fn request_delete(&mut self, id: String) -> Outcome {
        let Some(verse) = self.verses.iter().find(|verse| verse.id == id) else {
            return Outcome::notice(Notice::error("That verse is no longer listed."));
        };
        self.confirmation = Some(Confirmation::Delete {
            title: verse.title.clone(),
            id,
        });
        Outcome::none()
    }

    fn request_bulk_delete(&mut self) -> Outcome {
        if !self.bulk_mode {
            return Outcome::notice(Notice::error("Enable bulk mode to select verses."));
        }
        if self.selection.is_empty() {
            return Outcome::notice(Notice::error("No verses selected."));
        }
        self.confirmation = Some(Confirmation::BulkDelete {
            ids: self.selection.iter().cloned().collect(),
        });
        Outcome::none()
    }

    fn confirm(&mut self) -> Outcome {
        match self.confirmation.take() {
            Some(Confirmation::Delete { id, .. }) => Outcome::request(Request::DeleteVerse { id }),
            Some(Confirmation::BulkDelete { ids }) => {
                Outcome::request(Request::BulkDeleteVerses { ids })
            }
            None => Outcome::none(),
        }
    }

    fn finish_delete(
        &mut self,
        ids: Vec<String>,
        bulk: bool,
        result: Result<(), ApiError>,
    ) -> Outcome {
        if let Err(err) = result {
            warn!(error = %err, count = ids.len(), "deleting verses failed");
            return Outcome::notice(Notice::error(format!("Delete failed: {err}")));
        }

        let editing_deleted = self
            .editor
            .current()
            .and_then(|edit| edit.target.as_ref())
            .is_some_and(|target| ids.contains(target));
        if editing_deleted {
            self.editor.cancel();
        }

        let notice = if bulk {
            self.selection.clear();
            self.bulk_mode = false;
            Notice::info(format!("Deleted {} verses.", ids.len()))
        } else {
            for id in &ids {
                self.selection.remove(id);
            }
            Notice::info("Verse deleted.")
        };
        info!(count = ids.len(), bulk, "verses deleted");

        self.refresh().with_notice(notice)
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn filters(&self) -> &VerseFilters {
        &self.filters
    }

    pub fn sort(&self) -> VerseSort {
        self.sort
    }

    pub fn editor(&self) -> &EditPhase<VerseDraft> {
        &self.editor
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    pub fn bulk_mode(&self) -> bool {
        self.bulk_mode
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn current_verse(&self) -> Option<&Verse> {
        self.verses.get(self.selected)
    }

    pub fn move_selection(&mut self, offset: isize) {
        if self.verses.is_empty() {
            return;
        }
        let len = self.verses.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.verses.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.verses.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.verses.len() {
            self.selected = self.verses.len() - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VerseCategory;

    fn verse(id: &str, title: &str) -> Verse {
        Verse {
            id: id.to_string(),
            title: title.to_string(),
            lyrics: format!("{title} lyrics"),
            ..Verse::default()
        }
    }

    fn list_ticket(outcome: &Outcome) -> u64 {
        match outcome.requests.as_slice() {
            [Request::ListVerses { ticket, .. }] => *ticket,
            other => panic!("expected a single list request, got {other:?}"),
        }
    }

    fn loaded(verses: Vec<Verse>) -> VerseManager {
        let mut manager = VerseManager::new();
        let ticket = list_ticket(&manager.update(VerseMsg::Mounted));
        manager.update(VerseMsg::ListLoaded {
            ticket,
            result: Ok(verses),
        });
        manager
    }

    #[test]
    fn stale_list_response_is_ignored() {
        let mut manager = VerseManager::new();
        let first = list_ticket(&manager.update(VerseMsg::Mounted));
        let second = list_ticket(&manager.update(VerseMsg::FiltersChanged(VerseFilters {
            search: "moon".to_string(),
            ..VerseFilters::default()
        })));

        manager.update(VerseMsg::ListLoaded {
            ticket: second,
            result: Ok(vec![verse("a", "Moon")]),
        });
        manager.update(VerseMsg::ListLoaded {
            ticket: first,
            result: Ok(vec![verse("a", "Moon"), verse("b", "Sun")]),
        });

        assert_eq!(manager.verses().len(), 1);
        assert!(!manager.is_loading());
    }

    #[test]
    fn client_side_filter_applies_to_response() {
        let mut manager = VerseManager::new();
        let ticket = list_ticket(&manager.update(VerseMsg::FiltersChanged(VerseFilters {
            category: Some(VerseCategory::Hooks),
            ..VerseFilters::default()
        })));
        let mut hook = verse("h", "Hook");
        hook.category = VerseCategory::Hooks;
        manager.update(VerseMsg::ListLoaded {
            ticket,
            result: Ok(vec![hook, verse("f", "Free")]),
        });
        assert_eq!(manager.verses().len(), 1);
        assert_eq!(manager.verses()[0].id, "h");
    }

    #[test]
    fn failed_fetch_keeps_previous_list() {
        let mut manager = loaded(vec![verse("a", "Keep")]);
        let ticket = list_ticket(&manager.update(VerseMsg::Mounted));
        let outcome = manager.update(VerseMsg::ListLoaded {
            ticket,
            result: Err(ApiError::Transport("refused".to_string())),
        });
        assert_eq!(manager.verses().len(), 1);
        assert!(outcome.notice.is_some());
    }

    #[test]
    fn empty_title_sends_nothing() {
        let mut manager = VerseManager::new();
        manager.update(VerseMsg::StartEdit(None));
        manager.update(VerseMsg::FieldChanged(
            VerseField::Lyrics,
            FieldValue::Text("bars".to_string()),
        ));
        let outcome = manager.update(VerseMsg::SubmitRequested);

        assert!(outcome.requests.is_empty());
        let edit = manager.editor().current().unwrap();
        assert_eq!(edit.error.as_deref(), Some("Title is required."));
        assert!(!manager.editor().is_saving());
    }

    #[test]
    fn submit_updates_when_a_record_is_selected() {
        let original = verse("v1", "Old");
        let mut manager = loaded(vec![original.clone()]);
        manager.update(VerseMsg::StartEdit(Some(original)));
        manager.update(VerseMsg::FieldChanged(
            VerseField::Title,
            FieldValue::Text("New".to_string()),
        ));
        let outcome = manager.update(VerseMsg::SubmitRequested);

        match outcome.requests.as_slice() {
            [Request::SaveVerse { target, payload }] => {
                assert_eq!(target.as_deref(), Some("v1"));
                assert_eq!(payload.title, "New");
            }
            other => panic!("unexpected requests {other:?}"),
        }
        assert!(manager.editor().is_saving());
        // The cached record is untouched until the backend acknowledges.
        assert_eq!(manager.verses()[0].title, "Old");
    }

    #[test]
    fn second_submit_while_saving_is_ignored() {
        let mut manager = VerseManager::new();
        manager.update(VerseMsg::StartEdit(Some(verse("v1", "T"))));
        assert_eq!(manager.update(VerseMsg::SubmitRequested).requests.len(), 1);
        assert!(manager.update(VerseMsg::SubmitRequested).requests.is_empty());
    }

    #[test]
    fn success_clears_draft_and_refreshes() {
        let mut manager = VerseManager::new();
        manager.update(VerseMsg::StartEdit(Some(verse("v1", "T"))));
        manager.update(VerseMsg::SubmitRequested);
        let outcome = manager.update(VerseMsg::SubmitSucceeded(verse("v1", "T")));

        assert!(manager.editor().is_idle());
        assert!(matches!(
            outcome.requests.as_slice(),
            [Request::ListVerses { .. }]
        ));
    }

    #[test]
    fn failure_keeps_draft_for_retry() {
        let mut manager = VerseManager::new();
        manager.update(VerseMsg::StartEdit(Some(verse("v1", "T"))));
        manager.update(VerseMsg::FieldChanged(
            VerseField::Mood,
            FieldValue::Text("gritty".to_string()),
        ));
        manager.update(VerseMsg::SubmitRequested);
        let outcome = manager.update(VerseMsg::SubmitFailed(ApiError::Status {
            status: 500,
            body: "boom".to_string(),
        }));

        let EditPhase::Editing(edit) = manager.editor() else {
            panic!("expected the form to stay open");
        };
        assert_eq!(edit.draft.mood, "gritty");
        assert!(edit.error.is_some());
        assert!(outcome.requests.is_empty());
    }

    #[test]
    fn cancel_and_reopen_reproduces_the_draft() {
        let mut record = verse("v1", "Loop");
        record.tags = vec!["a".to_string()];
        record.key = Some("Am".to_string());
        let mut manager = loaded(vec![record.clone()]);

        manager.update(VerseMsg::StartEdit(Some(record.clone())));
        let first = manager.editor().current().unwrap().draft.clone();
        manager.update(VerseMsg::FieldChanged(
            VerseField::Key,
            FieldValue::Text("C".to_string()),
        ));
        manager.update(VerseMsg::CancelEdit);
        manager.update(VerseMsg::StartEdit(Some(record)));

        assert_eq!(manager.editor().current().unwrap().draft, first);
    }

    #[test]
    fn deleting_unselected_verse_keeps_selection() {
        let mut manager = loaded(vec![verse("a", "A"), verse("b", "B"), verse("c", "C")]);
        manager.update(VerseMsg::BulkModeToggled);
        manager.update(VerseMsg::SelectionToggled("a".to_string()));
        manager.update(VerseMsg::SelectionToggled("b".to_string()));

        manager.update(VerseMsg::DeleteRequested("c".to_string()));
        let outcome = manager.update(VerseMsg::ConfirmAccepted);
        assert_eq!(
            outcome.requests,
            vec![Request::DeleteVerse {
                id: "c".to_string()
            }]
        );
        manager.update(VerseMsg::DeleteFinished {
            ids: vec!["c".to_string()],
            bulk: false,
            result: Ok(()),
        });

        let selected: Vec<_> = manager.selection().iter().cloned().collect();
        assert_eq!(selected, ["a", "b"]);
        assert!(manager.bulk_mode());
    }

    #[test]
    fn narrowing_filters_drops_hidden_verses_from_selection() {
        let mut manager = loaded(vec![verse("a", "Alpha"), verse("b", "Beta")]);
        manager.update(VerseMsg::BulkModeToggled);
        manager.update(VerseMsg::SelectionToggled("a".to_string()));
        manager.update(VerseMsg::SelectionToggled("b".to_string()));

        let filters = VerseFilters {
            search: "alpha".to_string(),
            ..VerseFilters::default()
        };
        let ticket = list_ticket(&manager.update(VerseMsg::FiltersChanged(filters)));
        manager.update(VerseMsg::ListLoaded {
            ticket,
            result: Ok(vec![verse("a", "Alpha"), verse("b", "Beta")]),
        });

        let selected: Vec<_> = manager.selection().iter().cloned().collect();
        assert_eq!(selected, ["a"]);
        manager.update(VerseMsg::BulkDeleteRequested);
        assert_eq!(
            manager.confirmation(),
            Some(&Confirmation::BulkDelete {
                ids: vec!["a".to_string()]
            })
        );
    }

    #[test]
    fn deleting_the_edited_verse_resets_the_form() {
        let record = verse("a", "A");
        let mut manager = loaded(vec![record.clone()]);
        manager.update(VerseMsg::StartEdit(Some(record)));
        manager.update(VerseMsg::DeleteFinished {
            ids: vec!["a".to_string()],
            bulk: false,
            result: Ok(()),
        });
        assert!(manager.editor().is_idle());
    }

    #[test]
    fn bulk_delete_needs_confirmation_and_clears_selection() {
        let mut manager = loaded(vec![verse("a", "A"), verse("b", "B")]);
        manager.update(VerseMsg::BulkModeToggled);
        manager.update(VerseMsg::SelectionToggled("b".to_string()));
        manager.update(VerseMsg::SelectionToggled("a".to_string()));

        let outcome = manager.update(VerseMsg::BulkDeleteRequested);
        assert!(outcome.requests.is_empty());
        assert_eq!(
            manager.confirmation(),
            Some(&Confirmation::BulkDelete {
                ids: vec!["a".to_string(), "b".to_string()]
            })
        );

        let outcome = manager.update(VerseMsg::ConfirmAccepted);
        assert_eq!(
            outcome.requests,
            vec![Request::BulkDeleteVerses {
                ids: vec!["a".to_string(), "b".to_string()]
            }]
        );

        let outcome = manager.update(VerseMsg::DeleteFinished {
            ids: vec!["a".to_string(), "b".to_string()],
            bulk: true,
            result: Ok(()),
        });
        assert!(manager.selection().is_empty());
        assert!(!manager.bulk_mode());
        assert!(matches!(
            outcome.requests.as_slice(),
            [Request::ListVerses { .. }]
        ));
    }

    #[test]
    fn dismissed_bulk_delete_sends_nothing() {
        let mut manager = loaded(vec![verse("a", "A")]);
        manager.update(VerseMsg::BulkModeToggled);
        manager.update(VerseMsg::SelectionToggled("a".to_string()));
        manager.update(VerseMsg::BulkDeleteRequested);
        let outcome = manager.update(VerseMsg::ConfirmDismissed);
        assert!(outcome.requests.is_empty());
        assert!(manager.confirmation().is_none());
        assert!(manager.is_selected("a"));
    }

    #[test]
    fn selection_requires_bulk_mode() {
        let mut manager = loaded(vec![verse("a", "A")]);
        manager.update(VerseMsg::SelectionToggled("a".to_string()));
        assert!(manager.selection().is_empty());
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut manager = loaded(vec![verse("a", "A"), verse("b", "B")]);
        manager.move_selection(10);
        assert_eq!(manager.selected_index(), 1);
        manager.move_selection(-10);
        assert_eq!(manager.selected_index(), 0);
        manager.select_last();
        assert_eq!(manager.current_verse().unwrap().id, "b");
    }
}
