//! Verse manager: filtering, sorting, draft reconciliation and the reducer
//! that ties them to backend requests.

mod draft;
mod export;
mod filter;
mod manager;

pub use draft::{
    line_count, split_list, word_count, DraftError, FieldValue, ListInput, VerseDraft, VerseField,
};
pub use export::save_export;
pub use filter::{SortField, SortOrder, VerseFilters, VerseSort};
pub use manager::{Confirmation, VerseManager, VerseMsg};
