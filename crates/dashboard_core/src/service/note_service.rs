//! Note-specific queries.

use crate::model::{normalize_tag, Entity, Note};
use crate::query::filter::FilterCriteria;
use crate::service::entity_service::EntityService;
use crate::store::{EntityStore, InMemoryStore, StoreResult};
use crate::validate::require_argument;

pub type NoteService<S = InMemoryStore<Note>> = EntityService<Note, S>;

impl<S: EntityStore<Note>> EntityService<Note, S> {
    /// Most recently modified notes first.
    pub fn recent_notes(&self, limit: usize) -> Vec<Note> {
        let mut notes = self.get_all();
        notes.sort_by(|a, b| b.meta.last_modified.cmp(&a.meta.last_modified));
        notes.truncate(limit);
        notes
    }

    /// Case-insensitive search over title, content and tags.
    ///
    /// # Errors
    /// - `StoreError::Validation` when `term` is blank.
    pub fn search_notes(&self, term: &str) -> StoreResult<Vec<Note>> {
        let term = require_argument(Note::KIND, "term", term)?;
        Ok(self.filter(&FilterCriteria::new().search(term)))
    }

    /// # Errors
    /// - `StoreError::Validation` when `tag` is blank.
    pub fn notes_by_tag(&self, tag: &str) -> StoreResult<Vec<Note>> {
        let tag = require_argument(Note::KIND, "tag", tag)?;
        let tag = normalize_tag(tag).unwrap_or_default();
        Ok(self.select(|note| note.tags.iter().any(|value| *value == tag)))
    }
}
