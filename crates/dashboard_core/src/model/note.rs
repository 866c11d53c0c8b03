//! Note entity and markdown preview derivation.
//!
//! # Invariants
//! - `preview_text` is always derived from `content`; it is recomputed on
//!   every store write and never accepted from input.

use crate::model::common::normalize_tags;
use crate::model::{Entity, EntityKind, EntityMeta};
use crate::query::filter::Filterable;
use crate::validate::{Rules, Violation, WriteMode};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const PREVIEW_MAX_CHARS: usize = 100;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub title: String,
    /// Markdown body.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub preview_text: Option<String>,
}

/// Create/update payload for notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoteInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            tags: None,
        }
    }
}

impl Entity for Note {
    type Input = NoteInput;

    const KIND: EntityKind = EntityKind::Note;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(input: &NoteInput, mode: WriteMode) -> Vec<Violation> {
        let mut rules = Rules::new(mode);
        rules.required_text("title", input.title.as_deref());
        rules.into_violations()
    }

    fn from_input(meta: EntityMeta, input: NoteInput) -> Self {
        let mut note = Self {
            meta,
            title: String::new(),
            content: String::new(),
            tags: Vec::new(),
            preview_text: None,
        };
        note.apply_input(input);
        note
    }

    fn apply_input(&mut self, input: NoteInput) {
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if let Some(content) = input.content {
            self.content = content;
        }
        if let Some(tags) = input.tags {
            self.tags = tags;
        }
    }

    fn normalize(&mut self) {
        self.tags = normalize_tags(&self.tags);
        self.preview_text = derive_preview_text(&self.content);
    }
}

impl Filterable for Note {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.content.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn primary_date(&self) -> Option<i64> {
        Some(self.meta.last_modified)
    }

    fn tag_values(&self) -> &[String] {
        &self.tags
    }
}

/// Derives a plain-text preview from markdown.
///
/// Images are dropped, links keep their label, markdown symbols are
/// stripped, whitespace is collapsed and the first 100 chars are kept.
pub fn derive_preview_text(content: &str) -> Option<String> {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::derive_preview_text;

    #[test]
    fn preview_strips_markdown_and_images() {
        let preview =
            derive_preview_text("# Title\n\n![cover](a.png) see [docs](https://x.y) **now**")
                .expect("preview should exist");
        assert_eq!(preview, "Title see docs now");
    }

    #[test]
    fn preview_is_capped_and_absent_for_blank_bodies() {
        let long = "word ".repeat(60);
        let preview = derive_preview_text(&long).expect("preview should exist");
        assert_eq!(preview.chars().count(), 100);
        assert_eq!(derive_preview_text("  ## \n"), None);
    }
}
