// src/domain/note.rs
use crate::domain::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Markdown,
    Pdf,
    Image,
}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Markdown => "markdown",
            NoteKind::Pdf => "pdf",
            NoteKind::Image => "image",
        }
    }

    /// Non-markdown notes carry their payload in object storage.
    pub fn requires_file(&self) -> bool {
        !matches!(self, NoteKind::Markdown)
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(NoteKind::Markdown),
            "pdf" => Ok(NoteKind::Pdf),
            "image" | "img" => Ok(NoteKind::Image),
            other => Err(DomainError::Validation(format!(
                "unknown note type '{}', expected markdown, pdf or image",
                other
            ))),
        }
    }
}

/// Uploaded file backing a pdf or image note. The fields only exist together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub url: String,
    pub name: String,
    pub size: u64,
}

/// Author snapshot taken when the note is created; later profile edits are not
/// propagated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub tags: Vec<String>,
    pub subject: Option<String>,
    pub is_public: bool,
    pub author: Author,
    pub file: Option<FileRef>,
    pub view_count: u64,
    pub like_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Materialize a validated draft with zeroed counters.
    pub fn from_draft(id: String, draft: NoteDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            kind: draft.kind,
            tags: draft.tags,
            subject: draft.subject,
            is_public: draft.is_public,
            author: draft.author,
            file: draft.file,
            view_count: 0,
            like_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author.id == user_id
    }

    /// Merge a patch into this note and refresh `updated_at`.
    ///
    /// The merged note is validated before anything is written back, so a
    /// rejected patch leaves the note untouched.
    pub fn apply(&mut self, patch: NotePatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut merged = self.clone();
        if let Some(title) = patch.title {
            merged.title = title.trim().to_string();
        }
        if let Some(content) = patch.content {
            merged.content = content.trim().to_string();
        }
        if let Some(tags) = patch.tags {
            merged.tags = normalize_tags(tags);
        }
        if let Some(subject) = patch.subject {
            merged.subject = normalize_subject(subject);
        }
        if let Some(is_public) = patch.is_public {
            merged.is_public = is_public;
        }
        check_invariants(&merged.title, &merged.content, merged.kind, merged.file.as_ref())?;
        merged.updated_at = now;
        *self = merged;
        Ok(())
    }

    pub fn apply_counters(&mut self, patch: CounterPatch, now: DateTime<Utc>) {
        if let Some(views) = patch.view_count {
            self.view_count = views;
        }
        if let Some(likes) = patch.like_count {
            self.like_count = likes;
        }
        self.updated_at = now;
    }

    /// Score used by the client-side `popular` sort.
    pub fn popularity(&self) -> u64 {
        self.like_count + self.view_count
    }
}

/// Everything needed to create a note; id, counters and timestamps are
/// assigned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub kind: NoteKind,
    pub tags: Vec<String>,
    pub subject: Option<String>,
    pub is_public: bool,
    pub author: Author,
    pub file: Option<FileRef>,
}

impl NoteDraft {
    /// Normalize whitespace and tags, then check the creation rules.
    pub fn validate(self) -> Result<Self, DomainError> {
        let draft = Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            tags: normalize_tags(self.tags),
            subject: normalize_subject(self.subject),
            ..self
        };
        check_invariants(&draft.title, &draft.content, draft.kind, draft.file.as_ref())?;
        Ok(draft)
    }
}

/// Author-only partial update. `subject: Some(None)` clears the subject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub subject: Option<Option<String>>,
    pub is_public: Option<bool>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.subject.is_none()
            && self.is_public.is_none()
    }
}

/// Counter overwrite that any viewer may issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterPatch {
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
}

fn check_invariants(
    title: &str,
    content: &str,
    kind: NoteKind,
    file: Option<&FileRef>,
) -> Result<(), DomainError> {
    if title.is_empty() {
        return Err(DomainError::Validation("title is required".to_string()));
    }
    match (kind.requires_file(), file) {
        (false, _) if content.is_empty() => Err(DomainError::Validation(
            "markdown notes need content".to_string(),
        )),
        (false, Some(_)) => Err(DomainError::Validation(
            "markdown notes cannot carry a file".to_string(),
        )),
        (true, None) => Err(DomainError::Validation(format!(
            "{} notes need an uploaded file",
            kind
        ))),
        _ => Ok(()),
    }
}

/// Trim tags, drop empty ones and keep the first occurrence of duplicates.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

fn normalize_subject(subject: Option<String>) -> Option<String> {
    subject
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
