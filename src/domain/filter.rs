// src/domain/filter.rs
use crate::constants::MAX_ANY_TAGS;
use crate::domain::{DomainError, Note};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Ordering applied by the repository when it runs a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteOrder {
    /// Creation time, newest first.
    #[default]
    Recent,
    /// Likes descending, then views descending. A tuple comparison, not a sum.
    Popular,
}

impl NoteOrder {
    pub fn compare(&self, a: &Note, b: &Note) -> Ordering {
        match self {
            NoteOrder::Recent => b.created_at.cmp(&a.created_at),
            NoteOrder::Popular => b
                .like_count
                .cmp(&a.like_count)
                .then_with(|| b.view_count.cmp(&a.view_count)),
        }
    }
}

impl FromStr for NoteOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recent" => Ok(NoteOrder::Recent),
            "popular" => Ok(NoteOrder::Popular),
            other => Err(DomainError::Validation(format!(
                "unknown order '{}', expected recent or popular",
                other
            ))),
        }
    }
}

impl fmt::Display for NoteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteOrder::Recent => f.write_str("recent"),
            NoteOrder::Popular => f.write_str("popular"),
        }
    }
}

/// Validated repository query. Construct through [`NoteFilter::builder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteFilter {
    author_id: Option<String>,
    is_public: Option<bool>,
    subject: Option<String>,
    tags: Vec<String>,
    limit: Option<usize>,
    order: NoteOrder,
}

impl NoteFilter {
    pub fn builder() -> NoteFilterBuilder {
        NoteFilterBuilder::default()
    }

    /// Every note, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn author_id(&self) -> Option<&str> {
        self.author_id.as_deref()
    }

    pub fn is_public(&self) -> Option<bool> {
        self.is_public
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Match-any tag set; empty means no tag predicate.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn order(&self) -> NoteOrder {
        self.order
    }

    /// Same predicates and order, no limit.
    pub fn without_limit(&self) -> Self {
        Self {
            limit: None,
            ..self.clone()
        }
    }

    /// Same filter with the subject predicate replaced.
    pub fn with_subject(&self, subject: Option<&str>) -> Self {
        Self {
            subject: subject.map(str::to_string),
            ..self.clone()
        }
    }

    pub fn with_order(&self, order: NoteOrder) -> Self {
        Self {
            order,
            ..self.clone()
        }
    }

    /// Predicate part of the filter; ordering and limit are applied by the caller.
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(author_id) = &self.author_id {
            if &note.author.id != author_id {
                return false;
            }
        }
        if let Some(is_public) = self.is_public {
            if note.is_public != is_public {
                return false;
            }
        }
        if let Some(subject) = &self.subject {
            if note.subject.as_deref() != Some(subject.as_str()) {
                return false;
            }
        }
        if !self.tags.is_empty() && !note.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        true
    }

    /// Sort with the repository order, then truncate to the limit.
    pub fn arrange(&self, mut notes: Vec<Note>) -> Vec<Note> {
        notes.sort_by(|a, b| self.order.compare(a, b));
        if let Some(limit) = self.limit {
            notes.truncate(limit);
        }
        notes
    }
}

#[derive(Debug, Default)]
pub struct NoteFilterBuilder {
    author_id: Option<String>,
    is_public: Option<bool>,
    subject: Option<String>,
    tags: Vec<String>,
    limit: Option<usize>,
    order: NoteOrder,
}

impl NoteFilterBuilder {
    pub fn author(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, order: NoteOrder) -> Self {
        self.order = order;
        self
    }

    pub fn build(self) -> Result<NoteFilter, DomainError> {
        if let Some(author_id) = &self.author_id {
            if author_id.trim().is_empty() {
                return Err(DomainError::Validation("author id must not be empty".to_string()));
            }
        }
        let subject = match self.subject {
            Some(subject) if subject.trim().is_empty() => {
                return Err(DomainError::Validation("subject must not be empty".to_string()));
            }
            other => other,
        };
        if self.limit == Some(0) {
            return Err(DomainError::Validation("limit must be positive".to_string()));
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(DomainError::Validation("tags must not be empty".to_string()));
        }
        Ok(NoteFilter {
            author_id: self.author_id,
            is_public: self.is_public,
            subject,
            tags: self.tags,
            limit: self.limit,
            order: self.order,
        })
    }
}

/// Reject filters the document backend cannot execute.
pub fn check_backend_support(filter: &NoteFilter) -> Result<(), DomainError> {
    if filter.tags().len() > MAX_ANY_TAGS {
        return Err(DomainError::BackendQuery(format!(
            "match-any tag filter supports at most {} values, got {}",
            MAX_ANY_TAGS,
            filter.tags().len()
        )));
    }
    Ok(())
}

/// Client-side sort key of the search pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Recent,
    /// `like_count + view_count` descending. Deliberately differs from
    /// [`NoteOrder::Popular`].
    #[default]
    Popular,
    Title,
}

impl SortKey {
    pub fn compare(&self, a: &Note, b: &Note) -> Ordering {
        match self {
            SortKey::Recent => b.created_at.cmp(&a.created_at),
            SortKey::Popular => b.popularity().cmp(&a.popularity()),
            SortKey::Title => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
        }
    }

    /// Repository order used to fetch the base list for this sort key.
    pub fn fetch_order(&self) -> NoteOrder {
        match self {
            SortKey::Popular => NoteOrder::Popular,
            SortKey::Recent | SortKey::Title => NoteOrder::Recent,
        }
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recent" => Ok(SortKey::Recent),
            "popular" => Ok(SortKey::Popular),
            "title" => Ok(SortKey::Title),
            other => Err(DomainError::Validation(format!(
                "unknown sort key '{}', expected recent, popular or title",
                other
            ))),
        }
    }
}

/// Exact, case-sensitive tag selection; `All` disables it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagFilter {
    #[default]
    All,
    Only(String),
}

impl TagFilter {
    pub fn matches(&self, note: &Note) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Only(tag) => note.tags.iter().any(|t| t == tag),
        }
    }
}

impl From<Option<String>> for TagFilter {
    fn from(tag: Option<String>) -> Self {
        match tag {
            Some(tag) if tag != "all" => TagFilter::Only(tag),
            _ => TagFilter::All,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubjectFilter {
    #[default]
    All,
    Only(String),
}

impl SubjectFilter {
    pub fn matches(&self, note: &Note) -> bool {
        match self {
            SubjectFilter::All => true,
            SubjectFilter::Only(subject) => note.subject.as_deref() == Some(subject.as_str()),
        }
    }

    pub fn as_option(&self) -> Option<&str> {
        match self {
            SubjectFilter::All => None,
            SubjectFilter::Only(subject) => Some(subject),
        }
    }
}

impl From<Option<String>> for SubjectFilter {
    fn from(subject: Option<String>) -> Self {
        match subject {
            Some(subject) if subject != "all" => SubjectFilter::Only(subject),
            _ => SubjectFilter::All,
        }
    }
}

/// Free-text query plus structural filters driving the search pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: Option<String>,
    /// Backend predicates that bound every retrieval (visibility, author).
    pub scope: NoteFilter,
    pub subject: SubjectFilter,
    pub tag: TagFilter,
    pub sort: SortKey,
}

impl SearchRequest {
    /// The query text, if it is non-blank.
    pub fn text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// Case-insensitive substring match over title, content, author name and tags.
pub fn matches_text(note: &Note, query: &str) -> bool {
    let query = query.to_lowercase();
    note.title.to_lowercase().contains(&query)
        || note.content.to_lowercase().contains(&query)
        || note.author.name.to_lowercase().contains(&query)
        || note.tags.iter().any(|t| t.to_lowercase().contains(&query))
}
