// src/domain/stats.rs
use crate::domain::Note;
use serde::Serialize;
use std::collections::BTreeSet;

/// Aggregates shown on the dashboard for a set of notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteStats {
    pub total_notes: usize,
    pub public_notes: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub subjects: Vec<String>,
}

impl NoteStats {
    pub fn from_notes(notes: &[Note]) -> Self {
        let subjects: BTreeSet<&str> = notes.iter().filter_map(|n| n.subject.as_deref()).collect();
        Self {
            total_notes: notes.len(),
            public_notes: notes.iter().filter(|n| n.is_public).count(),
            total_views: notes.iter().map(|n| n.view_count).sum(),
            total_likes: notes.iter().map(|n| n.like_count).sum(),
            subjects: subjects.into_iter().map(str::to_string).collect(),
        }
    }
}
