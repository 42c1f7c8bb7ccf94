// src/ports/text.rs
use crate::domain::{Counter, Note, NoteStats, User};
use crate::util::text::{extract_first_line, truncate_chars};

const TITLE_WIDTH: usize = 40;
const EXCERPT_WIDTH: usize = 60;

/// Plain-text views for terminal output.
#[derive(Debug, Default)]
pub struct TextPresenter;

impl TextPresenter {
    pub fn new() -> Self {
        Self
    }

    /// One line per note: id, title, type, subject, counters and tags.
    pub fn note_line(&self, note: &Note) -> String {
        let tags = note
            .tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{}\t{}\t[{}] {}\t{} likes, {} views\t{}",
            note.id,
            truncate_chars(&note.title, TITLE_WIDTH),
            note.kind,
            note.subject.as_deref().unwrap_or("-"),
            note.like_count,
            note.view_count,
            tags
        )
        .trim_end()
        .to_string()
    }

    pub fn note_list(&self, notes: &[Note]) -> String {
        if notes.is_empty() {
            return "No notes found".to_string();
        }
        notes
            .iter()
            .map(|n| self.note_line(n))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Multi-line summary of one note with a content excerpt.
    pub fn note_summary(&self, note: &Note) -> String {
        let excerpt = match &note.file {
            Some(file) => format!("{} ({} bytes)", file.url, file.size),
            None => truncate_chars(&extract_first_line(&note.content), EXCERPT_WIDTH),
        };
        format!(
            "{}\n  by {} on {}\n  {}\n  {} likes, {} views, {}",
            note.title,
            note.author.name,
            note.created_at.format("%Y-%m-%d %H:%M"),
            excerpt,
            note.like_count,
            note.view_count,
            if note.is_public { "public" } else { "private" }
        )
    }

    pub fn counter_list(&self, counters: &[Counter]) -> String {
        if counters.is_empty() {
            return "No counters yet".to_string();
        }
        counters
            .iter()
            .map(|c| format!("{:>5}  {} ({})", c.count, c.name, c.color))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn stats(&self, stats: &NoteStats) -> String {
        format!(
            "Notes:    {}\nPublic:   {}\nViews:    {}\nLikes:    {}\nSubjects: {}",
            stats.total_notes,
            stats.public_notes,
            stats.total_views,
            stats.total_likes,
            if stats.subjects.is_empty() {
                "-".to_string()
            } else {
                stats.subjects.join(", ")
            }
        )
    }

    pub fn user(&self, user: &User) -> String {
        format!(
            "{} <{}>\n  id: {}\n  member since {}",
            user.display_name,
            user.email,
            user.id,
            user.created_at.format("%Y-%m-%d")
        )
    }
}
