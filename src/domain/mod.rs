// src/domain/mod.rs
pub mod counter;
pub mod error;
pub mod filter;
pub mod note;
pub mod stats;
pub mod user;

pub use counter::{Counter, CounterKind};
pub use error::DomainError;
pub use filter::{NoteFilter, NoteOrder, SearchRequest, SortKey, SubjectFilter, TagFilter};
pub use note::{Author, CounterPatch, FileRef, Note, NoteDraft, NoteKind, NotePatch};
pub use stats::NoteStats;
pub use user::{IdentityProfile, User};
