// src/application/note_publisher.rs
use crate::application::{CounterService, CounterStore, NoteRepository};
use crate::domain::{CounterKind, DomainError, FileRef, NoteDraft};
use chrono::Utc;
use tracing::{info, warn};

/// Object storage for note attachments.
pub trait FileStore {
    /// Store `bytes` at `path` and return a URL the file can be fetched from.
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<String, DomainError>;

    fn delete(&mut self, path: &str) -> Result<(), DomainError>;
}

impl<T: FileStore + ?Sized> FileStore for &mut T {
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<String, DomainError> {
        (**self).upload(path, bytes)
    }

    fn delete(&mut self, path: &str) -> Result<(), DomainError> {
        (**self).delete(path)
    }
}

/// File picked for a pdf or image note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Storage path of an upload: `notes/{author}/{unix_millis}-{file_name}`.
pub fn attachment_path(author_id: &str, unix_millis: i64, file_name: &str) -> String {
    format!("notes/{}/{}-{}", author_id, unix_millis, file_name)
}

pub struct NotePublisher<B, F> {
    backend: B,
    files: F,
}

impl<B, F> NotePublisher<B, F>
where
    B: NoteRepository + CounterStore,
    F: FileStore,
{
    pub fn new(backend: B, files: F) -> Self {
        Self { backend, files }
    }

    /// Create a note: validate, upload the attachment, store the note, then bump
    /// the tag and subject counters.
    ///
    /// The first counter failure is returned. The note stays stored; there is
    /// no rollback.
    pub fn publish(
        &mut self,
        draft: NoteDraft,
        attachment: Option<Attachment>,
    ) -> Result<String, DomainError> {
        let provisional = NoteDraft {
            file: attachment.as_ref().map(|a| FileRef {
                url: String::new(),
                name: a.file_name.clone(),
                size: a.bytes.len() as u64,
            }),
            ..draft
        };
        let mut draft = provisional.validate()?;

        let mut uploaded = None;
        if let Some(attachment) = attachment {
            let path = attachment_path(
                &draft.author.id,
                Utc::now().timestamp_millis(),
                &attachment.file_name,
            );
            let url = self.files.upload(&path, &attachment.bytes)?;
            draft.file = Some(FileRef {
                url,
                name: attachment.file_name,
                size: attachment.bytes.len() as u64,
            });
            uploaded = Some(path);
        }

        let tags = draft.tags.clone();
        let subject = draft.subject.clone();
        let id = match self.backend.create_note(draft) {
            Ok(id) => id,
            Err(e) => {
                if let Some(path) = uploaded {
                    if let Err(cleanup) = self.files.delete(&path) {
                        warn!(path = %path, error = %cleanup, "Failed to remove orphaned upload");
                    }
                }
                return Err(e);
            }
        };
        info!(note_id = %id, "Published note");

        let mut counters = CounterService::new(&mut self.backend);
        for tag in &tags {
            counters.increment(CounterKind::Tag, tag, 1)?;
        }
        if let Some(subject) = &subject {
            counters.increment(CounterKind::Subject, subject, 1)?;
        }

        Ok(id)
    }

    pub fn into_inner(self) -> (B, F) {
        (self.backend, self.files)
    }
}
