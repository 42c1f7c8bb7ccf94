// src/application/mod.rs
pub mod counter_service;
pub mod note_deleter;
pub mod note_editor;
pub mod note_lister;
pub mod note_publisher;
pub mod note_search;
pub mod note_viewer;
pub mod repository;
pub mod subscription;
pub mod user_sync;

pub use counter_service::{CounterService, CounterStore};
pub use note_deleter::NoteDeleter;
pub use note_editor::NoteEditor;
pub use note_lister::NoteLister;
pub use note_publisher::{Attachment, FileStore, NotePublisher};
pub use note_search::NoteSearch;
pub use note_viewer::NoteViewer;
pub use repository::NoteRepository;
pub use subscription::{SnapshotListener, Subscription, SubscriptionRegistry};
pub use user_sync::{IdentityProvider, UserStore, UserSync};
