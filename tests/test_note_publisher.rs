mod helpers;

use anyhow::Result;
use helpers::{author, markdown_draft, test_users, TestBackend};
use studynotes::application::{Attachment, CounterStore, NoteRepository, NotePublisher};
use studynotes::domain::{CounterKind, DomainError, NoteDraft, NoteKind};

#[test]
fn given_calc_notes_draft_when_publishing_then_note_and_counters_created() -> Result<()> {
    // Arrange
    let test_backend = TestBackend::new()?;
    let mut backend = test_backend.open()?;
    let ada = author(test_users::ADA, "Ada");
    let draft = markdown_draft(&ada, "Calc Notes", &["calc", "limits"], Some("Calculus"));

    // Act
    let id = {
        let mut publisher = NotePublisher::new(&mut backend, test_backend.file_store());
        publisher.publish(draft, None)?
    };

    // Assert
    let note = backend.get_note(&id)?;
    assert_eq!(note.title, "Calc Notes");
    for tag in ["calc", "limits"] {
        let counter = backend.get_counter(CounterKind::Tag, tag)?.unwrap();
        assert_eq!(counter.count, 1, "tag {}", tag);
    }
    let subject = backend.get_counter(CounterKind::Subject, "Calculus")?.unwrap();
    assert_eq!(subject.count, 1);
    Ok(())
}

#[test]
fn given_two_notes_sharing_tag_when_publishing_then_counter_accumulates() -> Result<()> {
    // Arrange
    let test_backend = TestBackend::new()?;
    let mut backend = test_backend.open()?;
    let ada = author(test_users::ADA, "Ada");
    let bob = author(test_users::BOB, "Bob");

    // Act
    {
        let mut publisher = NotePublisher::new(&mut backend, test_backend.file_store());
        publisher.publish(markdown_draft(&ada, "Limits", &["calc"], None), None)?;
        publisher.publish(markdown_draft(&bob, "Series", &["calc", "series"], None), None)?;
    }

    // Assert
    let ranking = backend.list_counters(CounterKind::Tag)?;
    let names: Vec<(&str, i64)> = ranking.iter().map(|c| (c.name.as_str(), c.count)).collect();
    assert_eq!(names, vec![("calc", 2), ("series", 1)]);
    Ok(())
}

#[test]
fn given_image_attachment_when_publishing_then_file_uploaded_and_referenced() -> Result<()> {
    // Arrange
    let test_backend = TestBackend::new()?;
    let mut backend = test_backend.open()?;
    let draft = NoteDraft {
        title: "Whiteboard".to_string(),
        content: String::new(),
        kind: NoteKind::Image,
        tags: vec![],
        subject: None,
        is_public: true,
        author: author(test_users::ADA, "Ada"),
        file: None,
    };
    let attachment = Attachment {
        file_name: "board.png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    };

    // Act
    let id = {
        let mut publisher = NotePublisher::new(&mut backend, test_backend.file_store());
        publisher.publish(draft, Some(attachment))?
    };

    // Assert
    let note = backend.get_note(&id)?;
    let file = note.file.expect("image note has a file");
    assert_eq!(file.name, "board.png");
    assert_eq!(file.size, 4);
    assert!(file.url.starts_with("file://"));
    assert!(file.url.ends_with("-board.png"));
    let stored = file.url.trim_start_matches("file://");
    assert_eq!(std::fs::read(stored)?, vec![0x89, b'P', b'N', b'G']);
    assert!(stored.contains(&format!("notes/{}/", test_users::ADA)));
    Ok(())
}

#[test]
fn given_invalid_draft_when_publishing_then_nothing_uploaded_or_counted() -> Result<()> {
    // Arrange
    let test_backend = TestBackend::new()?;
    let mut backend = test_backend.open()?;
    let ada = author(test_users::ADA, "Ada");
    let mut draft = markdown_draft(&ada, "  ", &["calc"], None);
    draft.kind = NoteKind::Pdf;
    let attachment = Attachment {
        file_name: "l1.pdf".to_string(),
        bytes: b"%PDF".to_vec(),
    };

    // Act
    let result = {
        let mut publisher = NotePublisher::new(&mut backend, test_backend.file_store());
        publisher.publish(draft, Some(attachment))
    };

    // Assert
    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert!(!test_backend.storage_root.exists());
    assert_eq!(backend.get_counter(CounterKind::Tag, "calc")?, None);
    Ok(())
}

#[test]
fn given_pdf_without_attachment_when_publishing_then_validation_error() -> Result<()> {
    // Arrange
    let test_backend = TestBackend::new()?;
    let mut backend = test_backend.open()?;
    let ada = author(test_users::ADA, "Ada");
    let mut draft = markdown_draft(&ada, "Lecture", &[], None);
    draft.kind = NoteKind::Pdf;

    // Act
    let mut publisher = NotePublisher::new(&mut backend, test_backend.file_store());
    let result = publisher.publish(draft, None);

    // Assert
    assert!(matches!(result, Err(DomainError::Validation(_))));
    Ok(())
}
