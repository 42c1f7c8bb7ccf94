use clap::Parser;
use studynotes::cli::args::{Args, Command};
use studynotes::domain::{NoteKind, NoteOrder, SortKey};
use studynotes::infrastructure::Config;
use tempfile::TempDir;

#[test]
fn given_no_subcommand_when_parsing_then_fails() {
    // Arrange
    let args = vec!["studynotes", "some-id"];

    // Act & Assert
    let result = Args::try_parse_from(args);
    assert!(result.is_err(), "Should fail without subcommand");
}

#[test]
fn given_explicit_view_command_when_parsing_then_succeeds() {
    // Arrange
    let args = vec!["studynotes", "view", "n-123"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::View {
            note_id,
            json,
            html,
        } => {
            assert_eq!(note_id, "n-123");
            assert!(!json);
            assert!(!html);
        }
        _ => panic!("Expected View command"),
    }
    assert_eq!(parsed.database, None);
    assert_eq!(parsed.config, None);
}

#[test]
fn given_view_with_json_and_html_when_parsing_then_fails() {
    // Arrange
    let args = vec!["studynotes", "view", "n-123", "--json", "--html"];

    // Act & Assert
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn given_global_database_flag_when_parsing_then_succeeds() {
    // Arrange
    let args = vec!["studynotes", "delete", "n-1", "-d", "/tmp/notes.db", "-vv"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Delete { note_id } => assert_eq!(note_id, "n-1"),
        _ => panic!("Expected Delete command"),
    }
    assert_eq!(
        parsed.database,
        Some(std::path::PathBuf::from("/tmp/notes.db"))
    );
    assert_eq!(parsed.verbose, 2);
}

#[test]
fn given_create_with_tags_when_parsing_then_collects_all() {
    // Arrange
    let args = vec![
        "studynotes",
        "create",
        "Calc Notes",
        "--content",
        "limits",
        "--tag",
        "calc",
        "--tag",
        "limits",
        "-s",
        "Calculus",
        "--private",
    ];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Create {
            title,
            content,
            kind,
            tags,
            subject,
            private,
            file,
            ..
        } => {
            assert_eq!(title, "Calc Notes");
            assert_eq!(content.as_deref(), Some("limits"));
            assert_eq!(kind, NoteKind::Markdown);
            assert_eq!(tags, vec!["calc", "limits"]);
            assert_eq!(subject.as_deref(), Some("Calculus"));
            assert!(private);
            assert_eq!(file, None);
        }
        _ => panic!("Expected Create command"),
    }
}

#[test]
fn given_unknown_note_type_when_parsing_then_fails() {
    // Arrange
    let args = vec!["studynotes", "create", "Scan", "--type", "video"];

    // Act & Assert
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn given_list_without_options_when_parsing_then_recent_public_defaults() {
    // Arrange
    let args = vec!["studynotes", "list"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::List {
            mine,
            order,
            limit,
            tags,
            ..
        } => {
            assert!(!mine);
            assert_eq!(order, NoteOrder::Recent);
            assert_eq!(limit, None);
            assert!(tags.is_empty());
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn given_search_without_sort_when_parsing_then_popular() {
    // Arrange
    let args = vec!["studynotes", "search", "derivative", "--tag", "calc"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Search {
            query, sort, tag, ..
        } => {
            assert_eq!(query.as_deref(), Some("derivative"));
            assert_eq!(sort, SortKey::Popular);
            assert_eq!(tag.as_deref(), Some("calc"));
        }
        _ => panic!("Expected Search command"),
    }
}

#[test]
fn given_edit_with_public_and_private_when_parsing_then_fails() {
    // Arrange
    let args = vec!["studynotes", "edit", "n-1", "--public", "--private"];

    // Act & Assert
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn given_edit_clearing_subject_when_parsing_then_flag_set() {
    // Arrange
    let args = vec!["studynotes", "edit", "n-1", "--clear-subject"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Edit {
            clear_subject,
            subject,
            ..
        } => {
            assert!(clear_subject);
            assert_eq!(subject, None);
        }
        _ => panic!("Expected Edit command"),
    }
}

#[test]
fn given_init_with_force_when_parsing_then_succeeds() {
    // Arrange
    let args = vec!["studynotes", "init", "--force", "-c", "/tmp/studynotes.toml"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    assert!(matches!(parsed.command, Command::Init { force: true }));
}

#[test]
fn given_missing_config_when_running_init_then_writes_default_config() {
    // Arrange
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.toml");
    let args = Args::try_parse_from([
        "studynotes",
        "init",
        "--config",
        config_path.to_str().unwrap(),
    ])
    .unwrap();

    // Act
    studynotes::run(args).unwrap();

    // Assert
    assert_eq!(Config::load(&config_path).unwrap(), Config::default());
}

#[test]
fn given_existing_config_when_running_init_then_refuses_without_force() {
    // Arrange
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[identity]\nid = \"ada\"\n").unwrap();

    // Act
    let refused = studynotes::init_config(Some(&config_path), false);
    let forced = studynotes::init_config(Some(&config_path), true);

    // Assert
    assert!(refused.is_err());
    assert_eq!(forced.unwrap(), config_path);
    assert_eq!(Config::load(&config_path).unwrap().identity.id, "");
}
