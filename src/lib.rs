// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use crate::application::{
    Attachment, CounterService, NoteDeleter, NoteEditor, NoteLister, NotePublisher, NoteSearch,
    NoteViewer, UserSync,
};
use crate::cli::args::{Args, Command};
use crate::domain::{
    CounterKind, NoteDraft, NoteFilter, NoteOrder, NotePatch, NoteStats, SearchRequest, User,
};
use crate::infrastructure::config::default_config_path;
use crate::infrastructure::{
    Config, ConfiguredIdentity, ContentRenderer, LocalFileStore, SqliteBackend,
};
use crate::ports::{HtmlPresenter, TextPresenter};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting studynotes with arguments");

    if let Command::Init { force } = args.command {
        let path = init_config(args.config.as_deref(), force)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    // Initialize infrastructure
    let config = load_config(&args)?;
    let database = config.database_path()?;
    let mut backend = SqliteBackend::open(&database)?;
    let text = TextPresenter::new();

    match args.command {
        Command::Create {
            title,
            content,
            content_file,
            kind,
            file,
            tags,
            subject,
            private,
        } => {
            let user = sign_in(&mut backend, &config)?;
            let content = match (content, content_file) {
                (Some(content), _) => content,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read content from {}", path.display()))?,
                (None, None) => String::new(),
            };
            let attachment = file.as_deref().map(read_attachment).transpose()?;
            let draft = NoteDraft {
                title,
                content,
                kind,
                tags,
                subject,
                is_public: !private,
                author: user.as_author(),
                file: None,
            };

            let files = LocalFileStore::new(config.storage_root()?);
            let mut publisher = NotePublisher::new(&mut backend, files);
            let note_id = publisher.publish(draft, attachment)?;
            info!(note_id = %note_id, "Created note");
            println!("{}", note_id);
        }

        Command::View {
            note_id,
            json,
            html,
        } => {
            let mut viewer = NoteViewer::new(&mut backend);
            let note = viewer.view_note(&note_id)?;
            debug!(?note, "Retrieved note");

            if json {
                let output =
                    serde_json::to_string_pretty(&note).context("Failed to serialize note")?;
                println!("{}", output);
            } else {
                let page = HtmlPresenter::new().render(&note);
                if html {
                    println!("{}", page);
                } else {
                    let mut renderer = ContentRenderer::new();
                    let temp_path = renderer.create_temp_file(&page)?;
                    renderer.open_in_browser(&temp_path)?;
                }
            }
        }

        Command::Like { note_id } => {
            let note = NoteViewer::new(&mut backend).set_liked(&note_id, true)?;
            println!("{} likes", note.like_count);
        }

        Command::Unlike { note_id } => {
            let note = NoteViewer::new(&mut backend).set_liked(&note_id, false)?;
            println!("{} likes", note.like_count);
        }

        Command::Edit {
            note_id,
            title,
            content,
            tags,
            clear_tags,
            subject,
            clear_subject,
            public,
            private,
        } => {
            let user = sign_in(&mut backend, &config)?;
            let patch = NotePatch {
                title,
                content,
                tags: if clear_tags {
                    Some(Vec::new())
                } else if tags.is_empty() {
                    None
                } else {
                    Some(tags)
                },
                subject: if clear_subject {
                    Some(None)
                } else {
                    subject.map(Some)
                },
                is_public: match (public, private) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            let note = NoteEditor::new(&mut backend).edit(&user.id, &note_id, patch)?;
            println!("{}", text.note_summary(&note));
        }

        Command::Delete { note_id } => {
            let user = sign_in(&mut backend, &config)?;
            NoteDeleter::new(&mut backend).delete_note(&user.id, &note_id)?;
            info!(note_id = %note_id, "Deleted note");
            println!("Successfully deleted note {}", note_id);
        }

        Command::List {
            mine,
            subject,
            tags,
            order,
            limit,
        } => {
            let mut builder = scope(&mut backend, &config, mine)?.order(order).tags(tags);
            if let Some(subject) = subject {
                builder = builder.subject(subject);
            }
            if let Some(limit) = limit {
                builder = builder.limit(limit);
            }
            let filter = builder.build()?;

            let notes = NoteLister::new(&mut backend).list_notes(&filter)?;
            println!("{}", text.note_list(&notes));
        }

        Command::Search {
            query,
            mine,
            tag,
            subject,
            sort,
        } => {
            let request = SearchRequest {
                query,
                scope: scope(&mut backend, &config, mine)?.build()?,
                subject: subject.into(),
                tag: tag.into(),
                sort,
            };
            let notes = NoteSearch::new(&mut backend).run(&request)?;
            println!("{}", text.note_list(&notes));
        }

        Command::Tags { limit } => {
            let counters = ranking(&mut backend, CounterKind::Tag, limit)?;
            println!("{}", text.counter_list(&counters));
        }

        Command::Subjects { limit } => {
            let counters = ranking(&mut backend, CounterKind::Subject, limit)?;
            println!("{}", text.counter_list(&counters));
        }

        Command::Stats => {
            let user = sign_in(&mut backend, &config)?;
            let filter = NoteFilter::builder()
                .author(user.id)
                .order(NoteOrder::Recent)
                .build()?;
            let notes = NoteLister::new(&mut backend).list_notes(&filter)?;
            println!("{}", text.stats(&NoteStats::from_notes(&notes)));
        }

        // handled before the backend is opened
        Command::Init { .. } => {}

        Command::Whoami => {
            let user = sign_in(&mut backend, &config)?;
            println!("{}", text.user(&user));
        }
    }

    Ok(())
}

/// Config file, then `STUDYNOTES_*` variables, then `--database`.
pub fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    config.apply_env();
    if let Some(database) = &args.database {
        debug!(?database, "Using provided database path");
        config.backend.database = database.to_string_lossy().into_owned();
    }
    Ok(config)
}

/// Write a default config to `path` or the default location.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn init_config(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path().context("Could not find config directory")?,
    };
    if path.exists() && !force {
        anyhow::bail!(
            "Config file {} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::create_default(&path)?;
    info!(?path, "Created default config");
    Ok(path)
}

fn sign_in(backend: &mut SqliteBackend, config: &Config) -> Result<User> {
    let identity = ConfiguredIdentity::new(config.identity.clone());
    UserSync::new(backend, identity).sign_in()?.context(
        "Not signed in: set [identity] id in the config file or STUDYNOTES_USER_ID",
    )
}

/// Own notes with `mine`, otherwise public notes.
fn scope(
    backend: &mut SqliteBackend,
    config: &Config,
    mine: bool,
) -> Result<domain::filter::NoteFilterBuilder> {
    if mine {
        let user = sign_in(backend, config)?;
        Ok(NoteFilter::builder().author(user.id))
    } else {
        Ok(NoteFilter::builder().public(true))
    }
}

fn ranking(
    backend: &mut SqliteBackend,
    kind: CounterKind,
    limit: Option<usize>,
) -> Result<Vec<domain::Counter>> {
    let mut counters = CounterService::new(backend).ranking(kind)?;
    if let Some(limit) = limit {
        counters.truncate(limit);
    }
    Ok(counters)
}

fn read_attachment(path: &Path) -> Result<Attachment> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid attachment path {}", path.display()))?
        .to_string();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read attachment {}", path.display()))?;
    Ok(Attachment { file_name, bytes })
}

#[cfg(test)]
/// must be public to be used from integration tests
mod tests {
    use crate::util::testing;
    #[ctor::ctor]
    fn init() {
        testing::init_test_setup().expect("Failed to initialize test setup");
    }
}
