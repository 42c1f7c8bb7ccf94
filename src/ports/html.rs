// src/ports/html.rs
use crate::domain::{Note, NoteKind};
use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{html, Event, Options, Parser};
use tracing::instrument;

/// Renders a single note as a standalone HTML page.
#[derive(Debug, Default)]
pub struct HtmlPresenter;

impl HtmlPresenter {
    pub fn new() -> Self {
        Self
    }

    /// Markdown to HTML; raw HTML in the source is shown as text.
    #[instrument(level = "debug", skip(content), ret)]
    pub fn render_markdown(&self, content: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(content, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);
        html_output
    }

    fn render_body(&self, note: &Note) -> String {
        match (&note.kind, &note.file) {
            (NoteKind::Markdown, _) => self.render_markdown(&note.content),
            (NoteKind::Image, Some(file)) => format!(
                r#"<img src="{}" alt="{}">"#,
                encode_double_quoted_attribute(&file.url),
                encode_double_quoted_attribute(&file.name)
            ),
            (NoteKind::Pdf, Some(file)) => format!(
                r#"<embed src="{url}" type="application/pdf" width="100%" height="800px"><p><a href="{url}">{name}</a> ({size} bytes)</p>"#,
                url = encode_double_quoted_attribute(&file.url),
                name = encode_text(&file.name),
                size = file.size
            ),
            (_, None) => "<p>File missing</p>".to_string(),
        }
    }

    pub fn render(&self, note: &Note) -> String {
        let body = self.render_body(note);
        let tags = note
            .tags
            .iter()
            .map(|t| format!(r#"<span class="tag">{}</span>"#, encode_text(t)))
            .collect::<Vec<_>>()
            .join("");

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 2rem auto;
            padding: 0 1rem;
            background-color: #f5f5f5;
        }}
        .card {{
            background: white;
            border-radius: 8px;
            padding: 2rem;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
        pre {{
            white-space: pre-wrap;
            word-wrap: break-word;
            background-color: #f8f9fa;
            padding: 1rem;
            border-radius: 4px;
            overflow-x: auto;
        }}
        code {{
            background-color: #f0f0f0;
            padding: 2px 4px;
            border-radius: 3px;
            font-family: monospace;
        }}
        .note-info {{
            margin-top: 1rem;
            padding-top: 1rem;
            border-top: 1px solid #eee;
            font-size: 0.9em;
            color: #666;
        }}
        .tag {{
            display: inline-block;
            background: #e9ecef;
            padding: 2px 8px;
            border-radius: 4px;
            margin-right: 4px;
            font-size: 0.8em;
        }}
    </style>
</head>
<body>
    <div class="card">
        <h1>{title}</h1>
        <div class="note-body">{body}</div>
        <div class="note-info">
            <div>By {author} &middot; {created}</div>
            <div>Subject: {subject}</div>
            <div>{views} views &middot; {likes} likes &middot; {visibility}</div>
            <div class="tags">{tags}</div>
        </div>
    </div>
</body>
</html>"#,
            title = encode_text(&note.title),
            body = body,
            author = encode_text(&note.author.name),
            created = note.created_at.format("%Y-%m-%d %H:%M UTC"),
            subject = note
                .subject
                .as_deref()
                .map(|s| encode_text(s).into_owned())
                .unwrap_or_else(|| "None".to_string()),
            views = note.view_count,
            likes = note.like_count,
            visibility = if note.is_public { "public" } else { "private" },
            tags = if tags.is_empty() {
                "No tags".to_string()
            } else {
                tags
            }
        )
    }
}
