//! HTML fragments for the chat area
//!
//! Server text is escaped by default. The only markup generated from it is
//! `<br>` for line breaks and the citation links. `RenderOptions::trust_server_html`
//! switches to injecting server text verbatim.

use crate::model::{ChatMessage, Role, Source, SourceKind};
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Id of the transient "thinking" node
pub const LOADING_MESSAGE_ID: &str = "loadingMessage";

/// Text shown next to the loading dots
pub const THINKING_TEXT: &str = "Sedang berpikir...";

pub const SOURCES_LABEL: &str = "Sumber / Sources";

const VIDEO_ICON: &str = r##"<svg viewBox="0 0 24 24" fill="currentColor"><path d="M23.498 6.186a3.016 3.016 0 0 0-2.122-2.136C19.505 3.545 12 3.545 12 3.545s-7.505 0-9.377.505A3.017 3.017 0 0 0 .502 6.186C0 8.07 0 12 0 12s0 3.93.502 5.814a3.016 3.016 0 0 0 2.122 2.136c1.871.505 9.376.505 9.376.505s7.505 0 9.377-.505a3.015 3.015 0 0 0 2.122-2.136C24 15.93 24 12 24 12s0-3.93-.502-5.814z"/><path fill="#fff" d="M9.545 15.568V8.432L15.818 12l-6.273 3.568z"/></svg>"##;

const DOCUMENT_ICON: &str = r##"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M4 19.5A2.5 2.5 0 0 1 6.5 17H20"/><path d="M6.5 2H20v20H6.5A2.5 2.5 0 0 1 4 19.5v-15A2.5 2.5 0 0 1 6.5 2z"/></svg>"##;

const BOOK_ICON: &str = r##"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M12 6.253v13m0-13C10.832 5.477 9.246 5 7.5 5S4.168 5.477 3 6.253v13C4.168 18.477 5.754 18 7.5 18s3.332.477 4.5 1.253m0-13C13.168 5.477 14.754 5 16.5 5c1.747 0 3.332.477 4.5 1.253v13C19.832 18.477 18.247 18 16.5 18c-1.746 0-3.332.477-4.5 1.253"/></svg>"##;

/// Greeting shown on load and after "new chat"
pub const WELCOME_HTML: &str = r#"<div class="message bot-message"><div class="message-content"><strong>Assalamu'alaikum!</strong> 👋<br><br>Ayo, mau tanya apa? Jangan susah-susah, santai aja.<br><br><span class="text-amber-600 text-sm">You can also ask in English!</span></div></div>"#;

pub const DISCLAIMER_HTML: &str = r#"<div class="disclaimer">⚠️ Ini chatbot edukasi bergaya Gus Baha, <strong>bukan fatwa resmi</strong>. Untuk keputusan penting, konsultasikan dengan ulama.</div>"#;

/// Controls how server-supplied text is turned into markup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub trust_server_html: bool,
}

impl RenderOptions {
    fn text(&self, text: &str) -> String {
        if self.trust_server_html {
            text.to_string()
        } else {
            encode_text(text).into_owned()
        }
    }

    fn href(&self, url: &str) -> String {
        if self.trust_server_html {
            return url.to_string();
        }
        if is_safe_url(url) {
            encode_double_quoted_attribute(url).into_owned()
        } else {
            "#".to_string()
        }
    }
}

/// http(s) and relative URLs only; `javascript:` and friends are dropped
fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return true;
    }
    // No scheme at all means a relative link
    match url.find(':') {
        None => true,
        Some(colon) => url[..colon].contains(['/', '?', '#']),
    }
}

/// Message text with line breaks mapped to `<br>`
pub fn message_body(text: &str, options: RenderOptions) -> String {
    options.text(text).replace("\r\n", "\n").replace('\n', "<br>")
}

pub fn source_icon(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Video => VIDEO_ICON,
        SourceKind::Document => DOCUMENT_ICON,
    }
}

fn icon_background(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Video => "background-color: #dc2626;",
        SourceKind::Document => "background-color: #92400e;",
    }
}

/// Citation block appended to a bot message; empty when there are no sources
pub fn render_sources(sources: &[Source], options: RenderOptions) -> String {
    if sources.is_empty() {
        return String::new();
    }

    let mut html = format!(
        r#"<div class="sources-container"><div class="sources-label">{}{}</div>"#,
        BOOK_ICON, SOURCES_LABEL
    );

    for source in sources {
        html.push_str(&format!(
            concat!(
                r#"<a href="{href}" target="_blank" rel="noopener noreferrer" class="source-item">"#,
                r#"<div class="source-icon" style="{bg}">{icon}</div>"#,
                r#"<div class="source-info"><div class="source-title">{title}</div>"#,
                r#"<div class="source-meta">{meta}</div></div></a>"#,
            ),
            href = options.href(&source.url),
            bg = icon_background(source.kind),
            icon = source_icon(source.kind),
            title = options.text(&source.title),
            meta = options.text(&source.meta()),
        ));
    }

    html.push_str("</div>");
    html
}

/// A full message node for the chat area
pub fn render_message(message: &ChatMessage, options: RenderOptions) -> String {
    let mut content = message_body(&message.text, options);
    if message.role == Role::Bot {
        content.push_str(&render_sources(&message.sources, options));
    }
    format!(
        r#"<div class="message {}-message"><div class="message-content">{}</div></div>"#,
        message.role, content
    )
}

/// The transient "thinking" node
pub fn loading_indicator() -> String {
    format!(
        concat!(
            r#"<div class="message bot-message loading-message" id="{}">"#,
            r#"<div class="message-content"><div class="loading-dots"><span></span><span></span><span></span></div>"#,
            r#"<span style="margin-left: 8px;">{}</span></div></div>"#,
        ),
        LOADING_MESSAGE_ID, THINKING_TEXT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(kind: SourceKind, url: &str) -> Source {
        Source {
            url: url.to_string(),
            title: "Ngaji <Hikam>".to_string(),
            kind,
            channel: Some("Gus Baha".to_string()),
            date: Some("2023".to_string()),
        }
    }

    #[test]
    fn test_line_breaks() {
        let escaped = RenderOptions::default();
        assert_eq!(message_body("a\nb\r\nc", escaped), "a<br>b<br>c");
    }

    #[test]
    fn test_escape_by_default() {
        let html = message_body("<script>alert(1)</script>\nok", RenderOptions::default());
        assert_eq!(html, "&lt;script&gt;alert(1)&lt;/script&gt;<br>ok");

        let trusted = RenderOptions {
            trust_server_html: true,
        };
        assert_eq!(message_body("<b>hi</b>\nok", trusted), "<b>hi</b><br>ok");
    }

    #[test]
    fn test_sources_only_on_bot_messages() {
        let sources = vec![source(SourceKind::Video, "https://youtu.be/a")];
        let bot = render_message(&ChatMessage::bot("jawab", sources.clone()), RenderOptions::default());
        assert!(bot.contains("sources-container"));
        assert!(bot.contains(SOURCES_LABEL));
        assert!(bot.contains("#dc2626"));
        assert!(bot.contains("Ngaji &lt;Hikam&gt;"));
        assert!(bot.contains("Gus Baha • 2023"));

        let mut user = ChatMessage::user("tanya");
        user.sources = sources;
        let user = render_message(&user, RenderOptions::default());
        assert!(user.starts_with(r#"<div class="message user-message">"#));
        assert!(!user.contains("sources-container"));
    }

    #[test]
    fn test_empty_sources_render_nothing() {
        assert_eq!(render_sources(&[], RenderOptions::default()), "");
        let bot = render_message(&ChatMessage::bot("hi", Vec::new()), RenderOptions::default());
        assert_eq!(
            bot,
            r#"<div class="message bot-message"><div class="message-content">hi</div></div>"#
        );
    }

    #[test]
    fn test_unsafe_links_are_neutralised() {
        let html = render_sources(
            &[source(SourceKind::Document, "javascript:alert(1)")],
            RenderOptions::default(),
        );
        assert!(html.contains(r##"href="#""##));
        assert!(html.contains("#92400e"));

        let html = render_sources(
            &[source(SourceKind::Document, "https://x.org/?a=\"b\"")],
            RenderOptions::default(),
        );
        assert!(html.contains("https://x.org/?a=&quot;b&quot;"));

        assert!(is_safe_url("/docs/1"));
        assert!(is_safe_url("watch?v=a:b"));
        assert!(!is_safe_url("data:text/html,hi"));
    }

    #[test]
    fn test_loading_indicator() {
        let html = loading_indicator();
        assert!(html.contains(r#"id="loadingMessage""#));
        assert!(html.contains(THINKING_TEXT));
    }
}
