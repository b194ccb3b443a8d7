//! Server-rendered chat page. Plain markup; the transcript is the content.

use nova_rag::{Speaker, TranscriptEntry};
use std::fmt::Write;
use uuid::Uuid;

const STYLE: &str = r#"
body { font-family: 'Segoe UI', sans-serif; background: #1a1a2e; color: #fff; max-width: 860px; margin: 0 auto; padding: 16px; }
h1 { text-align: center; margin-bottom: 4px; }
.subtitle, .footer { text-align: center; color: #b9a7ff; font-size: 14px; }
.chat-box { border-radius: 15px; padding: 12px 18px; margin: 8px 0; max-width: 65%; clear: both; white-space: pre-wrap; word-wrap: break-word; }
.user-msg { background: #0055ff; float: right; text-align: right; }
.nova-msg { background: #8f6fff; float: left; }
.error-msg { background: #a83246; }
form { clear: both; display: flex; gap: 8px; padding-top: 16px; }
input[name=query] { flex: 1; padding: 10px; border-radius: 8px; border: none; }
"#;

pub fn render_chat(session_id: Uuid, entries: &[TranscriptEntry]) -> String {
    let mut html = String::with_capacity(2048);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Nova - SpaceX Mission Control</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str("<h1>NOVA MISSION CONTROL</h1>\n");
    html.push_str("<div class=\"subtitle\">SpaceX &amp; Starlink AI Assistant</div>\n");
    html.push_str("<div class=\"transcript\">\n");

    for entry in entries {
        let class = match (entry.speaker, entry.is_error) {
            (Speaker::User, _) => "user-msg",
            (Speaker::Assistant, false) => "nova-msg",
            (Speaker::Assistant, true) => "nova-msg error-msg",
        };
        // Writing to a String cannot fail.
        let _ = writeln!(
            html,
            "<div class=\"chat-box {}\">{}: {}</div>",
            class,
            entry.speaker.label(),
            escape_html(&entry.text)
        );
    }

    html.push_str("</div>\n");
    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"/chat/{session_id}\">\
         <input name=\"query\" placeholder=\"Type your question for Nova...\" autofocus required>\
         <button type=\"submit\">Send</button></form>"
    );
    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"/chat/{session_id}/reset\"><button type=\"submit\">New conversation</button></form>"
    );
    html.push_str("<div class=\"footer\">Powered by Groq &amp; ChromaDB</div>\n</body>\n</html>\n");

    html
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#x27;y&#x27;)&lt;/script&gt;"
        );
    }

    #[test]
    fn renders_entries_in_order_with_labels() {
        let id = Uuid::new_v4();
        let entries = vec![
            TranscriptEntry {
                speaker: Speaker::User,
                text: "What is <b>Starlink</b>?".to_string(),
                is_error: false,
            },
            TranscriptEntry {
                speaker: Speaker::Assistant,
                text: "Error generating answer: timeout".to_string(),
                is_error: true,
            },
        ];

        let html = render_chat(id, &entries);

        let user = html.find("You: What is &lt;b&gt;Starlink&lt;/b&gt;?").unwrap();
        let nova = html.find("Nova: Error generating answer").unwrap();
        assert!(user < nova);
        assert!(html.contains("nova-msg error-msg"));
        assert!(html.contains(&format!("action=\"/chat/{id}\"")));
        assert!(!html.contains("<b>Starlink</b>"));
    }
}
