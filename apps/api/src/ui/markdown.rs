use pulldown_cmark::{html, Event, Options, Parser, Tag};

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Renders model output (Markdown) to HTML. Raw HTML in the output is shown as
/// text, never interpreted. Links and images whose destination uses any scheme
/// other than http, https or mailto are reduced to their text.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    // One entry per open link/image: whether its start tag was dropped.
    let mut dropped: Vec<bool> = Vec::new();

    let parser = Parser::new_ext(text, options).filter_map(move |event| match event {
        Event::Html(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Link(_, ref dest, _)) | Event::Start(Tag::Image(_, ref dest, _)) => {
            let unsafe_dest = !is_safe_destination(dest);
            dropped.push(unsafe_dest);
            if unsafe_dest {
                None
            } else {
                Some(event)
            }
        }
        Event::End(Tag::Link(..)) | Event::End(Tag::Image(..)) => {
            if dropped.pop().unwrap_or(false) {
                None
            } else {
                Some(event)
            }
        }
        other => Some(other),
    });

    let mut rendered = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut rendered, parser);
    rendered
}

/// Relative destinations carry no scheme and are allowed.
fn is_safe_destination(dest: &str) -> bool {
    // browsers ignore whitespace and control characters inside a scheme
    let cleaned: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    let scheme_end = cleaned.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if cleaned[i..].starts_with(':') => {
            let scheme = cleaned[..i].to_ascii_lowercase();
            ALLOWED_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_lists() {
        let rendered = render_markdown("## Skills\n- Python\n- AWS\n");
        assert!(rendered.contains("<h2>Skills</h2>"));
        assert!(rendered.contains("<li>Python</li>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let rendered = render_markdown("Hello <script>alert(1)</script>");
        assert!(!rendered.contains("<script>"));
        assert!(rendered.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_javascript_link_is_dropped() {
        let rendered = render_markdown("[Download CV](javascript:alert(document.cookie))");
        assert!(!rendered.contains("javascript:"));
        assert!(!rendered.contains("<a"));
        assert!(rendered.contains("Download CV"));
    }

    #[test]
    fn test_obfuscated_scheme_is_dropped() {
        let rendered = render_markdown("[x](<JavaScript\t:alert(1)>) and [y](data:text/html,hi)");
        assert!(!rendered.contains("<a"));
        assert!(rendered.contains('x'));
    }

    #[test]
    fn test_unsafe_image_keeps_alt_text() {
        let rendered = render_markdown("![profile photo](javascript:alert(1))");
        assert!(!rendered.contains("<img"));
        assert!(rendered.contains("profile photo"));
    }

    #[test]
    fn test_web_links_are_kept() {
        let rendered = render_markdown(
            "[Course](https://www.coursera.org/learn/k8s) or [mail](mailto:hr@example.com) or [top](#summary)",
        );
        assert!(rendered.contains("<a href=\"https://www.coursera.org/learn/k8s\">Course</a>"));
        assert!(rendered.contains("href=\"mailto:hr@example.com\""));
        assert!(rendered.contains("href=\"#summary\""));
    }

    #[test]
    fn test_html_block_is_escaped() {
        let rendered = render_markdown("<div onclick=\"x()\">hi</div>\n");
        assert!(!rendered.contains("<div"));
    }
}
