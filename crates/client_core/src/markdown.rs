//! Markdown to HTML rendering for the narrative and blog regions.

use std::{collections::HashMap, ops::Range};

use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Single newlines inside a paragraph become `<br />`.
    pub hard_breaks: bool,
    /// Tables, strikethrough, task lists and footnotes.
    pub github_flavored: bool,
    /// Headings get a slug `id` attribute.
    pub header_ids: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            github_flavored: true,
            header_ids: true,
        }
    }
}

/// Stateless renderer; construct once and share.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, source: &str) -> String {
        let hard_breaks = self.options.hard_breaks;
        let parser = Parser::new_ext(source, self.parser_options()).map(|event| match event {
            Event::SoftBreak if hard_breaks => Event::HardBreak,
            other => other,
        });

        let mut events = if self.options.github_flavored {
            autolink(parser)
        } else {
            parser.collect()
        };
        if self.options.header_ids {
            events = with_heading_ids(events);
        }

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.options.github_flavored {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.options.header_ids {
            options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        options
    }
}

fn with_heading_ids<'a>(events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    let mut slugger = Slugger::default();
    let mut heading: Option<Vec<Event<'a>>> = None;
    let mut out = Vec::with_capacity(events.len());

    for event in events {
        match event {
            Event::Start(Tag::Heading { .. }) => heading = Some(vec![event]),
            Event::End(TagEnd::Heading(_)) => {
                let mut buffered = heading.take().unwrap_or_default();
                buffered.push(event);
                assign_heading_id(&mut buffered, &mut slugger);
                out.extend(buffered);
            }
            other => match heading.as_mut() {
                Some(buffered) => buffered.push(other),
                None => out.push(other),
            },
        }
    }
    out
}

fn assign_heading_id(buffered: &mut [Event<'_>], slugger: &mut Slugger) {
    let text: String = buffered
        .iter()
        .filter_map(|event| match event {
            Event::Text(text) | Event::Code(text) => Some(&**text),
            _ => None,
        })
        .collect();

    if let Some(Event::Start(Tag::Heading { id, .. })) = buffered.first_mut() {
        match id {
            Some(explicit) => slugger.reserve(explicit),
            None => *id = Some(CowStr::from(slugger.slug(&text))),
        }
    }
}

const LINK_PREFIXES: [&str; 3] = ["https://", "http://", "www."];

/// Turns bare `http(s)://` and `www.` addresses in running text into links.
/// Text inside links, images and code blocks is left alone.
fn autolink<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut pending = String::new();
    let mut verbatim = 0usize;

    for event in events {
        if let Event::Text(text) = &event {
            if verbatim == 0 {
                pending.push_str(text);
                continue;
            }
        }
        flush_text(&mut pending, &mut out);

        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                verbatim += 1
            }
            Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                verbatim = verbatim.saturating_sub(1)
            }
            _ => {}
        }
        out.push(event);
    }
    flush_text(&mut pending, &mut out);
    out
}

fn flush_text<'a>(pending: &mut String, out: &mut Vec<Event<'a>>) {
    if pending.is_empty() {
        return;
    }

    let mut cursor = 0;
    for (range, prefix) in bare_links(pending) {
        if range.start > cursor {
            out.push(Event::Text(pending[cursor..range.start].to_string().into()));
        }
        let link = &pending[range.clone()];
        let dest_url = if prefix == "www." {
            format!("http://{link}")
        } else {
            link.to_string()
        };
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: dest_url.into(),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        out.push(Event::Text(link.to_string().into()));
        out.push(Event::End(TagEnd::Link));
        cursor = range.end;
    }
    if cursor < pending.len() {
        out.push(Event::Text(pending[cursor..].to_string().into()));
    }
    pending.clear();
}

fn bare_links(text: &str) -> Vec<(Range<usize>, &'static str)> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some((start, prefix)) = link_start(text, cursor) {
        let rest = &text[start..];
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '<')
            .unwrap_or(rest.len());
        let kept = trim_link_tail(&rest[..len]);
        if kept.len() > prefix.len() {
            found.push((start..start + kept.len(), prefix));
        }
        cursor = start + len;
    }
    found
}

fn link_start(text: &str, from: usize) -> Option<(usize, &'static str)> {
    text[from..].char_indices().find_map(|(offset, _)| {
        let at = from + offset;
        let at_boundary = text[..at]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace() || matches!(c, '(' | '*' | '_' | '~'));
        if !at_boundary {
            return None;
        }
        LINK_PREFIXES
            .iter()
            .find(|prefix| {
                text[at..]
                    .get(..prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
            })
            .map(|prefix| (at, *prefix))
    })
}

/// Drops sentence punctuation and unbalanced closing parens from the end.
fn trim_link_tail(candidate: &str) -> &str {
    let mut link = candidate;
    while let Some(last) = link.chars().next_back() {
        let strip = match last {
            '?' | '!' | '.' | ',' | ':' | ';' | '*' | '_' | '~' | '\'' | '"' => true,
            ')' => link.matches(')').count() > link.matches('(').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        link = &link[..link.len() - last.len_utf8()];
    }
    link
}

/// Heading slugs, unique within one rendered document.
#[derive(Default)]
struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let base: String = text
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !is_slug_punctuation(*c))
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .collect();

        let mut slug = base.clone();
        let mut occurrences = 0;
        if let Some(previous) = self.seen.get(&base) {
            occurrences = *previous;
            loop {
                occurrences += 1;
                slug = format!("{base}-{occurrences}");
                if !self.seen.contains_key(&slug) {
                    break;
                }
            }
        }

        self.seen.insert(base, occurrences);
        self.seen.insert(slug.clone(), 0);
        slug
    }

    fn reserve(&mut self, explicit: &str) {
        self.seen.entry(explicit.to_string()).or_insert(0);
    }
}

fn is_slug_punctuation(c: char) -> bool {
    matches!(c, '\u{2000}'..='\u{206F}' | '\u{2E00}'..='\u{2E7F}')
        || (c.is_ascii_punctuation() && c != '-' && c != '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> String {
        MarkdownRenderer::default().render(source)
    }

    #[test]
    fn headings_get_slug_ids() {
        assert_eq!(render("# Story"), "<h1 id=\"story\">Story</h1>\n");
        let html = render("## Growth: What's Next?");
        assert!(html.starts_with("<h2 id=\"growth-whats-next\">"), "{html}");
    }

    #[test]
    fn duplicate_headings_are_suffixed() {
        let html = render("# Notes\n\n# Notes\n\n# Notes");
        assert!(html.contains("id=\"notes\""));
        assert!(html.contains("id=\"notes-1\""));
        assert!(html.contains("id=\"notes-2\""));
    }

    #[test]
    fn explicit_heading_ids_are_kept() {
        let html = render("# Final Post {#final}");
        assert!(html.contains("id=\"final\""), "{html}");
    }

    #[test]
    fn header_ids_can_be_disabled() {
        let renderer = MarkdownRenderer::new(RenderOptions {
            header_ids: false,
            ..RenderOptions::default()
        });
        assert_eq!(renderer.render("# Story"), "<h1>Story</h1>\n");
    }

    #[test]
    fn soft_breaks_become_hard_breaks() {
        assert_eq!(render("one\ntwo"), "<p>one<br />\ntwo</p>\n");

        let renderer = MarkdownRenderer::new(RenderOptions {
            hard_breaks: false,
            ..RenderOptions::default()
        });
        assert_eq!(renderer.render("one\ntwo"), "<p>one\ntwo</p>\n");
    }

    #[test]
    fn github_extensions_render() {
        let html = render("~~old~~\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done");
        assert!(html.contains("<del>old</del>"), "{html}");
        assert!(html.contains("<table>"), "{html}");
        assert!(html.contains("type=\"checkbox\""), "{html}");
    }

    #[test]
    fn bare_urls_become_links() {
        assert_eq!(
            render("Docs at https://example.com/guide."),
            "<p>Docs at <a href=\"https://example.com/guide\">https://example.com/guide</a>.</p>\n"
        );
        let html = render("Visit www.example.org (or not)");
        assert!(
            html.contains("<a href=\"http://www.example.org\">www.example.org</a> (or not)"),
            "{html}"
        );
    }

    #[test]
    fn existing_links_and_code_are_not_relinked() {
        let html = render("[site](https://example.com) and `https://example.com`");
        assert_eq!(html.matches("<a ").count(), 1, "{html}");
        assert!(html.contains("<code>https://example.com</code>"), "{html}");

        let html = render("```\nhttps://example.com\n```");
        assert!(!html.contains("<a "), "{html}");
    }

    #[test]
    fn autolinks_follow_github_flavor() {
        let renderer = MarkdownRenderer::new(RenderOptions {
            github_flavored: false,
            ..RenderOptions::default()
        });
        assert!(!renderer.render("https://example.com").contains("<a "));
        assert!(!render("nothttps://example.com").contains("<a "));
    }

    #[test]
    fn plain_inline_markup() {
        assert_eq!(render("*ai*"), "<p><em>ai</em></p>\n");
        assert_eq!(render("- grow"), "<ul>\n<li>grow</li>\n</ul>\n");
        assert_eq!(render(""), "");
    }
}
