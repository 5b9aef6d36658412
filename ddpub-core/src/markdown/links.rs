//! Link and image destination rewriting.

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use pulldown_cmark_escape::{escape_href, escape_html};

/// What to do with one link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRewrite {
    /// Replacement destination, if any.
    pub destination: Option<String>,
    /// Open in a new tab with `target="_blank" rel="noopener"`.
    pub new_tab: bool,
}

impl LinkRewrite {
    pub fn keep() -> Self {
        Self::default()
    }

    pub fn to(destination: impl Into<String>) -> Self {
        Self {
            destination: Some(destination.into()),
            new_tab: false,
        }
    }
}

/// Decides how link and image destinations are rewritten.
pub trait LinkVisitor {
    fn visit_link(&mut self, destination: &str) -> LinkRewrite;

    /// Replacement image source, if any.
    fn visit_image(&mut self, destination: &str) -> Option<String>;
}

/// Apply `visitor` to every link and image in `events`.
///
/// Links opening in a new tab are emitted as inline HTML, since the event
/// stream has no way to carry extra attributes.
pub fn rewrite_links<'a, V: LinkVisitor>(events: Vec<Event<'a>>, visitor: &mut V) -> Vec<Event<'a>> {
    let mut result = Vec::with_capacity(events.len());
    // One entry per open link: true if it was emitted as inline HTML.
    let mut open_links: Vec<bool> = Vec::new();

    for event in events {
        match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let rewrite = visitor.visit_link(&dest_url);
                let dest_url = match rewrite.destination {
                    Some(new) => CowStr::from(new),
                    None => dest_url,
                };

                if rewrite.new_tab {
                    result.push(Event::InlineHtml(CowStr::from(anchor_open(&dest_url, &title))));
                    open_links.push(true);
                } else {
                    result.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url,
                        title,
                        id,
                    }));
                    open_links.push(false);
                }
            }
            Event::End(TagEnd::Link) => {
                if open_links.pop().unwrap_or(false) {
                    result.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
                } else {
                    result.push(Event::End(TagEnd::Link));
                }
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = match visitor.visit_image(&dest_url) {
                    Some(new) => CowStr::from(new),
                    None => dest_url,
                };
                result.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }));
            }
            other => result.push(other),
        }
    }

    result
}

fn anchor_open(href: &str, title: &str) -> String {
    // Escaped the same way pulldown-cmark writes other links. Writing to a
    // String never fails.
    let mut tag = String::from(r#"<a href=""#);
    let _ = escape_href(&mut tag, href);
    tag.push('"');
    if !title.is_empty() {
        tag.push_str(r#" title=""#);
        let _ = escape_html(&mut tag, title);
        tag.push('"');
    }
    tag.push_str(r#" target="_blank" rel="noopener">"#);
    tag
}
