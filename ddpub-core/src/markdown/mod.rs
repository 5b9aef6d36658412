//! Markdown parsing and rendering.
//!
//! The `pulldown-cmark` event stream serves as the document tree: it is
//! collected into a `Vec<Event>`, passed through transformers and rendered
//! to HTML.

pub mod links;

use pulldown_cmark::{html, Event, Options, Parser};

pub use links::{rewrite_links, LinkRewrite, LinkVisitor};

/// Markdown engine configured with the extensions notes may use.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownEngine {
    options: Options,
}

impl Default for MarkdownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownEngine {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self { options }
    }

    pub fn parse<'a>(&self, markdown: &'a str) -> Vec<Event<'a>> {
        Parser::new_ext(markdown, self.options).collect()
    }

    pub fn render<'a>(&self, events: impl IntoIterator<Item = Event<'a>>) -> String {
        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Parse, rewrite links and images with `visitor`, and render.
    pub fn to_html<V: LinkVisitor>(&self, markdown: &str, visitor: &mut V) -> String {
        let events = self.parse(markdown);
        let events = rewrite_links(events, visitor);
        self.render(events)
    }
}
