//! Askama template definitions.

use askama::Template;

/// Everything the base layout needs besides the page content.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Value of `<html lang>`.
    pub lang: String,
    pub page_title: String,
    pub site_title: String,
    /// Open Graph object type.
    pub og_type: &'static str,
    /// Absolute URL of the page.
    pub url: String,
    pub locale: String,
    /// Absolute URL of the Open Graph preview image, if the site has one.
    pub og_image: Option<String>,
    pub twitter: Option<String>,
    pub theme_url: String,
    pub favicon_url: String,
    pub rss_url: String,
    pub home_url: String,
    pub head_suffix: String,
    pub menu: Vec<MenuLink>,
    pub footer_prefix: String,
    pub powered_by: String,
}

impl Layout {
    /// `<title>` text: page title and site title, or the site title alone.
    pub fn full_title(&self) -> String {
        if self.page_title.is_empty() || self.page_title == self.site_title {
            self.site_title.clone()
        } else {
            format!("{} — {}", self.page_title, self.site_title)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLink {
    pub title: String,
    pub url: String,
    pub external: bool,
}

/// A link to a tag page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLink {
    pub title: String,
    pub url: String,
}

/// A note in a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListItem {
    pub title: String,
    pub url: String,
    /// Localized date.
    pub date: String,
    /// Machine-readable date for `<time datetime>`.
    pub datetime: String,
}

/// A tag on the tags page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagListItem {
    pub title: String,
    pub url: String,
    pub count: usize,
}

/// Standalone page: homepage note or a page-tagged note.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub layout: Layout,
    pub title: String,
    pub content: String,
}

/// Feed note with date and tags.
#[derive(Template)]
#[template(path = "note.html")]
pub struct NoteTemplate {
    pub layout: Layout,
    pub title: String,
    pub published: String,
    pub datetime: String,
    pub content: String,
    pub tags: Vec<TagLink>,
    pub suffix: String,
}

/// Feed page or tag page: optional intro followed by a note list.
#[derive(Template)]
#[template(path = "list.html")]
pub struct ListTemplate {
    pub layout: Layout,
    pub heading: String,
    pub intro: Option<String>,
    pub notes: Vec<NoteListItem>,
}

#[derive(Template)]
#[template(path = "tags.html")]
pub struct TagsTemplate {
    pub layout: Layout,
    pub heading: String,
    pub tags: Vec<TagListItem>,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub layout: Layout,
    pub heading: String,
    pub domain: String,
    pub placeholder: String,
    pub button: String,
}
