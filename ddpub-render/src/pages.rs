//! Rendering the HTML pages of one website variant.

use crate::templates::{
    Layout, ListTemplate, MenuLink, NoteListItem, NoteTemplate, PageTemplate, SearchTemplate,
    TagLink, TagListItem, TagsTemplate,
};
use askama::Template;
use ddpub_core::assets::OG_IMAGE;
use ddpub_core::{Key, MenuEntry, NoteContent, PublishedTag, SharedFile, Store, WebsiteConfig};
use ddpub_types::Builtin;

const THEME_CSS: &str = "theme.css";
const FAVICON_SVG: &str = "favicon.svg";

/// Renders pages from a store. Every method takes the page's path, which
/// becomes its Open Graph URL.
pub struct PageRenderer<'a> {
    store: &'a Store,
    menu: Vec<MenuLink>,
    og_image: Option<String>,
}

impl<'a> PageRenderer<'a> {
    pub fn new(store: &'a Store, shared_files: &[SharedFile]) -> Self {
        let config = store.config();
        let og_image = shared_files
            .iter()
            .any(|f| f.filename == OG_IMAGE)
            .then(|| config.absolute_url(&config.url_for_shared_file(OG_IMAGE)));

        Self {
            menu: menu_links(store),
            og_image,
            store,
        }
    }

    fn config(&self) -> &WebsiteConfig {
        self.store.config()
    }

    fn layout(&self, path: &str, page_title: &str, og_type: &'static str) -> Layout {
        let config = self.config();
        Layout {
            lang: config.language.code.full().to_string(),
            page_title: page_title.to_string(),
            site_title: config.title.clone(),
            og_type,
            url: config.absolute_url(path),
            locale: config.language.code.locale(),
            og_image: self.og_image.clone(),
            twitter: config.twitter.clone(),
            theme_url: config.url_for_shared_file(THEME_CSS),
            favicon_url: config.url_for_shared_file(FAVICON_SVG),
            rss_url: config.url_for_rss_feed(),
            home_url: config.url_for_home_page(),
            head_suffix: config.segments.head_suffix.clone(),
            menu: self.menu.clone(),
            footer_prefix: config.segments.footer_prefix.clone(),
            powered_by: config.str(Key::FooterPoweredBy).to_string(),
        }
    }

    /// A note shown as a standalone page, without date or tags.
    pub fn page(&self, path: &str, note: &NoteContent) -> askama::Result<String> {
        PageTemplate {
            layout: self.layout(path, &note.meta.title, "website"),
            title: note.meta.title.clone(),
            content: note.html.clone(),
        }
        .render()
    }

    /// A feed note with its publication date and published tags.
    pub fn note(&self, path: &str, note: &NoteContent) -> askama::Result<String> {
        let config = self.config();
        let date = note.meta.date.date_naive();
        let tags = self
            .store
            .tags_to_published(&note.meta.tags)
            .into_iter()
            .map(|t| TagLink {
                title: t.title.clone(),
                url: config.url_for_tag(t),
            })
            .collect();

        NoteTemplate {
            layout: self.layout(path, &note.meta.title, "article"),
            title: note.meta.title.clone(),
            published: config.localizer().published_on(date),
            datetime: date.to_string(),
            content: note.html.clone(),
            tags,
            suffix: config.segments.note_suffix.clone(),
        }
        .render()
    }

    /// The builtin feed: optional bound note followed by the feed notes.
    pub fn feed(&self, path: &str) -> askama::Result<String> {
        let config = self.config();
        let intro = config
            .feed
            .id
            .as_ref()
            .and_then(|id| self.store.content(id.as_str()))
            .map(|note| note.html.clone());

        ListTemplate {
            layout: self.layout(path, &config.feed.title, "website"),
            heading: config.feed.title.clone(),
            intro,
            notes: self.note_list(&config.feed.tag),
        }
        .render()
    }

    /// Page of one configured tag.
    pub fn tag(&self, path: &str, tag: &PublishedTag) -> askama::Result<String> {
        let intro = tag
            .id
            .as_ref()
            .and_then(|id| self.store.content(id.as_str()))
            .map(|note| note.html.clone());

        ListTemplate {
            layout: self.layout(path, &tag.title, "website"),
            heading: tag.title.clone(),
            intro,
            notes: self.note_list(&tag.tag),
        }
        .render()
    }

    /// All configured tags, most notes first.
    pub fn tags(&self, path: &str) -> askama::Result<String> {
        let config = self.config();
        let mut tags: Vec<TagListItem> = config
            .tags
            .iter()
            .map(|t| TagListItem {
                title: t.title.clone(),
                url: config.url_for_tag(t),
                count: self.note_list(&t.tag).len(),
            })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count));

        let heading = config.str(Key::TagsTitle).to_string();
        TagsTemplate {
            layout: self.layout(path, &heading, "website"),
            heading,
            tags,
        }
        .render()
    }

    pub fn search(&self, path: &str) -> askama::Result<String> {
        let config = self.config();
        let heading = config.str(Key::SearchTitle).to_string();
        SearchTemplate {
            layout: self.layout(path, &heading, "website"),
            heading,
            domain: config.domain.clone(),
            placeholder: config.str(Key::SearchPlaceholder).to_string(),
            button: config.str(Key::SearchButton).to_string(),
        }
        .render()
    }

    /// Notes carrying `tag` that have a public URL, newest first.
    fn note_list(&self, tag: &str) -> Vec<NoteListItem> {
        let localizer = self.config().localizer();
        self.store
            .notes_for_tag(tag)
            .into_iter()
            .filter_map(|note| {
                let url = self.store.public_url(note.meta.id.as_str())?;
                let date = note.meta.date.date_naive();
                Some(NoteListItem {
                    title: note.meta.title.clone(),
                    url,
                    date: localizer.format_date(date),
                    datetime: date.to_string(),
                })
            })
            .collect()
    }
}

fn menu_links(store: &Store) -> Vec<MenuLink> {
    let config = store.config();
    config
        .menu
        .iter()
        .map(|entry| {
            let (url, external) = match entry {
                MenuEntry::Builtin { builtin, .. } => (config.url_for_builtin(*builtin), false),
                MenuEntry::Note { id, .. } => {
                    let slug = store
                        .metadata(id.as_str())
                        .map_or(id.as_str(), |meta| meta.slug.as_str());
                    (config.url_for_page_note(slug), false)
                }
                MenuEntry::Tag { tag, .. } => (
                    config
                        .url_for_tag_name(tag)
                        .unwrap_or_else(|| config.url_for_builtin(Builtin::Tags)),
                    false,
                ),
                MenuEntry::Url { url, .. } => (url.clone(), url.contains("://")),
            };
            MenuLink {
                title: entry.title().to_string(),
                url,
                external,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{site, MAIN_CONFIG};

    #[test]
    fn test_feed_note_page() {
        let site = site(
            &format!("{MAIN_CONFIG}tags:\n  - tag: rust\n    title: Rust\n"),
            &[(
                "202301011200.md",
                "# Hello world\nTags: #blog #rust #misc\nDate: 2023-03-07\n\nBody text\n",
            )],
        );
        let store = site.store();
        let renderer = PageRenderer::new(&store, &site.shared_files);
        let note = store.content("202301011200").unwrap();

        let html = renderer.note("/feed/202301011200/", note).unwrap();
        assert!(html.contains("<title>Hello world — Notes</title>"));
        assert!(html.contains("Published March 7, 2023"));
        assert!(html.contains(r#"<a href="/tags/rust/">#Rust</a>"#));
        assert!(!html.contains("#misc"));
        assert!(html.contains(r#"content="https://example.com/feed/202301011200/""#));
        assert!(html.contains(r#"<html lang="en-US">"#));
        assert!(html.contains("<p>Body text</p>"));
    }

    #[test]
    fn test_feed_lists_notes_newest_first() {
        let site = site(
            MAIN_CONFIG,
            &[
                ("202301011200.md", "# First\nTags: #blog\nDate: 2023-01-01\n\n"),
                ("202301011300.md", "# Second\nTags: #blog\nDate: 2023-02-01\n\n"),
            ],
        );
        let store = site.store();
        let html = PageRenderer::new(&store, &site.shared_files).feed("/feed/").unwrap();

        let second = html.find("Second").unwrap();
        let first = html.find("First").unwrap();
        assert!(second < first);
        assert!(html.contains(r#"<a href="/feed/202301011200/">First</a>"#));
        assert!(html.contains("January 1, 2023"));
    }

    #[test]
    fn test_tags_page_sorted_by_count() {
        let site = site(
            &format!("{MAIN_CONFIG}tags:\n  - tag: few\n  - tag: many\n"),
            &[
                ("202301011200.md", "# A\nTags: #blog #few #many\n\n"),
                ("202301011300.md", "# B\nTags: #blog #many\n\n"),
            ],
        );
        let store = site.store();
        let html = PageRenderer::new(&store, &site.shared_files).tags("/tags/").unwrap();

        assert!(html.find("/tags/many/").unwrap() < html.find("/tags/few/").unwrap());
        assert!(html.contains(r#"<span class="tag-count">2</span>"#));
    }

    #[test]
    fn test_menu_links() {
        let site = site(
            &format!(
                "{MAIN_CONFIG}pages:\n  tag: page\ntags:\n  - tag: rust\nmenu:\n  - title: Blog\n    builtin: feed\n  - title: About\n    id: \"202301011200\"\n  - title: Rust\n    tag: rust\n  - title: Code\n    url: https://example.org\n"
            ),
            &[("202301011200.md", "# About\nTags: #page\nSlug: about\n\nMe\n")],
        );
        let store = site.store();
        let menu = menu_links(&store);

        let urls: Vec<(&str, bool)> = menu.iter().map(|m| (m.url.as_str(), m.external)).collect();
        assert_eq!(
            urls,
            vec![
                ("/feed/", false),
                ("/about/", false),
                ("/tags/rust/", false),
                ("https://example.org", true),
            ]
        );
    }

    #[test]
    fn test_og_image_meta_tag() {
        let site = site(MAIN_CONFIG, &[]);
        let store = site.store();

        let html = PageRenderer::new(&store, &site.shared_files).tags("/tags/").unwrap();
        assert!(!html.contains("og:image"));

        let mut shared_files = site.shared_files.clone();
        shared_files.push(SharedFile {
            filename: OG_IMAGE,
            content: b"\xff\xd8\xff".to_vec(),
            content_type: "image/jpeg",
        });
        let html = PageRenderer::new(&store, &shared_files).tags("/tags/").unwrap();
        assert!(html.contains(r#"<meta property="og:image" content="https://example.com/og.jpg">"#));
    }

    #[test]
    fn test_search_page_targets_domain() {
        let site = site(MAIN_CONFIG, &[]);
        let store = site.store();
        let html = PageRenderer::new(&store, &site.shared_files).search("/search/").unwrap();
        assert!(html.contains(r#"name="sites" value="example.com""#));
    }
}
