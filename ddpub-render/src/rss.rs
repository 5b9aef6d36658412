//! RSS 2.0 feed of a website variant.

use ddpub_core::Store;

/// Render the feed notes of `store` as RSS, newest first.
pub fn render_rss(store: &Store) -> String {
    let config = store.config();
    let notes = store.feed_notes();

    let mut items = String::new();
    for note in &notes {
        let link = config.absolute_url(&config.url_for_feed_note(&note.meta.slug));
        items.push_str(&format!(
            "<item><title>{}</title><link>{}</link><guid>{}</guid><pubDate>{}</pubDate><description>{}</description></item>",
            escape_xml(&note.meta.title),
            escape_xml(&link),
            escape_xml(&link),
            note.meta.date.to_rfc2822(),
            escape_xml(&note.html),
        ));
    }

    // Newest item date keeps the output stable between runs.
    let last_build = notes
        .first()
        .map(|n| format!("\n    <lastBuildDate>{}</lastBuildDate>", n.meta.date.to_rfc2822()))
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>{}</title>
    <link>{}</link>
    <description>{}</description>
    <language>{}</language>{}
    {}
  </channel>
</rss>
"#,
        escape_xml(&config.title),
        escape_xml(&config.absolute_url(&config.url_for_home_page())),
        escape_xml(&config.feed.title),
        config.language.code.full(),
        last_build,
        items
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
