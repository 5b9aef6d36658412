//! # ddpub-render
//!
//! Turns a [`ddpub_core::Store`] into HTML pages and an RSS feed, and
//! registers them together with file attachments in a route table.

pub mod pages;
pub mod router;
pub mod rss;
pub mod templates;

#[cfg(test)]
mod test_support;

pub use pages::PageRenderer;
pub use router::{Body, MultiRouter, Payload, RouteTable, Router, RouterError};
pub use rss::render_rss;
