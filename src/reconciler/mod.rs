//! Content-based reconciliation of freshly parsed records against stored ones.
//!
//! Ids are regenerated on every parse, so records are compared through a
//! projection that leaves the id out. Everything here is pure.

use crate::domain::{Feed, Post};
use crate::parser::ParsedFeed;

/// The part of a [`Post`] that identifies it for deduplication.
#[derive(Debug, PartialEq, Eq)]
pub struct PostContent<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub url: &'a str,
}

impl<'a> From<&'a Post> for PostContent<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            title: &post.title,
            description: &post.description,
            url: &post.url,
        }
    }
}

/// The part of a [`Feed`] compared when a feed is re-fetched.
#[derive(Debug, PartialEq, Eq)]
pub struct FeedContent<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub description: &'a str,
}

impl<'a> From<&'a Feed> for FeedContent<'a> {
    fn from(feed: &'a Feed) -> Self {
        Self {
            url: &feed.url,
            title: &feed.title,
            description: &feed.description,
        }
    }
}

pub fn same_post(a: &Post, b: &Post) -> bool {
    PostContent::from(a) == PostContent::from(b)
}

pub fn same_feed(a: &Feed, b: &Feed) -> bool {
    FeedContent::from(a) == FeedContent::from(b)
}

/// Elements of `incoming` with no `eq`-match in `existing`, in input order.
///
/// An element is also dropped when it matches an earlier element of
/// `incoming`, so the result never holds two equal records.
pub fn difference_by<T, F>(incoming: Vec<T>, existing: &[T], eq: F) -> Vec<T>
where
    F: Fn(&T, &T) -> bool,
{
    let mut novel: Vec<T> = Vec::with_capacity(incoming.len());
    for candidate in incoming {
        let known = existing.iter().any(|e| eq(&candidate, e))
            || novel.iter().any(|n| eq(&candidate, n));
        if !known {
            novel.push(candidate);
        }
    }
    novel
}

/// What a parse result contributes on top of the stored feeds and posts.
#[derive(Debug, Default, Clone)]
pub struct Reconciled {
    /// Feeds whose url is not stored yet.
    pub new_feeds: Vec<Feed>,
    /// Stored feeds (matched by url) whose title or description changed.
    /// Each entry keeps the stored id.
    pub changed_feeds: Vec<Feed>,
    pub new_posts: Vec<Post>,
}

impl Reconciled {
    pub fn is_empty(&self) -> bool {
        self.new_feeds.is_empty() && self.changed_feeds.is_empty() && self.new_posts.is_empty()
    }
}

/// Reconcile one parse result against the stored feeds and posts.
///
/// Feeds are identified by url: an already stored url never yields a second
/// feed, only a metadata refresh when its content differs.
pub fn reconcile(parsed: ParsedFeed, feeds: &[Feed], posts: &[Post]) -> Reconciled {
    let ParsedFeed { feed, posts: parsed_posts } = parsed;

    let mut new_feeds = Vec::new();
    let mut changed_feeds = Vec::new();

    match feeds.iter().find(|stored| stored.url == feed.url) {
        None => new_feeds.push(feed),
        Some(stored) if !same_feed(stored, &feed) => changed_feeds.push(Feed {
            id: stored.id.clone(),
            ..feed
        }),
        Some(_) => {}
    }

    Reconciled {
        new_feeds,
        changed_feeds,
        new_posts: difference_by(parsed_posts, posts, same_post),
    }
}
