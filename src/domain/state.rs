use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Feed, Post};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddingState {
    #[default]
    Idle,
    Validating,
    Loading,
    Parsing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatingState {
    #[default]
    Idle,
    Invalid,
    Valid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadingState {
    #[default]
    Idle,
    Started,
    Loaded,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsingState {
    #[default]
    Idle,
    Started,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdatingState {
    #[default]
    Idle,
    Started,
}

/// Progress of the feed submission flow plus the messages shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddingProcess {
    pub state: AddingState,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatingProcess {
    pub state: UpdatingState,
    pub cycles: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedState {
    pub adding_process: AddingProcess,
    pub validating_process: ValidatingState,
    pub loading_process: LoadingState,
    pub parsing_process: ParsingState,
    pub updating_process: UpdatingProcess,
    /// Most recent first.
    pub feeds: Vec<Feed>,
    /// Most recent first.
    pub posts: Vec<Post>,
}

impl FeedState {
    /// Whether a submission is in flight and the form should refuse another.
    ///
    /// A failed fetch or parse leaves `adding_process` where it stopped, so
    /// the sub-process decides.
    pub fn is_submitting(&self) -> bool {
        match self.adding_process.state {
            AddingState::Loading => self.loading_process == LoadingState::Started,
            AddingState::Parsing => self.parsing_process == ParsingState::Started,
            AddingState::Idle | AddingState::Validating => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub read_posts: HashSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub feed: FeedState,
    pub ui_state: UiState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_post_read(&self, post_id: &str) -> bool {
        self.ui_state.read_posts.contains(post_id)
    }

    pub fn posts_for_feed<'a>(&'a self, feed_url: &'a str) -> impl Iterator<Item = &'a Post> + 'a {
        self.feed
            .posts
            .iter()
            .filter(move |post| post.feed_url == feed_url)
    }

    pub fn unread_count(&self, feed_url: &str) -> usize {
        self.posts_for_feed(feed_url)
            .filter(|post| !self.is_post_read(&post.id))
            .count()
    }

    /// A submission finished successfully: parsing went through and the
    /// flow returned to idle.
    pub fn submission_succeeded(&self) -> bool {
        let feed = &self.feed;
        feed.adding_process.state == AddingState::Idle
            && feed.validating_process == ValidatingState::Valid
            && feed.loading_process == LoadingState::Loaded
            && feed.parsing_process == ParsingState::Idle
    }
}
