use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use crate::app::Result;
use crate::domain::{AddingState, AppState, Feed, LoadingState, ParsingState, Post, ValidatingState};
use crate::i18n::Translator;
use crate::store::MergeOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Input,
    Feeds,
    Posts,
    Preview,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Input => ActivePane::Feeds,
            ActivePane::Feeds => ActivePane::Posts,
            ActivePane::Posts => ActivePane::Preview,
            ActivePane::Preview => ActivePane::Input,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActivePane::Input => ActivePane::Preview,
            ActivePane::Feeds => ActivePane::Input,
            ActivePane::Posts => ActivePane::Feeds,
            ActivePane::Preview => ActivePane::Posts,
        }
    }
}

/// The line under the input, derived from the submission state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    None,
    Pending(String),
    Error(String),
    Success(String),
}

impl Feedback {
    pub fn from_state(state: &AppState, t: &dyn Translator) -> Self {
        let feed = &state.feed;

        if feed.validating_process == ValidatingState::Invalid {
            return Feedback::Error(feed.adding_process.errors.join("\n"));
        }
        if feed.loading_process == LoadingState::Error {
            return Feedback::Error(t.t("errorsMessages.networkError"));
        }
        if feed.parsing_process == ParsingState::Error {
            return Feedback::Error(t.t("errorsMessages.invalidRSS"));
        }
        if state.submission_succeeded() {
            return Feedback::Success(t.t("successMessages.loadedRSS"));
        }

        match feed.adding_process.state {
            AddingState::Loading => Feedback::Pending(t.t("statusMessages.loading")),
            AddingState::Parsing => Feedback::Pending(t.t("statusMessages.parsing")),
            AddingState::Idle | AddingState::Validating => Feedback::None,
        }
    }
}

pub const PAGE_SIZE: usize = 10;

pub struct TuiApp {
    /// Latest store snapshot.
    pub state: AppState,
    pub active_pane: ActivePane,
    pub input: String,
    /// Show only posts from this feed url.
    pub feed_filter: Option<String>,
    pub feed_index: usize,
    pub post_index: usize,
    pub preview_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub maximized: bool,
    pub feed_list_state: ListState,
    pub post_list_state: ListState,
    pub submission: Option<JoinHandle<Result<MergeOutcome>>>,
}

impl TuiApp {
    pub fn new(state: AppState) -> Self {
        let mut feed_list_state = ListState::default();
        feed_list_state.select(Some(0));
        let mut post_list_state = ListState::default();
        post_list_state.select(Some(0));

        Self {
            state,
            active_pane: ActivePane::Input,
            input: String::new(),
            feed_filter: None,
            feed_index: 0,
            post_index: 0,
            preview_scroll: 0,
            should_quit: false,
            status_message: None,
            maximized: false,
            feed_list_state,
            post_list_state,
            submission: None,
        }
    }

    /// Replace the snapshot and keep selections in range. Entering the
    /// success state resets the form, whoever started the submission.
    pub fn sync(&mut self, state: AppState) {
        let selected_post = self.selected_post().map(|p| p.id.clone());
        let succeeded = !self.state.submission_succeeded() && state.submission_succeeded();
        self.state = state;
        if succeeded {
            self.input.clear();
        }

        self.feed_index = clamp(self.feed_index, self.state.feed.feeds.len());
        self.feed_list_state.select(Some(self.feed_index));

        // New posts are prepended; follow the selected post rather than
        // its old position.
        let post_index = {
            let posts = self.visible_posts();
            selected_post
                .and_then(|id| posts.iter().position(|p| p.id == id))
                .unwrap_or_else(|| clamp(self.post_index, posts.len()))
        };
        self.post_index = post_index;
        self.post_list_state.select(Some(self.post_index));
    }

    pub fn feedback(&self, t: &dyn Translator) -> Feedback {
        Feedback::from_state(&self.state, t)
    }

    /// Whether the form accepts a submission right now.
    pub fn can_submit(&self) -> bool {
        self.submission.is_none() && !self.state.feed.is_submitting()
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.state.feed.feeds
    }

    pub fn visible_posts(&self) -> Vec<&Post> {
        match &self.feed_filter {
            Some(url) => self.state.posts_for_feed(url).collect(),
            None => self.state.feed.posts.iter().collect(),
        }
    }

    pub fn selected_feed(&self) -> Option<&Feed> {
        self.state.feed.feeds.get(self.feed_index)
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.visible_posts().get(self.post_index).copied()
    }

    pub fn is_post_read(&self, post_id: &str) -> bool {
        self.state.is_post_read(post_id)
    }

    /// Show only the selected feed's posts; selecting it again shows all.
    pub fn toggle_feed_filter(&mut self) {
        let Some(url) = self.selected_feed().map(|f| f.url.clone()) else {
            return;
        };
        if self.feed_filter.as_deref() == Some(url.as_str()) {
            self.feed_filter = None;
        } else {
            self.feed_filter = Some(url);
        }
        self.post_index = 0;
        self.post_list_state.select(Some(0));
        self.preview_scroll = 0;
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Input => {}
            ActivePane::Feeds => {
                if self.feed_index > 0 {
                    self.feed_index -= 1;
                    self.feed_list_state.select(Some(self.feed_index));
                }
            }
            ActivePane::Posts => {
                if self.post_index > 0 {
                    self.post_index -= 1;
                    self.post_list_state.select(Some(self.post_index));
                    self.preview_scroll = 0;
                }
            }
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_sub(1);
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Input => {}
            ActivePane::Feeds => {
                if self.feed_index + 1 < self.state.feed.feeds.len() {
                    self.feed_index += 1;
                    self.feed_list_state.select(Some(self.feed_index));
                }
            }
            ActivePane::Posts => {
                if self.post_index + 1 < self.visible_posts().len() {
                    self.post_index += 1;
                    self.post_list_state.select(Some(self.post_index));
                    self.preview_scroll = 0;
                }
            }
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_add(1);
            }
        }
    }

    pub fn next_page(&mut self) {
        match self.active_pane {
            ActivePane::Input => {}
            ActivePane::Feeds => {
                let max_index = self.state.feed.feeds.len().saturating_sub(1);
                self.feed_index = (self.feed_index + PAGE_SIZE).min(max_index);
                self.feed_list_state.select(Some(self.feed_index));
            }
            ActivePane::Posts => {
                let max_index = self.visible_posts().len().saturating_sub(1);
                let new_index = (self.post_index + PAGE_SIZE).min(max_index);
                if new_index != self.post_index {
                    self.post_index = new_index;
                    self.post_list_state.select(Some(self.post_index));
                    self.preview_scroll = 0;
                }
            }
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_add(PAGE_SIZE as u16);
            }
        }
    }

    pub fn prev_page(&mut self) {
        match self.active_pane {
            ActivePane::Input => {}
            ActivePane::Feeds => {
                self.feed_index = self.feed_index.saturating_sub(PAGE_SIZE);
                self.feed_list_state.select(Some(self.feed_index));
            }
            ActivePane::Posts => {
                let new_index = self.post_index.saturating_sub(PAGE_SIZE);
                if new_index != self.post_index {
                    self.post_index = new_index;
                    self.post_list_state.select(Some(self.post_index));
                    self.preview_scroll = 0;
                }
            }
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_sub(PAGE_SIZE as u16);
            }
        }
    }

    pub fn toggle_maximize(&mut self) {
        self.maximized = !self.maximized;
        if self.maximized {
            self.active_pane = ActivePane::Preview;
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    /// Collect a finished submission and report its outcome.
    pub async fn finish_submission(&mut self) {
        if !self.submission.as_ref().is_some_and(|h| h.is_finished()) {
            return;
        }
        let Some(handle) = self.submission.take() else {
            return;
        };

        match handle.await {
            Ok(Ok(outcome)) => {
                self.set_status(format!("{} new posts", outcome.new_posts));
            }
            // Shown on the feedback line from the store state.
            Ok(Err(_)) => {}
            Err(e) => tracing::error!("Submission task failed: {}", e),
        }
    }
}

fn clamp(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{Catalog, Locale};

    fn state_with_posts() -> AppState {
        let mut state = AppState::new();
        state.feed.feeds = vec![
            Feed::new("https://a.io/rss", "A", ""),
            Feed::new("https://b.io/rss", "B", ""),
        ];
        state.feed.posts = vec![
            Post::new("https://a.io/rss", "a2", "", "https://a.io/2"),
            Post::new("https://b.io/rss", "b1", "", "https://b.io/1"),
            Post::new("https://a.io/rss", "a1", "", "https://a.io/1"),
        ];
        state
    }

    #[test]
    fn test_feedback_follows_state() {
        let t = Catalog::new(Locale::En);
        let mut state = AppState::new();
        assert_eq!(Feedback::from_state(&state, &t), Feedback::None);

        state.feed.adding_process.state = AddingState::Loading;
        state.feed.loading_process = LoadingState::Started;
        assert_eq!(
            Feedback::from_state(&state, &t),
            Feedback::Pending("Loading...".to_string())
        );

        state.feed.loading_process = LoadingState::Error;
        assert_eq!(
            Feedback::from_state(&state, &t),
            Feedback::Error("Network error".to_string())
        );

        state.feed.adding_process.state = AddingState::Validating;
        state.feed.loading_process = LoadingState::Idle;
        state.feed.validating_process = ValidatingState::Invalid;
        state.feed.adding_process.errors = vec!["RSS already exists".to_string()];
        assert_eq!(
            Feedback::from_state(&state, &t),
            Feedback::Error("RSS already exists".to_string())
        );

        state.feed.adding_process = Default::default();
        state.feed.validating_process = ValidatingState::Valid;
        state.feed.loading_process = LoadingState::Loaded;
        assert_eq!(
            Feedback::from_state(&state, &t),
            Feedback::Success("RSS loaded successfully".to_string())
        );
    }

    #[test]
    fn test_feed_filter_toggles() {
        let mut app = TuiApp::new(state_with_posts());
        assert_eq!(app.visible_posts().len(), 3);

        app.toggle_feed_filter();
        let titles: Vec<_> = app.visible_posts().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["a2", "a1"]);

        app.toggle_feed_filter();
        assert_eq!(app.visible_posts().len(), 3);
    }

    #[test]
    fn test_sync_keeps_selected_post_when_posts_are_prepended() {
        let state = state_with_posts();
        let mut app = TuiApp::new(state.clone());
        app.active_pane = ActivePane::Posts;
        app.move_down();
        assert_eq!(app.selected_post().unwrap().title, "b1");

        let mut next = state;
        next.feed
            .posts
            .insert(0, Post::new("https://b.io/rss", "b2", "", "https://b.io/2"));
        app.sync(next);

        assert_eq!(app.selected_post().unwrap().title, "b1");
        assert_eq!(app.post_index, 2);
    }

    #[test]
    fn test_sync_clamps_indices() {
        let mut app = TuiApp::new(state_with_posts());
        app.feed_index = 1;
        app.post_index = 2;
        app.sync(AppState::new());
        assert_eq!(app.feed_index, 0);
        assert_eq!(app.post_index, 0);
        assert!(app.selected_post().is_none());
    }

    #[test]
    fn test_success_state_resets_input() {
        let mut app = TuiApp::new(AppState::new());
        app.input = "https://a.io/rss".to_string();

        let mut loading = AppState::new();
        loading.feed.adding_process.state = AddingState::Loading;
        loading.feed.validating_process = ValidatingState::Valid;
        loading.feed.loading_process = LoadingState::Started;
        app.sync(loading);
        assert_eq!(app.input, "https://a.io/rss");

        let mut done = state_with_posts();
        done.feed.validating_process = ValidatingState::Valid;
        done.feed.loading_process = LoadingState::Loaded;
        app.sync(done.clone());
        assert!(app.input.is_empty());

        // Typing after a success survives later snapshots.
        app.input = "https://b.io/rss".to_string();
        app.sync(done);
        assert_eq!(app.input, "https://b.io/rss");
    }

    #[test]
    fn test_failed_submission_keeps_input() {
        let mut app = TuiApp::new(AppState::new());
        app.input = "https://a.io/rss".to_string();

        let mut failed = AppState::new();
        failed.feed.adding_process.state = AddingState::Loading;
        failed.feed.validating_process = ValidatingState::Valid;
        failed.feed.loading_process = LoadingState::Error;
        app.sync(failed);
        assert_eq!(app.input, "https://a.io/rss");
    }

    #[test]
    fn test_can_submit_blocked_while_loading() {
        let mut app = TuiApp::new(AppState::new());
        assert!(app.can_submit());

        let mut state = AppState::new();
        state.feed.adding_process.state = AddingState::Loading;
        state.feed.loading_process = LoadingState::Started;
        app.sync(state);
        assert!(!app.can_submit());
    }
}
