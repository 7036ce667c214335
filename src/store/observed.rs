//! The single application state tree and its change notifications.
//!
//! Every mutation goes through [`StateStore::update`]: the closure runs under
//! the state lock, then every subscriber is called synchronously with the
//! resulting state before the lock is released. Notifications are therefore
//! delivered in mutation order and always observe the complete state.
//!
//! Subscribers must not call back into the store.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::domain::{AppState, Feed, UpdatingState};
use crate::parser::ParsedFeed;
use crate::reconciler::{self, Reconciled};

pub type Subscriber = Box<dyn Fn(&AppState) + Send + Sync>;

/// Counts of what a merge added.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub new_feeds: usize,
    pub updated_feeds: usize,
    pub new_posts: usize,
}

impl MergeOutcome {
    pub fn is_empty(&self) -> bool {
        self.new_feeds == 0 && self.updated_feeds == 0 && self.new_posts == 0
    }
}

pub struct StateStore {
    state: Mutex<AppState>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_state(AppState::new())
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Mutex::new(state),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        lock(&self.subscribers).push(Box::new(subscriber));
    }

    /// Apply `mutate` to the state and notify every subscriber.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = lock(&self.state);
        let result = mutate(&mut *state);
        self.publish(&state);
        result
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&*lock(&self.state))
    }

    pub fn snapshot(&self) -> AppState {
        self.read(AppState::clone)
    }

    pub fn feeds(&self) -> Vec<Feed> {
        self.read(|state| state.feed.feeds.clone())
    }

    /// Reconcile `parsed` against the current contents and prepend whatever
    /// is new.
    ///
    /// Reconciliation and insertion happen under one lock, so concurrent
    /// merges never work from a stale view of each other's results.
    /// Subscribers are only notified when something changed.
    pub fn merge(&self, parsed: ParsedFeed) -> MergeOutcome {
        let mut state = lock(&self.state);

        let Reconciled {
            new_feeds,
            changed_feeds,
            new_posts,
        } = reconciler::reconcile(parsed, &state.feed.feeds, &state.feed.posts);

        let outcome = MergeOutcome {
            new_feeds: new_feeds.len(),
            updated_feeds: changed_feeds.len(),
            new_posts: new_posts.len(),
        };
        if outcome.is_empty() {
            return outcome;
        }

        for changed in changed_feeds {
            if let Some(stored) = state.feed.feeds.iter_mut().find(|f| f.id == changed.id) {
                *stored = changed;
            }
        }
        if !new_feeds.is_empty() {
            let feeds = std::mem::take(&mut state.feed.feeds);
            state.feed.feeds = new_feeds.into_iter().chain(feeds).collect();
        }
        if !new_posts.is_empty() {
            let posts = std::mem::take(&mut state.feed.posts);
            state.feed.posts = new_posts.into_iter().chain(posts).collect();
        }

        tracing::debug!(
            "Merged {} new feeds, {} updated feeds, {} new posts",
            outcome.new_feeds,
            outcome.updated_feeds,
            outcome.new_posts
        );

        self.publish(&state);
        outcome
    }

    /// Record `post_id` as read. Returns whether the read set grew.
    ///
    /// The read set only grows; marking twice is a no-op.
    pub fn mark_read(&self, post_id: &str) -> bool {
        let mut state = lock(&self.state);
        if state.ui_state.read_posts.contains(post_id) {
            return false;
        }
        state.ui_state.read_posts.insert(post_id.to_string());
        self.publish(&state);
        true
    }

    /// Flip the updating process to started the first time feeds exist.
    /// Returns true exactly once per store.
    pub fn try_start_polling(&self) -> bool {
        let mut state = lock(&self.state);
        if state.feed.updating_process.state != UpdatingState::Idle || state.feed.feeds.is_empty() {
            return false;
        }
        state.feed.updating_process.state = UpdatingState::Started;
        self.publish(&state);
        true
    }

    /// Record that a poll cycle finished.
    pub fn record_poll_cycle(&self) {
        self.update(|state| {
            let updating = &mut state.feed.updating_process;
            updating.cycles += 1;
            updating.last_cycle_at = Some(Utc::now());
        });
    }

    fn publish(&self, state: &AppState) {
        for subscriber in lock(&self.subscribers).iter() {
            subscriber(state);
        }
    }
}

/// Recovers a lock poisoned by a panicking subscriber.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
