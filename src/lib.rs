//! # Tributary
//!
//! A live RSS aggregator: add feeds by URL, read their posts, and pick up new
//! posts as they are published.
//!
//! ## Architecture
//!
//! ```text
//! submit → Validator → Fetcher → Parser → Reconciler → StateStore → UI
//!                         ↑                                 │
//!                         └────────── Poller ◄──────────────┘
//! ```
//!
//! Everything the UI shows lives in one [`AppState`](domain::AppState) held by
//! the [`StateStore`](store::StateStore). Each change is pushed synchronously
//! to the store's subscribers, which is how the TUI knows to redraw.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI, optionally with feeds to add
//! tributary tui https://blog.rust-lang.org/feed.xml
//!
//! # Load a feed once and print its posts
//! tributary add https://blog.rust-lang.org/feed.xml
//!
//! # Print new posts as they appear
//! tributary watch https://blog.rust-lang.org/feed.xml --interval 1m
//! ```

/// Application context, errors and the add-feed flow.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// fetcher, parser, translator and background poller.
pub mod app;

/// Command-line interface using clap.
///
/// - `tui [URL...]` - Launch the TUI (default)
/// - `add <url>` - Load a feed once and print it
/// - `watch <url>...` - Follow feeds and print new posts
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/tributary/config.toml`, supporting:
/// - Locale, relay proxy, HTTP and poll interval settings
/// - Custom colors (named or hex)
/// - Custom keybindings
pub mod config;

/// Core domain models.
///
/// - [`Feed`](domain::Feed) and [`Post`](domain::Post)
/// - [`AppState`](domain::AppState): process states, feeds, posts and read marks
pub mod domain;

/// Feed fetching, directly or through an allorigins-style relay.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for reading a feed document
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`fetch_all`](fetcher::fetch_all): Issue a batch of fetches concurrently
pub mod fetcher;

/// Message catalogs for user-facing text.
pub mod i18n;

/// RSS document parsing into a [`Feed`](domain::Feed) and its posts.
pub mod parser;

/// Background refresh of every stored feed on a fixed interval.
pub mod poller;

/// Content-based deduplication of parsed feeds and posts against the store.
pub mod reconciler;

/// The observed application state.
pub mod store;

/// Terminal user interface.
///
/// Input line with feedback, then feeds, posts and preview panes.
///
/// Keybindings: a or / focuses the input, j/k navigate, Tab cycles panes,
/// Enter selects, r marks read, o opens in browser, q quits.
pub mod tui;

/// Feed URL validation.
pub mod validator;
