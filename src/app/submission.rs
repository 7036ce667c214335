//! The add-feed flow.
//!
//! ```text
//! idle -> validating -> invalid
//!                    -> loading -> error
//!                               -> loaded -> parsing -> error
//!                                                    -> idle (merged)
//! ```
//!
//! Every step is published through the store, so a subscriber sees each
//! intermediate state and not just the outcome.

use tracing::{info, warn};

use crate::app::context::AppContext;
use crate::app::error::Result;
use crate::domain::{AddingState, LoadingState, ParsingState, ValidatingState};
use crate::store::MergeOutcome;
use crate::validator;

/// Validate, fetch, parse and merge the feed at `input`.
///
/// Every failure is also recorded in the store before it is returned, so
/// the caller may ignore the error. The first successful merge starts the
/// background poller.
pub async fn submit(ctx: &AppContext, input: &str) -> Result<MergeOutcome> {
    let store = &ctx.store;

    store.update(|state| {
        let feed = &mut state.feed;
        feed.adding_process.state = AddingState::Validating;
        feed.validating_process = ValidatingState::Idle;
        feed.loading_process = LoadingState::Idle;
        feed.parsing_process = ParsingState::Idle;
    });

    let validated = store.read(|state| {
        validator::validate(input, &state.feed.feeds).map(str::to_string)
    });
    let url = match validated {
        Ok(url) => url,
        Err(e) => {
            info!("Rejected feed {:?}: {}", input, e);
            let message = ctx.translator.t(e.message_key());
            store.update(|state| {
                state.feed.validating_process = ValidatingState::Invalid;
                state.feed.adding_process.errors = vec![message];
            });
            return Err(e.into());
        }
    };

    store.update(|state| {
        let feed = &mut state.feed;
        feed.validating_process = ValidatingState::Valid;
        feed.adding_process.state = AddingState::Loading;
        feed.adding_process.errors.clear();
        feed.loading_process = LoadingState::Started;
    });

    let body = match ctx.fetcher.fetch(&url).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to load {}: {}", url, e);
            store.update(|state| state.feed.loading_process = LoadingState::Error);
            return Err(e);
        }
    };

    store.update(|state| {
        let feed = &mut state.feed;
        feed.loading_process = LoadingState::Loaded;
        feed.adding_process.state = AddingState::Parsing;
        feed.parsing_process = ParsingState::Started;
    });

    let parsed = match ctx.parser.parse(&url, &body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to parse {}: {}", url, e);
            store.update(|state| state.feed.parsing_process = ParsingState::Error);
            return Err(e);
        }
    };

    let outcome = store.merge(parsed);
    store.update(|state| {
        state.feed.adding_process.state = AddingState::Idle;
        state.feed.parsing_process = ParsingState::Idle;
    });
    info!("Added feed {} ({} new posts)", url, outcome.new_posts);

    if ctx.ensure_poller() {
        info!("Background updates started");
    }

    Ok(outcome)
}
