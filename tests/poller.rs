mod common;

use std::collections::HashSet;
use std::time::Duration;

use tributary::app::submit;
use tributary::domain::LoadingState;
use tributary::i18n::Locale;
use tributary::poller::{Poller, PollerConfig};

use common::{context, context_with, rss, ScriptedFetcher};

const A: &str = "https://a.example.com/rss";
const B: &str = "https://b.example.com/rss";
const C: &str = "https://c.example.com/rss";

fn poller_for(ctx: &tributary::app::AppContext) -> Poller {
    Poller::new(
        ctx.store.clone(),
        ctx.fetcher.clone(),
        ctx.parser.clone(),
        ctx.poller_config,
    )
}

fn post_titles(ctx: &tributary::app::AppContext) -> Vec<String> {
    ctx.store
        .read(|state| state.feed.posts.iter().map(|p| p.title.clone()).collect())
}

#[tokio::test]
async fn cycle_prepends_only_new_posts() {
    let fetcher = ScriptedFetcher::new();
    fetcher.serve(A, rss("A", &[("a1", "https://a.example.com/1")]));
    let ctx = context(fetcher.clone());
    submit(&ctx, A).await.unwrap();
    let poller = poller_for(&ctx);

    let unchanged = poller.run_cycle().await;
    assert_eq!(unchanged.feeds, 1);
    assert_eq!(unchanged.new_posts, 0);
    assert_eq!(unchanged.errors, 0);
    assert_eq!(post_titles(&ctx), vec!["a1"]);

    fetcher.serve(
        A,
        rss(
            "A",
            &[("a2", "https://a.example.com/2"), ("a1", "https://a.example.com/1")],
        ),
    );
    let report = poller.run_cycle().await;
    assert_eq!(report.new_posts, 1);
    assert_eq!(report.new_feeds, 0);
    assert_eq!(post_titles(&ctx), vec!["a2", "a1"]);
    assert_eq!(ctx.store.feeds().len(), 1);
    assert_eq!(ctx.store.snapshot().feed.updating_process.cycles, 2);

    ctx.shutdown().await;
}

#[tokio::test]
async fn failing_feeds_do_not_abort_the_batch() {
    let fetcher = ScriptedFetcher::new();
    for (url, title) in [(A, "A"), (B, "B"), (C, "C")] {
        fetcher.serve(url, rss(title, &[]));
    }
    let ctx = context(fetcher.clone());
    for url in [A, B, C] {
        submit(&ctx, url).await.unwrap();
    }

    fetcher.fail(A);
    fetcher.serve(B, "<rss><channel>");
    fetcher.serve(C, rss("C", &[("c1", "https://c.example.com/1")]));

    let report = poller_for(&ctx).run_cycle().await;
    assert_eq!(report.feeds, 3);
    assert_eq!(report.errors, 2);
    assert_eq!(report.new_posts, 1);
    assert_eq!(post_titles(&ctx), vec!["c1"]);

    // Poll failures never reach the submission state.
    let state = ctx.store.snapshot();
    assert_eq!(state.feed.loading_process, LoadingState::Loaded);
    assert!(state.feed.adding_process.errors.is_empty());

    ctx.shutdown().await;
}

#[tokio::test]
async fn changed_channel_title_updates_feed_in_place() {
    let fetcher = ScriptedFetcher::new();
    fetcher.serve(A, rss("Old name", &[]));
    let ctx = context(fetcher.clone());
    submit(&ctx, A).await.unwrap();
    let id = ctx.store.feeds()[0].id.clone();

    fetcher.serve(A, rss("New name", &[]));
    let report = poller_for(&ctx).run_cycle().await;

    assert_eq!(report.updated_feeds, 1);
    let feeds = ctx.store.feeds();
    assert_eq!(feeds.len(), 1);
    assert_eq!(feeds[0].id, id);
    assert_eq!(feeds[0].title, "New name");

    ctx.shutdown().await;
}

#[tokio::test]
async fn concurrent_submission_and_poll_keep_both_merges() {
    let fetcher = ScriptedFetcher::new();
    fetcher.serve(A, rss("A", &[("a1", "https://a.example.com/1")]));
    fetcher.serve(B, rss("B", &[("b1", "https://b.example.com/1")]));
    let ctx = context(fetcher.clone());
    submit(&ctx, A).await.unwrap();

    let gate = fetcher.hold(B);
    let pending = tokio::spawn({
        let ctx = ctx.clone();
        async move { submit(&ctx, B).await }
    });
    while ctx.store.read(|s| s.feed.loading_process) != LoadingState::Started {
        tokio::task::yield_now().await;
    }

    // The poll cycle completes while the submission's fetch is in flight.
    fetcher.serve(
        A,
        rss(
            "A",
            &[("a2", "https://a.example.com/2"), ("a1", "https://a.example.com/1")],
        ),
    );
    let report = poller_for(&ctx).run_cycle().await;
    assert_eq!(report.new_posts, 1);

    gate.notify_one();
    let outcome = pending.await.unwrap().unwrap();
    assert_eq!(outcome.new_posts, 1);

    let titles: HashSet<_> = post_titles(&ctx).into_iter().collect();
    let expected: HashSet<_> = ["a1", "a2", "b1"].into_iter().map(String::from).collect();
    assert_eq!(titles, expected);
    assert_eq!(ctx.store.feeds().len(), 2);

    ctx.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn background_poller_reschedules_itself() {
    let fetcher = ScriptedFetcher::new();
    fetcher.serve(A, rss("A", &[("a1", "https://a.example.com/1")]));
    let ctx = context_with(fetcher.clone(), Locale::En, Duration::from_secs(5));
    submit(&ctx, A).await.unwrap();
    assert!(ctx.poller_running());

    // First cycle fails; the loop keeps going.
    fetcher.fail(A);
    tokio::time::sleep(Duration::from_millis(5500)).await;
    assert_eq!(ctx.store.snapshot().feed.updating_process.cycles, 1);

    fetcher.serve(
        A,
        rss(
            "A",
            &[("a2", "https://a.example.com/2"), ("a1", "https://a.example.com/1")],
        ),
    );
    tokio::time::sleep(Duration::from_secs(5)).await;

    let state = ctx.store.snapshot();
    assert_eq!(state.feed.updating_process.cycles, 2);
    assert!(state.feed.updating_process.last_cycle_at.is_some());
    assert_eq!(post_titles(&ctx), vec!["a2", "a1"]);

    ctx.shutdown().await;
    assert!(!ctx.poller_running());
}

#[tokio::test(start_paused = true)]
async fn stop_wakes_a_sleeping_poller() {
    let fetcher = ScriptedFetcher::new();
    let ctx = context_with(fetcher.clone(), Locale::En, Duration::from_secs(3600));

    let handle = Poller::new(
        ctx.store.clone(),
        ctx.fetcher.clone(),
        ctx.parser.clone(),
        PollerConfig {
            interval: Duration::from_secs(3600),
        },
    )
    .spawn();
    tokio::task::yield_now().await;
    assert!(!handle.is_stopped());

    handle.stop();
    assert!(handle.is_stopped());
    tokio::time::timeout(Duration::from_secs(1), handle.join())
        .await
        .expect("poller did not stop");

    assert!(fetcher.calls().is_empty());
    assert_eq!(ctx.store.snapshot().feed.updating_process.cycles, 0);
}
