use std::collections::HashSet;
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::app::{submit, AppContext, Result};
use crate::domain::{AppState, Post};
use crate::poller::format_interval;

pub async fn add_feed(ctx: &AppContext, url: &str) -> Result<()> {
    let result = submit(ctx, url).await;
    ctx.shutdown().await;

    if let Err(e) = result {
        eprintln!("{}", ctx.translator.t(e.message_key()));
        return Err(e);
    }

    println!("{}", ctx.translator.t("successMessages.loadedRSS"));

    let state = ctx.store.snapshot();
    for feed in &state.feed.feeds {
        println!("\n{}\n  {}", feed.display_title(), feed.url);
        if !feed.description.trim().is_empty() {
            println!("  {}", feed.description.trim());
        }
    }

    println!();
    for post in &state.feed.posts {
        print_post(post);
    }
    println!("\n{} posts", state.feed.posts.len());

    Ok(())
}

/// Submit every url, then print new posts as the poller finds them until
/// Ctrl-C.
pub async fn watch_feeds(ctx: &AppContext, urls: &[String]) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<Post>>();
    let seen = Mutex::new(HashSet::new());
    ctx.store.subscribe(move |state: &AppState| {
        let mut seen = seen.lock().unwrap_or_else(|e| e.into_inner());
        let fresh: Vec<Post> = state
            .feed
            .posts
            .iter()
            .rev()
            .filter(|post| seen.insert(post.id.clone()))
            .cloned()
            .collect();
        if !fresh.is_empty() {
            let _ = tx.send(fresh);
        }
    });

    let mut added = 0;
    for url in urls {
        match submit(ctx, url).await {
            Ok(_) => added += 1,
            Err(e) => eprintln!("{}: {}", url, ctx.translator.t(e.message_key())),
        }
    }

    if added == 0 {
        println!("No feeds to watch");
        return Ok(());
    }

    println!(
        "Watching {} feeds (refresh every {}). Press Ctrl-C to stop.",
        added,
        format_interval(ctx.poller_config.interval)
    );

    let mut printed = 0;
    loop {
        tokio::select! {
            batch = rx.recv() => match batch {
                Some(posts) => {
                    printed += posts.len();
                    for post in &posts {
                        print_post(post);
                    }
                }
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    ctx.shutdown().await;
    println!("\nStopped after {} posts", printed);
    Ok(())
}

fn print_post(post: &Post) {
    println!("● {}", post.display_title());
    if let Some(link) = post.link() {
        println!("    {}", link);
    }
}
