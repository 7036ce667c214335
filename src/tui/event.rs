use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::app::{Result, TributaryError};

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Terminal events and a periodic tick, read on a background task so the
/// runtime keeps driving fetches and the poller while the UI waits.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    _task: JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut ticks = tokio::time::interval(tick_rate);

            loop {
                let event = tokio::select! {
                    _ = ticks.tick() => AppEvent::Tick,
                    next = reader.next() => match next {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            AppEvent::Key(key)
                        }
                        Some(Ok(Event::Resize(_, _))) => AppEvent::Resize,
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            tracing::error!("Terminal event stream failed: {}", e);
                            break;
                        }
                        None => break,
                    },
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, _task: task }
    }

    pub async fn next(&mut self) -> Result<AppEvent> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| TributaryError::Io(std::io::Error::other("terminal event stream closed")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    NextPane,
    PrevPane,
    Select,
    MarkRead,
    OpenInBrowser,
    FocusInput,
    ToggleMaximize,
    None,
}
