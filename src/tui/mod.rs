pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;

use crate::app::{submit, AppContext, Result};
use crate::config::Config;

use self::app::{ActivePane, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the interactive session. `urls` are submitted one after another at
/// startup, as if typed into the form.
pub async fn run(ctx: Arc<AppContext>, config: Arc<Config>, urls: Vec<String>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx.clone(), config, urls).await;
    restore_terminal(&mut terminal)?;
    ctx.shutdown().await;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    ctx: Arc<AppContext>,
    config: Arc<Config>,
    urls: Vec<String>,
) -> Result<()> {
    let (state_tx, mut state_rx) = watch::channel(ctx.store.snapshot());
    ctx.store.subscribe(move |state| {
        state_tx.send_replace(state.clone());
    });

    let mut tui_app = TuiApp::new(state_rx.borrow_and_update().clone());
    let mut events = EventHandler::new(Duration::from_millis(250));

    if !urls.is_empty() {
        let ctx = ctx.clone();
        tui_app.submission = Some(tokio::spawn(async move {
            let mut last = None;
            for url in urls {
                last = Some(submit(&ctx, &url).await);
            }
            last.unwrap_or_else(|| Ok(Default::default()))
        }));
    }

    let mut store_open = true;
    loop {
        terminal.draw(|frame| {
            layout::render(frame, &mut tui_app, &config.colors, ctx.translator.as_ref())
        })?;

        tokio::select! {
            event = events.next() => match event? {
                AppEvent::Key(key) => handle_key(&mut tui_app, &ctx, &config, key),
                AppEvent::Resize | AppEvent::Tick => {}
            },
            changed = state_rx.changed(), if store_open => match changed {
                Ok(()) => {
                    let state = state_rx.borrow_and_update().clone();
                    tui_app.sync(state);
                }
                Err(_) => store_open = false,
            },
        }

        tui_app.finish_submission().await;

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(tui_app: &mut TuiApp, ctx: &Arc<AppContext>, config: &Config, key: KeyEvent) {
    tui_app.status_message = None;

    if tui_app.active_pane == ActivePane::Input {
        handle_input_key(tui_app, ctx, key);
        return;
    }

    match config.keybindings.get_action(&key) {
        Action::Quit => {
            tui_app.should_quit = true;
        }
        Action::MoveUp => {
            tui_app.move_up();
        }
        Action::MoveDown => {
            tui_app.move_down();
        }
        Action::NextPage => {
            tui_app.next_page();
        }
        Action::PrevPage => {
            tui_app.prev_page();
        }
        Action::ToggleMaximize => {
            tui_app.toggle_maximize();
        }
        Action::NextPane => {
            tui_app.active_pane = tui_app.active_pane.next();
        }
        Action::PrevPane => {
            tui_app.active_pane = tui_app.active_pane.prev();
        }
        Action::FocusInput => {
            tui_app.maximized = false;
            tui_app.active_pane = ActivePane::Input;
        }
        Action::Select => match tui_app.active_pane {
            ActivePane::Feeds => {
                tui_app.toggle_feed_filter();
                tui_app.active_pane = ActivePane::Posts;
            }
            ActivePane::Posts => {
                mark_selected_read(tui_app, ctx);
                tui_app.active_pane = ActivePane::Preview;
            }
            ActivePane::Input | ActivePane::Preview => {}
        },
        Action::MarkRead => {
            mark_selected_read(tui_app, ctx);
        }
        Action::OpenInBrowser => {
            let link = tui_app
                .selected_post()
                .and_then(|post| post.link())
                .map(str::to_string);
            if let Some(link) = link {
                match open::that(&link) {
                    Ok(()) => mark_selected_read(tui_app, ctx),
                    Err(e) => tui_app.set_status(format!("Failed to open browser: {}", e)),
                }
            }
        }
        Action::None => {}
    }
}

fn handle_input_key(tui_app: &mut TuiApp, ctx: &Arc<AppContext>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            tui_app.should_quit = true;
        }
        KeyCode::Enter => {
            if !tui_app.can_submit() {
                return;
            }
            let ctx = ctx.clone();
            let input = tui_app.input.clone();
            tui_app.submission = Some(tokio::spawn(async move { submit(&ctx, &input).await }));
        }
        KeyCode::Esc | KeyCode::Tab => {
            tui_app.active_pane = ActivePane::Feeds;
        }
        KeyCode::BackTab => {
            tui_app.active_pane = ActivePane::Preview;
        }
        KeyCode::Backspace => {
            tui_app.input.pop();
        }
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            tui_app.input.push(c);
        }
        _ => {}
    }
}

fn mark_selected_read(tui_app: &TuiApp, ctx: &AppContext) {
    if let Some(post) = tui_app.selected_post() {
        ctx.store.mark_read(&post.id);
    }
}
