use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::UpdatingState;
use crate::i18n::Translator;
use crate::tui::app::{ActivePane, Feedback, TuiApp};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig, t: &dyn Translator) {
    if app.maximized {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),   // Preview pane (full height)
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        render_preview_pane(frame, app, chunks[0], colors, t);
        render_status_bar(frame, app, chunks[1], colors);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),      // Input
                Constraint::Length(1),      // Feedback
                Constraint::Length(8),      // Feeds pane
                Constraint::Percentage(35), // Posts pane
                Constraint::Min(6),         // Preview pane
                Constraint::Length(1),      // Status bar
            ])
            .split(frame.area());

        render_input(frame, app, chunks[0], colors, t);
        render_feedback(frame, app, chunks[1], colors, t);
        render_feeds_pane(frame, app, chunks[2], colors, t);
        render_posts_pane(frame, app, chunks[3], colors, t);
        render_preview_pane(frame, app, chunks[4], colors, t);
        render_status_bar(frame, app, chunks[5], colors);
    }
}

fn border_style(app: &TuiApp, pane: ActivePane, colors: &ColorConfig) -> Style {
    if app.active_pane == pane {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    }
}

fn highlight_style(app: &TuiApp, pane: ActivePane, colors: &ColorConfig) -> Style {
    let style = Style::default().bg(colors.selection_bg).fg(colors.selection_fg);
    if app.active_pane == pane {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

fn render_input(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig, t: &dyn Translator) {
    let style = if app.can_submit() {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let block = Block::default()
        .title(format!(" {} ", t.t("titles.input")))
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Input, colors));

    frame.render_widget(Paragraph::new(app.input.as_str()).style(style).block(block), area);

    if app.active_pane == ActivePane::Input {
        frame.set_cursor_position(Position::new(cursor_x(area, &app.input), area.y + 1));
    }
}

/// Column just past the typed text, clamped inside the input border.
fn cursor_x(area: Rect, input: &str) -> u16 {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(typed)
        .min(area.right().saturating_sub(2))
}

fn render_feedback(
    frame: &mut Frame,
    app: &TuiApp,
    area: Rect,
    colors: &ColorConfig,
    t: &dyn Translator,
) {
    let line = match app.feedback(t) {
        Feedback::None => Line::from(""),
        Feedback::Pending(msg) => Line::from(Span::styled(msg, Style::default().fg(colors.feedback_pending))),
        Feedback::Error(msg) => Line::from(Span::styled(
            msg.replace('\n', " / "),
            Style::default().fg(colors.feedback_error),
        )),
        Feedback::Success(msg) => Line::from(Span::styled(msg, Style::default().fg(colors.feedback_success))),
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_feeds_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig, t: &dyn Translator) {
    let items: Vec<ListItem> = app
        .feeds()
        .iter()
        .map(|feed| {
            let unread = app.state.unread_count(&feed.url);
            let marker = if app.feed_filter.as_deref() == Some(feed.url.as_str()) {
                "* "
            } else {
                ""
            };

            let content = if unread > 0 {
                format!("{}{} ({})", marker, feed.display_title(), unread)
            } else {
                format!("{}{}", marker, feed.display_title())
            };

            ListItem::new(content)
        })
        .collect();

    let title = format!(
        " {} ({}) [{}/{}] ",
        t.t("titles.feeds"),
        app.feeds().len(),
        app.feed_index + 1,
        app.feeds().len().max(1)
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Feeds, colors));

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style(app, ActivePane::Feeds, colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.feed_list_state);
}

fn render_posts_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig, t: &dyn Translator) {
    let posts = app.visible_posts();
    let items: Vec<ListItem> = posts
        .iter()
        .map(|post| {
            let is_read = app.is_post_read(&post.id);
            let marker = if is_read { " " } else { "●" };
            let content = format!("{} {}", marker, post.display_title());

            let style = if is_read {
                Style::default().fg(colors.read_post)
            } else {
                Style::default()
                    .fg(colors.unread_post)
                    .add_modifier(Modifier::BOLD)
            };

            ListItem::new(content).style(style)
        })
        .collect();

    let title = format!(
        " {} ({}) [{}/{}] ",
        t.t("titles.posts"),
        posts.len(),
        app.post_index + 1,
        posts.len().max(1)
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Posts, colors));

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style(app, ActivePane::Posts, colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.post_list_state);
}

fn render_preview_pane(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig, t: &dyn Translator) {
    let (title, content) = if app.active_pane == ActivePane::Feeds {
        match app.selected_feed() {
            Some(feed) => {
                let lines = vec![
                    Line::from(Span::styled(
                        feed.display_title(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(feed.url.as_str(), Style::default().fg(colors.link))),
                    Line::from(""),
                    Line::from(strip_html(&feed.description)),
                ];
                (format!(" {} ", feed.display_title()), Text::from(lines))
            }
            None => (format!(" {} ", t.t("titles.preview")), Text::from("")),
        }
    } else {
        match app.selected_post() {
            Some(post) => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        post.display_title(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                ];
                if let Some(link) = post.link() {
                    lines.push(Line::from(Span::styled(
                        format!("{}: {}", t.t("actions.look"), link),
                        Style::default().fg(colors.link),
                    )));
                    lines.push(Line::from(""));
                }
                lines.push(Line::from("─".repeat(area.width.saturating_sub(2) as usize)));
                lines.push(Line::from(""));
                for line in strip_html(&post.description).lines() {
                    lines.push(Line::from(line.to_string()));
                }

                (format!(" {} ", post.display_title()), Text::from(lines))
            }
            None => (format!(" {} ", t.t("titles.preview")), Text::from("")),
        }
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Preview, colors));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let updating = &app.state.feed.updating_process;
    let polling = match (updating.state, updating.last_cycle_at) {
        (UpdatingState::Started, Some(at)) => format!("  [updated {}]", at.format("%H:%M:%S")),
        (UpdatingState::Started, None) => "  [updates on]".to_string(),
        (UpdatingState::Idle, _) => String::new(),
    };

    let help = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if app.active_pane == ActivePane::Input {
        "Enter:Add  Esc/Tab:Browse  Ctrl+c:Quit".to_string()
    } else if app.maximized {
        "j/k:Scroll  n/p:Page  m:Exit maximize  q:Quit".to_string()
    } else {
        "j/k:Nav  n/p:Page  Tab:Pane  Enter:Select  r:Read  o:Open  a:Add  m:Max  q:Quit".to_string()
    };

    let paragraph = Paragraph::new(format!("{}{}", help, polling))
        .style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

/// Drop markup from a description, collapsing whitespace.
fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    let mut last_was_space = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => {
                if c.is_whitespace() {
                    if !last_was_space {
                        result.push(' ');
                        last_was_space = true;
                    }
                } else {
                    result.push(c);
                    last_was_space = false;
                }
            }
            _ => {}
        }
    }

    result.trim().to_string()
}
