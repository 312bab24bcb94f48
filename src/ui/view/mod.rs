//! 视图层模块
//!
//! 包含主渲染入口和各种视图组件

pub mod components;
pub mod layouts;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::state::{App, AppMode, InputField, ListView};
use crate::storage::Slot;
use components::{entry_card_lines, render_dialog_framework, render_input_widget};
use layouts::centered_rect;

/// 渲染 UI
pub fn render<S: Slot>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Min(6),    // 条目
            Constraint::Length(3), // 帮助
        ])
        .split(frame.area());

    render_title(frame, app, chunks[0]);
    render_entries(frame, app, chunks[1]);
    render_help(frame, app, chunks[2]);

    // 渲染弹窗
    match &app.mode {
        AppMode::Composing => render_compose_dialog(frame, app),
        AppMode::Searching => render_search_dialog(frame, app),
        AppMode::Confirm(_) => render_confirm_dialog(frame),
        AppMode::Alert(message) => render_alert_dialog(frame, message),
        AppMode::Normal => {}
    }
}

fn render_title<S: Slot>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let text = if app.query.is_empty() {
        "📔 My Journal".to_string()
    } else {
        format!("📔 My Journal  (search: \"{}\")", app.query)
    };

    let title = Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

/// 列表区域为空时的占位文字
pub fn placeholder_text<S: Slot>(app: &App<S>) -> Option<String> {
    match app.list_view() {
        ListView::Empty => Some("No journal entries yet. Start by adding one!".to_string()),
        ListView::NoResults => Some(format!("No entries match \"{}\".", app.query)),
        ListView::Entries => None,
    }
}

fn render_entries<S: Slot>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let title = if app.query.is_empty() {
        format!("Entries ({})", app.store.len())
    } else {
        format!("Entries ({} of {})", app.display_list.len(), app.store.len())
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if let Some(text) = placeholder_text(app) {
        let placeholder = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app
        .visible_entries()
        .into_iter()
        .map(|entry| ListItem::new(entry_card_lines(entry)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_help<S: Slot>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let help_text = match &app.mode {
        AppMode::Normal if app.query.is_empty() => {
            "[a] Add  [/] Search  [d] Delete  [j/k] Navigate  [q] Quit"
        }
        AppMode::Normal => "[a] Add  [/] Search  [Esc] Show all  [d] Delete  [j/k] Navigate  [q] Quit",
        AppMode::Composing => "[Tab] Switch field  [Enter] Add entry  [Esc] Cancel",
        AppMode::Searching => "[Enter] Search  [Esc] Cancel",
        AppMode::Confirm(_) => "[y] Confirm  [n] Cancel",
        AppMode::Alert(_) => "[Enter] OK",
    };

    let text = match app.status_text() {
        Some(message) => format!("{}  |  {}", help_text, message),
        None => help_text.to_string(),
    };

    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn render_compose_dialog<S: Slot>(frame: &mut Frame, app: &App<S>) {
    let area = centered_rect(70, 50, frame.area());
    let inner = render_dialog_framework(frame, area, "New entry");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(inner);

    render_input_widget(
        frame,
        chunks[0],
        "What's on your mind?",
        &app.draft.text,
        app.draft.field == InputField::Text,
        Color::Yellow,
    );
    render_input_widget(
        frame,
        chunks[1],
        "Image file (optional)",
        &app.draft.image_path,
        app.draft.field == InputField::Image,
        Color::Yellow,
    );

    let hint = Paragraph::new("Tab switches field, Enter adds the entry")
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(hint, chunks[2]);
}

fn render_search_dialog<S: Slot>(frame: &mut Frame, app: &App<S>) {
    let area = centered_rect(60, 20, frame.area());
    let inner = render_dialog_framework(frame, area, "Search");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(inner);

    render_input_widget(
        frame,
        chunks[0],
        "Date or text",
        &app.input_buffer,
        true,
        Color::Yellow,
    );

    let hint = Paragraph::new("Empty search shows all entries").style(Style::default().fg(Color::Gray));
    frame.render_widget(hint, chunks[1]);
}

fn render_confirm_dialog(frame: &mut Frame) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let dialog = Paragraph::new("Delete this entry?\n\n[y] Confirm  [n] Cancel")
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("⚠️ Confirm").borders(Borders::ALL));

    frame.render_widget(dialog, area);
}

fn render_alert_dialog(frame: &mut Frame, message: &str) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let dialog = Paragraph::new(format!("{}\n\n[Enter] OK", message))
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Notice").borders(Borders::ALL));

    frame.render_widget(dialog, area);
}
