mod config;
mod error;
mod image;
mod models;
mod storage;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, data_dir};
use crate::image::{is_image_file, load_image};
use crate::storage::{EntryStore, FileSlot};
use crate::ui::{Action, App, Outcome, render};

/// 事件循环中的事件
enum AppEvent {
    Input(KeyEvent),
    Tick,
    ImageLoaded {
        ticket: u64,
        result: error::Result<String>,
    },
    ImageInspected {
        path: PathBuf,
        is_file: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    let data_dir = data_dir().context("failed to prepare data directory")?;

    // 日志写入文件，避免干扰 TUI
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("daybook.log"))
        .context("failed to open log file")?;
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("daybook=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let slot = FileSlot::new(config.data_file(&data_dir));
    info!(path = %slot.path().display(), "starting daybook");
    let store = EntryStore::open(slot, config.date_format.clone());

    // 创建应用状态
    let mut app = App::new(store, config.status_timeout());

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app).await;

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if !app.pending.is_empty() {
        warn!(count = app.pending.len(), "quitting with unfinished image reads");
    }
    info!("daybook stopped");

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<AppEvent>(64);

    // 键盘输入
    let tx_input = tx.clone();
    tokio::task::spawn_blocking(move || {
        while !tx_input.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(error = %e, "input poll failed");
                    break;
                }
            }
            if let Ok(Event::Key(key)) = event::read() {
                if tx_input.blocking_send(AppEvent::Input(key)).is_err() {
                    break;
                }
            }
        }
    });

    // 定时器 (用于隐藏提示)
    let tx_tick = tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            if tx_tick.send(AppEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    loop {
        terminal.draw(|f| render(f, app))?;

        let Some(event) = rx.recv().await else {
            break;
        };

        let outcome = match event {
            AppEvent::Input(key) if key.kind == KeyEventKind::Press => {
                ui::handle_key_event(app, key.code)
            }
            AppEvent::Input(_) => Outcome::Continue,
            AppEvent::Tick => app.dispatch(Action::Tick),
            AppEvent::ImageLoaded { ticket, result } => {
                app.finish_image_add(ticket, result);
                Outcome::Continue
            }
            AppEvent::ImageInspected { path, is_file } => {
                app.announce_image(&path, is_file);
                Outcome::Continue
            }
        };

        match outcome {
            Outcome::Continue => {}
            Outcome::Quit => break,
            Outcome::LoadImage(request) => {
                let tx_image = tx.clone();
                tokio::spawn(async move {
                    let result = load_image(request.path).await;
                    let _ = tx_image
                        .send(AppEvent::ImageLoaded {
                            ticket: request.ticket,
                            result,
                        })
                        .await;
                });
            }
            Outcome::InspectImage(path) => {
                let tx_inspect = tx.clone();
                tokio::spawn(async move {
                    let is_file = is_image_file(&path).await;
                    let _ = tx_inspect
                        .send(AppEvent::ImageInspected { path, is_file })
                        .await;
                });
            }
        }
    }
    Ok(())
}
