//! src/main.rs
//! Terminal tagging editor driven entirely through the keyboard manager

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use crossterm::{
    event::EventStream,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use parking_lot::Mutex;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use tokio::{signal, sync::Notify, time};
use tracing::{error, info, warn};

use keyboard_core::{
    config::Config,
    editor::{EditorState, Region, TagHotkeys},
    keyboard::{KeyboardBinding, KeyboardContext, KeyboardManager, key_handler},
    logging::LoggerBuilder,
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

const DEMO_REGION_COUNT: usize = 5;
const MIN_TICK_RATE: Duration = Duration::from_millis(10);

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let config = Config::load().await.unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        Config::default()
    });

    let _log_guard = LoggerBuilder::new()
        .with_config(config.logging.clone())
        .build()
        .context("Failed to initialize logging")?;

    setup_panic_handler();

    let app = App::new(config).context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    config: Config,
    keyboard: Arc<KeyboardManager>,
    state: Arc<Mutex<EditorState>>,
    cursor: Arc<Mutex<usize>>,
    shutdown: Arc<Notify>,
    status: String,
    _tag_hotkeys: TagHotkeys,
    _bindings: Vec<KeyboardBinding>,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        info!("Starting terminal tagging editor");

        let keyboard = Arc::new(KeyboardManager::new());
        let context = KeyboardContext::new(Arc::clone(&keyboard));

        let mut editor_state = EditorState::new(config.tags.clone());
        for index in 1..=DEMO_REGION_COUNT {
            editor_state.add_region(Region::new(format!("region-{index}")));
        }
        let state = Arc::new(Mutex::new(editor_state));

        let cursor = Arc::new(Mutex::new(0usize));
        let shutdown = Arc::new(Notify::new());

        let tag_hotkeys =
            TagHotkeys::mount_with_modifier(&context, &config.keymap.tag_modifier, Arc::clone(&state));
        let bindings = Self::mount_bindings(&context, &config, &state, &cursor, &shutdown);

        let terminal = setup_terminal().context("Failed to initialize terminal")?;

        Ok(Self {
            terminal,
            config,
            keyboard,
            state,
            cursor,
            shutdown,
            status: String::from("Ready"),
            _tag_hotkeys: tag_hotkeys,
            _bindings: bindings,
        })
    }

    fn mount_bindings(
        context: &KeyboardContext,
        config: &Config,
        state: &Arc<Mutex<EditorState>>,
        cursor: &Arc<Mutex<usize>>,
        shutdown: &Arc<Notify>,
    ) -> Vec<KeyboardBinding> {
        let mut bindings = Vec::new();

        let quit = {
            let shutdown = Arc::clone(shutdown);
            key_handler(move |_| {
                shutdown.notify_one();
                Ok(())
            })
        };
        for accelerator in &config.keymap.quit {
            bindings.push(KeyboardBinding::mount(context, accelerator, Arc::clone(&quit)));
        }

        let move_up = {
            let cursor = Arc::clone(cursor);
            key_handler(move |_| {
                let mut cursor = cursor.lock();
                *cursor = cursor.saturating_sub(1);
                Ok(())
            })
        };
        bindings.push(KeyboardBinding::mount(context, "ArrowUp", move_up));

        let move_down = {
            let cursor = Arc::clone(cursor);
            key_handler(move |_| {
                let mut cursor = cursor.lock();
                *cursor = (*cursor + 1).min(DEMO_REGION_COUNT - 1);
                Ok(())
            })
        };
        bindings.push(KeyboardBinding::mount(context, "ArrowDown", move_down));

        let toggle_selection = {
            let cursor = Arc::clone(cursor);
            let state = Arc::clone(state);
            key_handler(move |_| {
                let index = *cursor.lock();
                let mut state = state.lock();
                let Some(id) = state.regions.get(index).map(|region| region.id.clone()) else {
                    return Ok(());
                };

                if state.selected_regions.contains(&id) {
                    state.selected_regions.retain(|selected| selected != &id);
                } else {
                    state.select_region(&id);
                }
                Ok(())
            })
        };
        bindings.push(KeyboardBinding::mount(context, "Space", toggle_selection));

        let clear_selection = {
            let state = Arc::clone(state);
            key_handler(move |_| {
                state.lock().clear_selection();
                Ok(())
            })
        };
        bindings.push(KeyboardBinding::mount(context, "Ctrl+D", clear_selection));

        bindings
    }

    async fn run(mut self) -> Result<()> {
        self.setup_shutdown_handler();
        info!("Starting event loop");

        let mut event_stream = EventStream::new();
        let mut ticker = time::interval(self.config.ui.tick_rate.max(MIN_TICK_RATE));

        loop {
            self.render()?;

            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("Shutdown requested");
                    break;
                }

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(terminal_event)) => {
                            if let Err(e) = self.keyboard.handle_event(&terminal_event) {
                                warn!("Keyboard handler failed: {}", e);
                                self.status = e.to_string();
                            }
                        }
                        Some(Err(e)) => {
                            error!("Terminal event error: {}", e);
                            break;
                        }
                        None => break,
                    }
                }

                _ = ticker.tick() => {}
            }
        }

        info!("Event loop terminated cleanly");
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let state = self.state.lock().clone();
        let cursor = *self.cursor.lock();
        let modifier = self.config.keymap.tag_modifier.clone();
        let status = self.status.clone();

        self.terminal
            .draw(|frame: &mut Frame<'_>| draw(frame, &state, cursor, &modifier, &status))
            .context("Failed to draw terminal")?;

        Ok(())
    }

    fn setup_shutdown_handler(&self) {
        let shutdown: Arc<Notify> = Arc::clone(&self.shutdown);

        tokio::spawn(async move {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                return;
            }
            info!("Received Ctrl+C");
            shutdown.notify_one();
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn draw(frame: &mut Frame<'_>, state: &EditorState, cursor: usize, modifier: &str, status: &str) {
    let [palette_area, regions_area, status_area] = Layout::vertical([
        Constraint::Length(state.tags.len().min(10) as u16 + 2),
        Constraint::Min(3),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    let palette: Vec<Line<'_>> = state
        .tags
        .iter()
        .take(10)
        .enumerate()
        .map(|(index, tag)| {
            let digit = (index + 1) % 10;
            let color = tag.color.parse::<Color>().unwrap_or(Color::White);
            Line::from(vec![
                Span::styled(
                    format!("{modifier}+{digit} "),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::styled(tag.name.to_string(), Style::default().fg(color)),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(palette).block(Block::bordered().title(" Tags ")),
        palette_area,
    );

    let regions: Vec<Line<'_>> = state
        .regions
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let selected = state.selected_regions.contains(&region.id);
            let marker = if selected { "[x]" } else { "[ ]" };
            let tags: Vec<&str> = region.tags.iter().map(|tag| tag.name.as_str()).collect();

            let mut style = Style::default();
            if index == cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }

            Line::styled(format!("{marker} {} {}", region.id, tags.join(", ")), style)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(regions)
            .block(Block::bordered().title(format!(" Regions ({:?}) ", state.asset_state))),
        regions_area,
    );

    frame.render_widget(
        Paragraph::new(status.to_string()).block(
            Block::bordered().title(" Up/Down move | Space select | Ctrl+D clear | Esc quit "),
        ),
        status_area,
    );
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
