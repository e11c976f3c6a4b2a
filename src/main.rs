mod app;
mod event;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::info;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use kanadr::catalog::KanaClass;
use kanadr::config::Config;
use kanadr::engine::filter::Content;
use kanadr::session::Surface;

use app::{App, AppScreen, NoticeLevel, SETTINGS_ROWS};
use event::{AppEvent, EventHandler};
use ui::components::progress_bar::ProgressBar;
use ui::components::prompt_card::PromptCard;
use ui::components::selector::{CategoryList, KanaGrid};
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "kanadr", version, about = "Terminal drills for Japanese kana, words and phrases")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, value_enum, help = "Open this surface directly")]
    surface: Option<Surface>,

    #[arg(long, help = "Read kana.json, words.json and phrases.json from this directory")]
    catalog_dir: Option<PathBuf>,

    #[arg(long, help = "Seed for a reproducible draw order")]
    seed: Option<u64>,

    #[arg(long, help = "Keep settings for this run only")]
    no_persist: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config: {e}");
        Config::default()
    });
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(dir) = cli.catalog_dir {
        config.catalog_dir = Some(dir.to_string_lossy().to_string());
        config.catalog_url = None;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    let themes = Theme::available_themes();
    let theme_names: Vec<&str> = themes.iter().map(String::as_str).collect();
    config.normalize(&theme_names);

    init_logging(&config.log_level);
    info!("kanadr {} starting", env!("CARGO_PKG_VERSION"));

    let mut app = App::new(config, !cli.no_persist);
    if let Some(surface) = cli.surface {
        app.open_surface(surface);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file: the terminal belongs to the UI while it runs.
fn init_logging(level: &str) {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kanadr");
    let file = fs::create_dir_all(&dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("kanadr.log"))
    });

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    match file {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            app.show_help = false;
        }
        return;
    }
    if key.code == KeyCode::Char('?') {
        app.show_help = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Practice => handle_practice_key(app, key),
        AppScreen::Selection => handle_selection_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            let action = app.menu.current();
            app.run_menu_action(action);
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                app.run_menu_action(action);
            }
        }
        _ => {}
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char(' ') | KeyCode::Char('n') | KeyCode::Right => app.next_prompt(),
        KeyCode::Char('h') => app.toggle_hint(),
        KeyCode::Char('p') | KeyCode::Char('v') => app.speak(),
        KeyCode::Char('s') => app.go_to_settings(),
        KeyCode::Char('e') => app.go_to_selection(),
        _ => {}
    }
}

fn handle_selection_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.leave_selection(),
        KeyCode::Left | KeyCode::Char('h') => app.selection_move(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.selection_move(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.selection_move(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.selection_move(0, 1),
        KeyCode::Char(' ') | KeyCode::Enter => app.selection_toggle(),
        KeyCode::Char(ch @ '1'..='3') => {
            let idx = ch as usize - '1' as usize;
            app.selection_toggle_class(KanaClass::ALL[idx]);
        }
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.leave_settings(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected + 1 < SETTINGS_ROWS {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle(true),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle(false),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Practice => render_practice(frame, app),
        AppScreen::Selection => render_selection(frame, app),
        AppScreen::Settings => {
            render_practice(frame, app);
            render_settings(frame, app);
        }
    }

    if app.show_help {
        render_help(frame, app);
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let info = match app.surface() {
        Some(surface) if app.screen != AppScreen::Menu => {
            let controller = surface.controller();
            format!(
                " {} | {} | {} | cycle {}",
                surface.surface().label(),
                controller.display_mode().label(),
                controller.practice_mode().label(),
                controller.cycle()
            )
        }
        _ => String::new(),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " kanadr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(info, Style::default().fg(colors.hint()).bg(colors.header_bg())),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

/// Notice first (if any), then the key hints packed to the width.
fn footer_lines(app: &App, hints: &[&str], width: u16) -> Vec<Line<'static>> {
    let colors = &app.theme.colors;
    let mut lines = Vec::new();
    if let Some(notice) = &app.notice {
        let color = match notice.level {
            NoticeLevel::Info => colors.success(),
            NoticeLevel::Warning => colors.warning(),
            NoticeLevel::Error => colors.error(),
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", notice.text),
            Style::default().fg(color),
        )));
    }
    for line in pack_hint_lines(hints, width as usize) {
        lines.push(Line::from(Span::styled(line, Style::default().fg(colors.hint_label()))));
    }
    lines
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let footer = footer_lines(
        app,
        &["[1-3] Practice", "[c] Clear cache", "[?] Help", "[q] Quit"],
        area.width,
    );

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(footer.len() as u16),
        ])
        .split(area);

    render_header(frame, app, layout[0]);
    let menu_area = centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);
    frame.render_widget(Paragraph::new(footer), layout[2]);
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let Some(surface) = app.surface() else {
        return;
    };
    let controller = surface.controller();

    let footer = footer_lines(
        app,
        &[
            "[space] Next",
            "[h] Hint",
            "[p] Speak",
            "[e] Choose items",
            "[s] Settings",
            "[?] Help",
            "[Esc] Menu",
        ],
        area.width,
    );
    let layout = AppLayout::new(area, footer.len() as u16);

    render_header(frame, app, layout.header);

    let title = format!(
        "{} · {} items",
        surface.surface().label(),
        controller.eligible_len()
    );
    let card = PromptCard::new(controller.prompt(), controller.hint_visible(), title, app.theme);
    frame.render_widget(card, layout.main);

    if let Some(progress_area) = layout.progress {
        let (done, total) = controller.progress();
        let label = format!("Cycle {}", controller.cycle());
        frame.render_widget(ProgressBar::new(&label, done, total, app.theme), progress_area);
    }

    frame.render_widget(Paragraph::new(footer), layout.footer);
}

fn render_selection(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let Some(surface) = app.surface() else {
        return;
    };
    let content = surface.controller().content();
    let hints: &[&str] = match content {
        Content::Phrases(_) => &["[↑↓] Move", "[space] Toggle", "[Esc] Back"],
        _ => &[
            "[arrows] Move",
            "[space] Toggle",
            "[1] Seion",
            "[2] Dakuon",
            "[3] Yoon",
            "[Esc] Back",
        ],
    };
    let footer = footer_lines(app, hints, area.width);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(footer.len() as u16),
        ])
        .split(area);
    render_header(frame, app, layout[0]);

    match content {
        Content::Kana(kana) | Content::Words { kana, .. } => {
            if let Some(selection) = surface.kana_selection() {
                let grid = KanaGrid {
                    kana,
                    selection,
                    cursor: app.selection_cursor,
                    theme: app.theme,
                };
                frame.render_widget(grid, layout[1]);
            }
        }
        Content::Phrases(phrases) => {
            if let Some(selection) = surface.category_selection() {
                let list = CategoryList {
                    phrases,
                    selection,
                    cursor: app.selection_cursor,
                    theme: app.theme,
                };
                frame.render_widget(list, layout[1]);
            }
        }
    }

    frame.render_widget(Paragraph::new(footer), layout[2]);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let Some(surface) = app.surface() else {
        return;
    };
    let controller = surface.controller();

    let centered = centered_rect(60, 60, area);
    frame.render_widget(Clear, centered);

    let block = Block::bordered()
        .title(format!(" {} settings ", surface.surface().label()))
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let on_off = |on: bool| if on { "On" } else { "Off" };
    let fields: [(&str, String); SETTINGS_ROWS] = [
        ("Display mode", controller.display_mode().label().to_string()),
        ("Practice mode", controller.practice_mode().label().to_string()),
        ("Auto-speak (learning mode)", on_off(surface.auto_speak()).to_string()),
        ("Theme", app.config.theme.clone()),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    Paragraph::new(Line::from(Span::styled(
        "  Arrows to navigate, Enter/Right to change",
        Style::default().fg(colors.hint_label()),
    )))
    .render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = if is_selected {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.fg())
        };
        let value_style = Style::default().fg(if is_selected {
            colors.prompt()
        } else {
            colors.hint()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("  < {value} >"), value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    Paragraph::new(Line::from(Span::styled(
        "  [Esc] Save & back",
        Style::default().fg(colors.accent()),
    )))
    .render(layout[3], frame.buffer_mut());
}

fn render_help(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, area);

    let rows = [
        ("space / n / →", "next prompt"),
        ("h", "show or hide the hint"),
        ("p / v", "speak the prompt"),
        ("e", "choose kana or categories"),
        ("s", "surface settings"),
        ("1 / 2 / 3", "toggle seion, dakuon, yoon (selection)"),
        ("c", "clear catalog cache (menu)"),
        ("?", "this help"),
        ("Esc", "back"),
        ("Ctrl-c", "quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(
                    format!("  {keys:<16}"),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(*what, Style::default().fg(colors.fg())),
            ])
        })
        .collect();

    let help = Paragraph::new(lines).block(
        Block::bordered()
            .title(" Keys ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg())),
    );
    frame.render_widget(help, area);
}
