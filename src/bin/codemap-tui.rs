use std::cmp::Ordering;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use notify::{RecursiveMode, Watcher};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect as UiRect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use ratatui::{Frame, Terminal};

use codemap::api::{Service, TreeQuery};
use codemap::layout::{layout_tree, LayoutParams, Rect, ROOT_KEY};
use codemap::model::{ActivityMap, DisplayNode, SizeMode, SortMode};
use codemap::palette::{self, ColorMode, FillContext, Rgb};
use codemap::reconcile::{Reconciler, RenderTarget};
use codemap::remote::RepoRef;
use codemap::session::SessionState;

const FRAME_MS: u64 = 33;
const WATCH_DEBOUNCE_MS: u64 = 500;
const AGE_THRESHOLD_DAYS: i64 = 30;
const BACKGROUND: Rgb = Rgb(18, 18, 20);

#[derive(Parser)]
#[command(name = "codemap-tui", version, about = "Interactive codebase treemap")]
struct Cli {
    /// Local repository path.
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// GitHub repository (owner/repo, owner/repo@branch, or URL).
    #[arg(long)]
    github: Option<String>,

    /// Snapshot at this commit instead of the working tree.
    #[arg(long)]
    commit: Option<String>,
}

enum FetchEvent {
    Tree(codemap::model::RawNode),
    Activity(u32, ActivityMap),
}

#[derive(Clone)]
struct HitTile {
    key: String,
    name: String,
    value: u64,
    is_folder: bool,
    is_collapsed: bool,
    status_label: &'static str,
    depth: u16,
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
}

impl HitTile {
    fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

struct App {
    service: Arc<Service>,
    query: TreeQuery,
    session: SessionState,
    reconciler: Reconciler,
    title: String,
    status: String,
    is_fetching: bool,
    fetch_rx: Option<Receiver<FetchEvent>>,
    refetch_after: Option<Instant>,
    hit_tiles: Vec<HitTile>,
    selected: Option<HitTile>,
    /// Transform output of the last render; focus needs sibling lookup.
    display: Option<DisplayNode>,
    dirty: bool,
    should_quit: bool,
}

impl App {
    fn new(service: Service, query: TreeQuery) -> Self {
        let title = service.describe();
        Self {
            service: Arc::new(service),
            query,
            session: SessionState::new(),
            reconciler: Reconciler::new(),
            title,
            status: String::from("Fetching tree..."),
            is_fetching: false,
            fetch_rx: None,
            refetch_after: None,
            hit_tiles: Vec::new(),
            selected: None,
            display: None,
            dirty: false,
            should_quit: false,
        }
    }

    fn start_fetch(&mut self) {
        if self.is_fetching {
            return;
        }
        self.is_fetching = true;
        self.status = String::from("Fetching tree...");

        let (tx, rx) = mpsc::channel::<FetchEvent>();
        self.fetch_rx = Some(rx);

        let service = Arc::clone(&self.service);
        let query = self.query.clone();
        let activity_days = self.session.needs_activity().then_some(self.session.activity_days);

        thread::spawn(move || {
            let tree = service.data(&query);
            let _ = tx.send(FetchEvent::Tree(tree));

            if let Some(days) = activity_days {
                if let Ok(map) = service.activity(days) {
                    let _ = tx.send(FetchEvent::Activity(days, map));
                }
            }
        });
    }

    fn start_activity_fetch(&mut self) {
        if self.is_fetching {
            return;
        }
        self.is_fetching = true;
        self.status = String::from("Fetching activity...");

        let (tx, rx) = mpsc::channel::<FetchEvent>();
        self.fetch_rx = Some(rx);

        let service = Arc::clone(&self.service);
        let days = self.session.activity_days;
        thread::spawn(move || {
            if let Ok(map) = service.activity(days) {
                let _ = tx.send(FetchEvent::Activity(days, map));
            }
        });
    }

    fn poll_fetch(&mut self) {
        let mut disconnected = false;

        if let Some(rx) = self.fetch_rx.as_ref() {
            loop {
                match rx.try_recv() {
                    Ok(FetchEvent::Tree(tree)) => {
                        let msg = tree.message.clone();
                        self.session.set_tree(tree);
                        self.status = match msg {
                            Some(msg) => msg,
                            None => String::from("Tree loaded"),
                        };
                        self.dirty = true;
                    }
                    Ok(FetchEvent::Activity(days, map)) => {
                        self.session.set_activity(days, map);
                        self.dirty = true;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        if disconnected {
            self.fetch_rx = None;
            self.is_fetching = false;
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.start_fetch(),
            KeyCode::Char('m') => {
                self.session.cycle_size_mode();
                if self.session.needs_activity() {
                    self.start_activity_fetch();
                }
                self.dirty = true;
            }
            KeyCode::Char('c') => {
                self.session.cycle_color_mode();
                if self.session.needs_activity() {
                    self.start_activity_fetch();
                }
                self.dirty = true;
            }
            KeyCode::Char('s') => {
                self.session.toggle_sort();
                self.dirty = true;
            }
            KeyCode::Char('f') => {
                self.session.options.folders_first = !self.session.options.folders_first;
                self.dirty = true;
            }
            KeyCode::Char('h') => {
                self.session.options.hide_clean = !self.session.options.hide_clean;
                self.dirty = true;
            }
            KeyCode::Char('u') => {
                self.session.options.show_unstaged = !self.session.options.show_unstaged;
                self.dirty = true;
            }
            KeyCode::Char('x') => {
                self.session.options.collapse_clean = !self.session.options.collapse_clean;
                self.dirty = true;
            }
            KeyCode::Char('0') => {
                self.session.collapsed.clear();
                self.dirty = true;
            }
            KeyCode::Esc => {
                self.selected = None;
            }
            _ => {}
        }
    }

    fn on_mouse(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(tile) = self.tile_at(event.column, event.row).cloned() {
                    self.select_tile(&tile);
                    if tile.is_folder && tile.key != ROOT_KEY {
                        self.session.collapsed.toggle(&tile.key);
                        self.dirty = true;
                    }
                }
            }
            MouseEventKind::Down(MouseButton::Right) => {
                if let Some(tile) = self.tile_at(event.column, event.row).cloned() {
                    if tile.is_folder && tile.key != ROOT_KEY {
                        self.select_tile(&tile);
                        self.focus(&tile.key);
                        self.dirty = true;
                    }
                }
            }
            MouseEventKind::Down(MouseButton::Middle) => {
                self.session.collapsed.clear();
                self.dirty = true;
            }
            _ => {}
        }
    }

    /// Collapse every sibling folder of `path` and expand `path` itself.
    fn focus(&mut self, path: &str) {
        let Some(display) = self.display.as_ref() else {
            return;
        };
        let Some(parent) = find_parent(display, path) else {
            return;
        };
        self.session.collapsed.focus(parent.children.iter(), path);
    }

    fn tile_at(&self, x: u16, y: u16) -> Option<&HitTile> {
        self.hit_tiles
            .iter()
            .filter(|tile| tile.contains(x, y))
            .max_by(|a, b| {
                let depth = a.depth.cmp(&b.depth);
                if depth != Ordering::Equal {
                    return depth;
                }
                let area_a =
                    (a.x1.saturating_sub(a.x0) as u32) * (a.y1.saturating_sub(a.y0) as u32);
                let area_b =
                    (b.x1.saturating_sub(b.x0) as u32) * (b.y1.saturating_sub(b.y0) as u32);
                area_b.cmp(&area_a)
            })
    }

    fn select_tile(&mut self, tile: &HitTile) {
        self.status = format!(
            "{} ({})",
            if tile.key == ROOT_KEY { &self.title } else { &tile.key },
            format_value(tile.value, self.session.options.mode),
        );
        self.selected = Some(tile.clone());
    }

    /// Re-run transform + layout + palette and hand the targets to the
    /// reconciler. Called only when view state actually changed.
    fn rebuild(&mut self, area: UiRect) {
        self.dirty = false;

        let Some(display) = self.session.display_tree() else {
            self.hit_tiles.clear();
            return;
        };
        if area.width <= 2 || area.height <= 2 {
            self.hit_tiles.clear();
            self.display = Some(display);
            return;
        }

        let container = Rect::new(0.0, 0.0, area.width as f32, area.height as f32);
        let placements = layout_tree(&display, container, &LayoutParams::default());

        let activity = self.session.activity();
        let max_activity = activity
            .map(|m| m.values().copied().max().unwrap_or(0))
            .unwrap_or(0);
        let ctx = FillContext {
            mode: self.session.color_mode,
            now: Utc::now(),
            age_threshold_days: AGE_THRESHOLD_DAYS,
            activity,
            max_activity,
        };

        let mut targets = Vec::with_capacity(placements.len());
        self.hit_tiles.clear();
        for placement in &placements {
            targets.push(RenderTarget {
                key: placement.key.clone(),
                rect: placement.rect,
                fill: palette::node_fill(placement.node, &ctx),
                depth: placement.depth,
            });
            if let Some((x0, y0, x1, y1)) = cell_bounds(placement.rect, area) {
                self.hit_tiles.push(HitTile {
                    key: placement.key.clone(),
                    name: placement.node.name.clone(),
                    value: placement.node.value,
                    is_folder: placement.node.is_folder(),
                    is_collapsed: placement.node.is_collapsed(),
                    status_label: placement.node.git_status.label(),
                    depth: placement.depth,
                    x0,
                    y0,
                    x1,
                    y1,
                });
            }
        }

        self.reconciler.reconcile(&targets);
        self.display = Some(display);
    }
}

/// Parent of the node at `path`, found by walking the path's prefix.
fn find_parent<'a>(root: &'a DisplayNode, path: &str) -> Option<&'a DisplayNode> {
    let mut node = root;
    loop {
        if node.children.iter().any(|c| c.path == path) {
            return Some(node);
        }
        node = node.children.iter().find(|c| {
            path.starts_with(c.path.as_str()) && path.as_bytes().get(c.path.len()) == Some(&b'/')
        })?;
    }
}

/// Map a layout rect into terminal cell bounds within `area`, inclusive.
fn cell_bounds(rect: Rect, area: UiRect) -> Option<(u16, u16, u16, u16)> {
    if area.width == 0 || area.height == 0 || rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }

    let max_x = area.x.saturating_add(area.width.saturating_sub(1));
    let max_y = area.y.saturating_add(area.height.saturating_sub(1));

    let x0 = area
        .x
        .saturating_add(rect.x.floor().max(0.0) as u16)
        .clamp(area.x, max_x);
    let y0 = area
        .y
        .saturating_add(rect.y.floor().max(0.0) as u16)
        .clamp(area.y, max_y);
    let x1 = area
        .x
        .saturating_add(((rect.x + rect.width).ceil().max(1.0) as u16).saturating_sub(1))
        .clamp(area.x, max_x);
    let y1 = area
        .y
        .saturating_add(((rect.y + rect.height).ceil().max(1.0) as u16).saturating_sub(1))
        .clamp(area.y, max_y);

    if x1 < x0 || y1 < y0 {
        return None;
    }
    Some((x0, y0, x1, y1))
}

/// Fit a label into `width` cells, counting characters rather than bytes so
/// non-ASCII names never split mid-character.
fn fit_label(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    let mut out: String = label.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn format_value(value: u64, mode: SizeMode) -> String {
    match mode {
        SizeMode::Size => format_size(value),
        SizeMode::Count | SizeMode::Activity => value.to_string(),
    }
}

fn format_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = size as f64;
    let mut unit_index = 0;
    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }
    format!("{:.1} {}", value, UNITS[unit_index])
}

/// Alpha-blend a tile fill over the treemap background.
fn blend(fill: Rgb, opacity: f32) -> Color {
    let mixed = BACKGROUND.lerp(fill, opacity);
    Color::Rgb(mixed.0, mixed.1, mixed.2)
}

struct TreemapWidget<'a> {
    app: &'a App,
}

impl Widget for TreemapWidget<'_> {
    fn render(self, area: UiRect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for y in area.y..area.y.saturating_add(area.height) {
            for x in area.x..area.x.saturating_add(area.width) {
                buf[(x, y)]
                    .set_char(' ')
                    .set_style(Style::default().bg(Color::Rgb(BACKGROUND.0, BACKGROUND.1, BACKGROUND.2)));
            }
        }

        // Animated tile bodies, parents painted before children.
        for (_, tile) in self.app.reconciler.visuals() {
            let visual = tile.visual();
            let Some((x0, y0, x1, y1)) = cell_bounds(visual.rect, area) else {
                continue;
            };
            let bg = blend(visual.fill, visual.opacity);
            for y in y0..=y1 {
                for x in x0..=x1 {
                    buf[(x, y)].set_char(' ').set_style(Style::default().bg(bg));
                }
            }
        }

        // Labels come from the current targets so text never smears while
        // rects are still in flight.
        let selected_key = self.app.selected.as_ref().map(|t| t.key.as_str());
        for tile in &self.app.hit_tiles {
            if tile.key == ROOT_KEY {
                continue;
            }
            let width = tile.x1.saturating_sub(tile.x0) as usize;
            if width < 4 {
                continue;
            }

            let full = if tile.is_collapsed {
                format!("+ {}", tile.name)
            } else {
                tile.name.clone()
            };
            let label = fit_label(&full, width);

            let is_selected = selected_key == Some(tile.key.as_str());
            let fg = if is_selected {
                Color::Rgb(246, 211, 101)
            } else {
                Color::Rgb(15, 23, 42)
            };
            let mut style = Style::default().fg(fg);
            if tile.is_folder {
                style = style.add_modifier(Modifier::BOLD);
            }

            for (i, ch) in label.chars().enumerate() {
                let x = tile.x0.saturating_add(i as u16);
                if x > tile.x1 {
                    break;
                }
                buf[(x, tile.y0)].set_char(ch).set_style(style);
            }
        }
    }
}

fn draw_ui(frame: &mut Frame, app: &mut App) {
    let root = frame.area();
    let split = Layout::horizontal([Constraint::Length(38), Constraint::Min(30)]).split(root);
    let left = split[0];
    let right = split[1];

    let left_block = Block::default()
        .title(format!(" {} ", app.title))
        .borders(Borders::ALL);
    let left_inner = left_block.inner(left);
    frame.render_widget(left_block, left);

    let left_rows = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(8),
        Constraint::Min(6),
        Constraint::Length(8),
    ])
    .split(left_inner);

    let status_text = if app.is_fetching {
        format!("{} ...", app.status)
    } else {
        app.status.clone()
    };
    frame.render_widget(
        Paragraph::new(status_text).block(Block::default().title(" Status ").borders(Borders::ALL)),
        left_rows[0],
    );

    let mode_label = match app.session.options.mode {
        SizeMode::Size => "size",
        SizeMode::Count => "count",
        SizeMode::Activity => "activity",
    };
    let color_label = match app.session.color_mode {
        ColorMode::Git => "git status",
        ColorMode::Age => "age",
        ColorMode::Activity => "activity",
    };
    let sort_label = match app.session.options.sort {
        SortMode::Alpha => "alphabetical",
        SortMode::Size => "size",
    };
    let on_off = |v: bool| if v { "on" } else { "off" };
    let view_lines = vec![
        Line::from(vec![
            Span::styled("Sizing: ", Style::default().fg(Color::Gray)),
            Span::raw(mode_label),
        ]),
        Line::from(vec![
            Span::styled("Colors: ", Style::default().fg(Color::Gray)),
            Span::raw(color_label),
        ]),
        Line::from(vec![
            Span::styled("Sort: ", Style::default().fg(Color::Gray)),
            Span::raw(sort_label),
            Span::raw("  "),
            Span::styled("folders first: ", Style::default().fg(Color::Gray)),
            Span::raw(on_off(app.session.options.folders_first)),
        ]),
        Line::from(vec![
            Span::styled("Hide clean: ", Style::default().fg(Color::Gray)),
            Span::raw(on_off(app.session.options.hide_clean)),
            Span::raw("  "),
            Span::styled("unstaged: ", Style::default().fg(Color::Gray)),
            Span::raw(on_off(app.session.options.show_unstaged)),
        ]),
        Line::from(vec![
            Span::styled("Collapse clean: ", Style::default().fg(Color::Gray)),
            Span::raw(on_off(app.session.options.collapse_clean)),
            Span::raw("  "),
            Span::styled("collapsed: ", Style::default().fg(Color::Gray)),
            Span::raw(app.session.collapsed.len().to_string()),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(view_lines).block(Block::default().title(" View ").borders(Borders::ALL)),
        left_rows[1],
    );

    let selection_lines = match app.selected.as_ref() {
        Some(tile) => vec![
            Line::from(vec![
                Span::styled("Path: ", Style::default().fg(Color::Gray)),
                Span::raw(if tile.key == ROOT_KEY {
                    "(root)".to_string()
                } else {
                    tile.key.clone()
                }),
            ]),
            Line::from(vec![
                Span::styled("Kind: ", Style::default().fg(Color::Gray)),
                Span::raw(if tile.is_collapsed {
                    "folder (collapsed)"
                } else if tile.is_folder {
                    "folder"
                } else {
                    "file"
                }),
            ]),
            Line::from(vec![
                Span::styled("Status: ", Style::default().fg(Color::Gray)),
                Span::raw(tile.status_label),
            ]),
            Line::from(vec![
                Span::styled("Value: ", Style::default().fg(Color::Gray)),
                Span::raw(format_value(tile.value, app.session.options.mode)),
            ]),
        ],
        None => vec![Line::from("Nothing selected")],
    };
    frame.render_widget(
        Paragraph::new(selection_lines)
            .block(Block::default().title(" Selection ").borders(Borders::ALL)),
        left_rows[2],
    );

    let help_lines = vec![
        Line::from("Left click: toggle collapse"),
        Line::from("Right click: focus folder"),
        Line::from("Middle click/0: expand all"),
        Line::from("m: sizing   c: colors   s: sort"),
        Line::from("f: folders first   h: hide clean"),
        Line::from("u: unstaged   x: collapse clean"),
        Line::from("r: refresh   q: quit"),
    ];
    frame.render_widget(
        Paragraph::new(help_lines)
            .block(Block::default().title(" Controls ").borders(Borders::ALL)),
        left_rows[3],
    );

    let treemap_block = Block::default().title(" Treemap ").borders(Borders::ALL);
    let treemap_inner = treemap_block.inner(right);
    frame.render_widget(treemap_block, right);

    if app.dirty {
        app.rebuild(treemap_inner);
    }

    if app.reconciler.is_empty() {
        frame.render_widget(
            Paragraph::new("No tree yet.").style(Style::default().fg(Color::Gray)),
            treemap_inner,
        );
    } else {
        frame.render_widget(TreemapWidget { app }, treemap_inner);
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: App,
    watch_rx: Option<Receiver<()>>,
) -> io::Result<()> {
    app.start_fetch();
    let mut last_tick = Instant::now();

    loop {
        app.poll_fetch();

        // File events debounce into a single refetch.
        if let Some(rx) = watch_rx.as_ref() {
            if rx.try_iter().count() > 0 {
                app.refetch_after =
                    Some(Instant::now() + Duration::from_millis(WATCH_DEBOUNCE_MS));
            }
        }
        if let Some(at) = app.refetch_after {
            if Instant::now() >= at && !app.is_fetching {
                app.refetch_after = None;
                app.start_fetch();
            }
        }

        let dt = last_tick.elapsed().as_secs_f32();
        last_tick = Instant::now();
        app.reconciler.advance(dt);

        terminal.draw(|frame| {
            draw_ui(frame, &mut app);
        })?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(FRAME_MS))? {
            match event::read()? {
                Event::Key(key) => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                Event::Resize(_, _) => {
                    app.dirty = true;
                    app.reconciler.finish_immediately();
                }
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
    }

    Ok(())
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let (service, watch_path) = match &cli.github {
        Some(spec) => {
            let repo: RepoRef = spec
                .parse()
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, format!("{err}")))?;
            let service = Service::remote(repo, std::env::var("GITHUB_TOKEN").ok())
                .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("{err}")))?;
            (service, None)
        }
        None => (
            Service::local(&cli.repo),
            cli.commit.is_none().then(|| cli.repo.clone()),
        ),
    };

    let query = match &cli.commit {
        Some(commit) => TreeQuery::at_commit(commit),
        None => TreeQuery::live(),
    };
    let app = App::new(service, query);

    // Live local mode watches the working tree and refetches on changes.
    let mut _watcher = None;
    let watch_rx = match watch_path {
        Some(path) => {
            let (tx, rx) = mpsc::channel::<()>();
            let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
                if res.is_ok() {
                    let _ = tx.send(());
                }
            })
            .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("{err}")))?;
            watcher
                .watch(&path, RecursiveMode::Recursive)
                .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("{err}")))?;
            _watcher = Some(watcher);
            Some(rx)
        }
        None => None,
    };

    enable_raw_mode()?;
    crossterm::execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let app_result = run_app(&mut terminal, app, watch_rx);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app_result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_label_counts_characters_not_bytes() {
        assert_eq!(fit_label("main.rs", 10), "main.rs");
        assert_eq!(fit_label("averylongname.rs", 8), "averylo…");
        // Multi-byte names must not split mid-character.
        assert_eq!(fit_label("ééé.rs", 5), "ééé.…");
        assert_eq!(fit_label("日本語のファイル.txt", 4), "日本語…");
    }

    #[test]
    fn cell_bounds_clamps_to_area() {
        let area = UiRect::new(2, 1, 10, 5);
        let (x0, y0, x1, y1) = cell_bounds(Rect::new(0.0, 0.0, 4.0, 2.0), area).unwrap();
        assert_eq!((x0, y0, x1, y1), (2, 1, 5, 2));

        // Degenerate rects hit nothing.
        assert!(cell_bounds(Rect::new(0.0, 0.0, 0.0, 3.0), area).is_none());
    }
}
