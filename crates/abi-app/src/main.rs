use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use image::RgbaImage;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use abi_config::FaceConfig;
use abi_core::{
    input::{FaceKey, InputTracker},
    logging::{self, LogBuffer, LogLevel},
    rate::RateMeter,
};
use abi_face::{AnimationState, ExpressionAnimator, ExpressionKind, FaceController};
use abi_ui::{
    face::render_face,
    graphics::{detect_backend, GraphicsBackend},
    iterm::InlineImageWriter,
    layout::face_layout,
    post::{bloom, fit_to_cells},
    status::{render_status, StatusView},
};

/// Inline images get this many pixels per cell column (and twice that per
/// row) so the terminal has something sharper than the half-block grid.
const ITERM_PIXELS_PER_CELL: u16 = 4;

type Term = Terminal<CrosstermBackend<Stdout>>;

struct App {
    config: FaceConfig,
    face: FaceController,
    input: InputTracker,
    tick_rate: RateMeter,
    log_buffer: LogBuffer,
    backend: GraphicsBackend,
    inline: InlineImageWriter,
    /// Full-resolution frame from the last tick.
    frame: RgbaImage,
    /// Ticks so far; identifies `frame`.
    generation: u64,
    /// Post-processed frame for the current face area.
    presented: Option<(u64, Rect, RgbaImage)>,
}

impl App {
    fn new(config: FaceConfig, log_buffer: LogBuffer, backend: GraphicsBackend) -> Self {
        let face = FaceController::from_config(&config);
        let frame = face.render();
        Self {
            input: InputTracker::new(
                Duration::from_millis(config.timing.hold_ms),
                Duration::from_millis(config.timing.repeat_delay_ms),
            ),
            config,
            face,
            tick_rate: RateMeter::default(),
            log_buffer,
            backend,
            inline: InlineImageWriter::new(),
            frame,
            generation: 0,
            presented: None,
        }
    }

    /// Feed one terminal key event. Returns `true` when the user asked to quit.
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.kind != KeyEventKind::Release
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        {
            return true;
        }

        let Some(face_key) = face_key(key.code) else {
            return false;
        };
        match key.kind {
            KeyEventKind::Press => self.input.press(face_key, now),
            KeyEventKind::Repeat => self.input.repeat(face_key, now),
            KeyEventKind::Release => self.input.release(face_key),
        }
        false
    }

    fn tick(&mut self, now: Instant) {
        let snapshot = self.input.snapshot(now);
        self.face.tick(&snapshot, &mut rand::rng());
        self.frame = self.face.render();
        self.generation += 1;
        self.tick_rate.record(now);
    }

    /// The frame fitted to `area` and run through the bloom pass, recomputed
    /// only when the face ticked or the area changed.
    fn presented(&mut self, area: Rect) -> Option<&RgbaImage> {
        let stale = !matches!(
            &self.presented,
            Some((generation, cached_area, _)) if *generation == self.generation && *cached_area == area
        );
        if stale {
            let (cols, rows, sigma_scale) = match self.backend {
                GraphicsBackend::UnicodeBlock => (area.width, area.height, 1.0),
                GraphicsBackend::ITerm2 => (
                    area.width.saturating_mul(ITERM_PIXELS_PER_CELL),
                    area.height.saturating_mul(ITERM_PIXELS_PER_CELL),
                    ITERM_PIXELS_PER_CELL as f32,
                ),
            };
            let fitted = fit_to_cells(&self.frame, cols, rows)?;
            let image = if self.config.bloom.enabled {
                bloom(&fitted, self.config.bloom.sigma * sigma_scale)
            } else {
                fitted
            };
            self.presented = Some((self.generation, area, image));
        }
        self.presented.as_ref().map(|(_, _, image)| image)
    }
}

fn face_key(code: KeyCode) -> Option<FaceKey> {
    match code {
        KeyCode::Up => Some(FaceKey::Up),
        KeyCode::Down => Some(FaceKey::Down),
        KeyCode::Left => Some(FaceKey::Left),
        KeyCode::Right => Some(FaceKey::Right),
        KeyCode::Char(c) => FaceKey::from_char(c),
        _ => None,
    }
}

fn describe<E: ExpressionKind>(feature: &ExpressionAnimator<E>) -> String {
    let state = match feature.state() {
        AnimationState::Idle => "idle",
        AnimationState::Active => "active",
        AnimationState::Finished => "done",
    };
    match feature.expression() {
        Some(kind) => format!("{kind:?} ({state})"),
        None => state.to_string(),
    }
}

fn setup_terminal() -> Result<(Term, bool)> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Without release events the tracker falls back to its hold window.
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    Ok((Terminal::new(backend)?, enhanced))
}

fn restore_terminal(mut terminal: Term, enhanced: bool) -> Result<()> {
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    let log_buffer = logging::init();
    tracing::info!("Abi starting up");

    let (config, source) = FaceConfig::load().context("failed to load face config")?;
    match &source {
        Some(path) => tracing::info!(path = %path.display(), "loaded face config"),
        None => tracing::info!("using default face config"),
    }

    let backend = detect_backend();
    tracing::info!(%backend, "graphics backend selected");

    let app = App::new(config, log_buffer, backend);
    let (width, height) = app.face.frame_size();
    tracing::info!(width, height, "face ready");

    let (mut terminal, enhanced) = setup_terminal().context("failed to set up terminal")?;
    let res = run(&mut terminal, app);
    restore_terminal(terminal, enhanced)?;
    tracing::info!("Abi shutting down");
    res
}

fn run(terminal: &mut Term, mut app: App) -> Result<()> {
    let tick_interval = Duration::from_millis(app.config.timing.tick_interval_ms);
    let poll_timeout = Duration::from_millis(app.config.timing.poll_interval_ms);
    let mut last_tick = Instant::now();

    loop {
        // ── Render ──
        let mut inline_area = None;
        terminal.draw(|f| {
            let rects = face_layout(f.area());
            if app.backend == GraphicsBackend::UnicodeBlock {
                if let Some(image) = app.presented(rects.face) {
                    render_face(f.buffer_mut(), rects.face, image);
                }
            } else {
                inline_area = Some(rects.face);
            }

            let eyes = describe(app.face.left_eye());
            let mouth = describe(app.face.mouth());
            let log = logging::latest(&app.log_buffer, LogLevel::Info)
                .map(|entry| format!("{} {}", entry.level, entry.message));
            let view = StatusView {
                eyes: &eyes,
                mouth: &mouth,
                tps: app.tick_rate.per_second(),
                log: log.as_deref(),
            };
            render_status(f, rects.status, &view);
        })?;

        // The inline image bypasses ratatui's buffer.
        if let Some(area) = inline_area {
            let generation = app.generation;
            if let Some(image) = app.presented(area).cloned() {
                app.inline
                    .write(terminal.backend_mut(), area, &image, generation)
                    .context("failed to write inline image")?;
            }
        }

        // ── Input ──
        if event::poll(poll_timeout)? {
            match event::read()? {
                CEvent::Key(key) => {
                    if app.handle_key(key, Instant::now()) {
                        return Ok(());
                    }
                }
                CEvent::Resize(cols, rows) => {
                    tracing::debug!(cols, rows, "terminal resized");
                    app.presented = None;
                }
                _ => {}
            }
        }

        // ── Tick ──
        if last_tick.elapsed() >= tick_interval {
            last_tick = Instant::now();
            app.tick(last_tick);
        }
    }
}
