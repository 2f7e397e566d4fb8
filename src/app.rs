//! App: terminal init, main loop, tick and key handling.

use crate::DisplayConfig;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, ClearFlash};
use anyhow::{Context, Result};
use blockfall::{Controls, GameEvent, Phase, Session};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// DAS (Delayed Auto-Shift): delay before movement starts repeating when you hold a key.
const REPEAT_DELAY_MS: u64 = 170;
/// ARR (Auto-Repeat Rate): time between repeated moves while holding. 50 ms ≈ 20 moves/sec.
const REPEAT_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    Exit,
}

impl QuitOption {
    fn toggled(self) -> Self {
        match self {
            Self::Resume => Self::Exit,
            Self::Exit => Self::Resume,
        }
    }
}

pub struct App {
    session: Session,
    theme: Theme,
    display: DisplayConfig,
    /// Wall-clock point up to which elapsed time has been fed to the session.
    last_tick: Instant,
    menu_start: Instant,
    repeat_state: Option<(Action, Instant)>,
    last_repeat_fire: Option<Instant>,
    /// Terminal reports key releases; without them held-key repeat is left to the OS.
    release_events: bool,
    quit_open: bool,
    quit_selected: QuitOption,
    /// Session was running when the quit menu opened; resume it on close.
    paused_for_quit: bool,
    /// Rows removed by the most recent clear, shown while the fade runs.
    clear_flash: Option<ClearFlash>,
    /// TachyonFX fade effect for line-clear (created when animation starts).
    line_clear_effect: Option<Effect>,
    /// Last time we processed the line-clear effect (for delta).
    line_clear_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(mut session: Session, display: DisplayConfig, theme: Theme) -> Self {
        if display.no_menu {
            session.start();
        }
        let now = Instant::now();
        Self {
            session,
            theme,
            display,
            last_tick: now,
            menu_start: now,
            repeat_state: None,
            last_repeat_fire: None,
            release_events: false,
            quit_open: false,
            quit_selected: QuitOption::Resume,
            paused_for_quit: false,
            clear_flash: None,
            line_clear_effect: None,
            line_clear_effect_process_time: None,
        }
    }

    fn screen(&self) -> Screen {
        if self.quit_open {
            return Screen::QuitMenu;
        }
        match self.session.phase() {
            Phase::Idle => Screen::Menu,
            Phase::Running | Phase::Paused => Screen::Playing,
            Phase::Over => Screen::GameOver,
        }
    }

    fn open_quit_menu(&mut self) {
        self.paused_for_quit = self.session.is_running();
        self.session.pause();
        self.quit_open = true;
        self.quit_selected = QuitOption::Resume;
        self.repeat_state = None;
    }

    fn close_quit_menu(&mut self) {
        self.quit_open = false;
        if self.paused_for_quit {
            self.session.resume();
        }
        self.paused_for_quit = false;
    }

    /// Feed whole elapsed milliseconds to the session; the remainder carries over.
    fn tick_session(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_tick);
        let ms = elapsed.as_millis().min(u128::from(u64::MAX)) as u64;
        self.last_tick += Duration::from_millis(ms);
        self.session.tick(ms);
    }

    fn drain_events(&mut self) {
        for event in self.session.take_events() {
            match event {
                GameEvent::LinesCleared { rows, cells } if !self.display.no_animation => {
                    self.clear_flash = Some(ClearFlash { rows, cells });
                    self.line_clear_effect = None;
                    self.line_clear_effect_process_time = None;
                }
                GameEvent::Started | GameEvent::GameOver => {
                    self.repeat_state = None;
                    self.last_repeat_fire = None;
                }
                GameEvent::Locked(_) => {
                    // Held keys should not carry over to the next piece.
                    if self.repeat_state.is_some_and(|(a, _)| a == Action::SoftDrop) {
                        self.repeat_state = None;
                    }
                }
                _ => {}
            }
        }
    }

    fn tick_repeat(&mut self, now: Instant) {
        let Some((action, first)) = self.repeat_state else {
            return;
        };
        if !self.session.is_running() {
            return;
        }
        if now.saturating_duration_since(first) < Duration::from_millis(REPEAT_DELAY_MS) {
            return;
        }
        let next = self.last_repeat_fire.unwrap_or(first) + Duration::from_millis(REPEAT_INTERVAL_MS);
        if now >= next {
            if let Some(command) = action.command() {
                self.session.apply(command);
            }
            self.last_repeat_fire = Some(now);
        }
    }

    /// Handle one pressed key. Returns true when the app should exit.
    fn handle_action(&mut self, action: Action, code: KeyCode) -> bool {
        match self.screen() {
            Screen::Menu => match action {
                Action::Quit => return true,
                Action::Start | Action::HardDrop => self.session.start(),
                _ => {}
            },
            Screen::Playing => match action {
                Action::Quit => self.open_quit_menu(),
                Action::None => {}
                _ => {
                    if let Some(command) = action.command() {
                        self.session.apply(command);
                    }
                    if self.release_events && action.repeats() && self.session.is_running() {
                        self.repeat_state = Some((action, Instant::now()));
                        self.last_repeat_fire = None;
                    }
                }
            },
            Screen::QuitMenu => match action {
                Action::MoveLeft | Action::MoveRight | Action::SoftDrop | Action::HardDrop => {
                    self.quit_selected = self.quit_selected.toggled();
                }
                Action::Start | Action::Rotate => match self.quit_selected {
                    QuitOption::Resume => self.close_quit_menu(),
                    QuitOption::Exit => return true,
                },
                Action::Pause | Action::Quit => self.close_quit_menu(),
                _ => {}
            },
            Screen::GameOver => {
                if action == Action::Quit {
                    return true;
                }
                if action == Action::Start || matches!(code, KeyCode::Char('r' | 'R')) {
                    self.session.start();
                }
            }
        }
        false
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

        // Attempt to enable enhanced keyboard for Release events
        self.release_events = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        if self.release_events {
            let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        }
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_rate = self.display.frame_rate.max(1.0);
        let frame_duration = Duration::from_secs_f64(1.0 / frame_rate);
        self.last_tick = Instant::now();

        loop {
            let now = Instant::now();
            self.tick_session(now);
            self.tick_repeat(now);
            self.drain_events();

            let screen = self.screen();
            let snapshot = self.session.snapshot();
            terminal.draw(|f| {
                ui::draw(
                    f,
                    screen,
                    &snapshot,
                    &self.theme,
                    self.clear_flash.as_ref(),
                    &mut self.line_clear_effect,
                    &mut self.line_clear_effect_process_time,
                    self.quit_selected,
                    self.menu_start,
                    now,
                );
            })?;

            if self.line_clear_effect.as_ref().is_some_and(|e| e.done()) {
                self.clear_flash = None;
                self.line_clear_effect = None;
                self.line_clear_effect_process_time = None;
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    let action = key_to_action(key);

                    // Ignore OS repeats and only process first Press.
                    if key.kind != KeyEventKind::Press {
                        if key.kind == KeyEventKind::Release
                            && self.repeat_state.map(|(a, _)| a) == Some(action)
                        {
                            self.repeat_state = None;
                            self.last_repeat_fire = None;
                        }
                        continue;
                    }

                    // If we are already repeating this action, ignore subsequent OS Press events
                    if self.repeat_state.map(|(a, _)| a) == Some(action) {
                        continue;
                    }
                    if self.handle_action(action, key.code) {
                        return Ok(());
                    }
                    self.drain_events();
                }
            }
        }
    }
}
