//! Layout and drawing: title screen, playfield, ghost, next/hold previews, stats,
//! pause, game over and quit overlays.

use crate::app::{QuitOption, Screen};
use crate::theme::Theme;
use blockfall::{Cell, Phase, PieceKind, Snapshot};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Each field cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;
/// Next + hold + stats + help boxes stacked.
const SIDEBAR_HEIGHT: u16 = 22;

/// Duration of the line-clear fade (TachyonFX) in ms.
const LINE_CLEAR_FADE_MS: u32 = 300;

const BLOCK: &str = "██";
const GHOST: &str = "░░";
const EMPTY: &str = " ·";

/// Rows removed by a clear, with their cells as they looked before removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearFlash {
    pub rows: Vec<usize>,
    pub cells: Vec<Vec<Cell>>,
}

fn bold(style: Style) -> Style {
    style.add_modifier(Modifier::BOLD)
}

/// Terminal length for a field coordinate or extent, pinned at `u16::MAX`.
fn term_len(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Terminal columns covered by `cells` field columns.
fn columns(cells: usize) -> u16 {
    term_len(cells).saturating_mul(CELL_WIDTH)
}

/// Bordered playfield size in terminal cells for a field of `width` × `height`.
fn playfield_outer_size(width: usize, height: usize) -> (u16, u16) {
    (
        columns(width).saturating_add(2),
        term_len(height).saturating_add(2),
    )
}

/// Terminal size needed for playfield plus sidebar.
pub fn required_terminal_size(width: usize, height: usize) -> (u16, u16) {
    let (pw, ph) = playfield_outer_size(width, height);
    (pw.saturating_add(SIDEBAR_WIDTH), ph.max(SIDEBAR_HEIGHT))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Playfield and sidebar rects, centred in `area`.
fn game_layout(area: Rect, snap: &Snapshot<'_>) -> (Rect, Rect) {
    let (pw, ph) = playfield_outer_size(snap.field.width(), snap.field.height());
    let (total_w, total_h) = required_terminal_size(snap.field.width(), snap.field.height());
    let active = centered(area, total_w, total_h);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(active);
    let playfield = Rect {
        height: ph.min(inner[0].height),
        ..inner[0]
    };
    (playfield, inner[1])
}

/// Board rect (inside the border) for the field.
fn board_rect(playfield: Rect, snap: &Snapshot<'_>) -> Rect {
    Rect {
        x: playfield.x + 1,
        y: playfield.y + 1,
        width: columns(snap.field.width()).min(playfield.width.saturating_sub(2)),
        height: term_len(snap.field.height()).min(playfield.height.saturating_sub(2)),
    }
}

/// Draw current screen with optional pause overlay, line-clear fade and quit menu.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    snap: &Snapshot<'_>,
    theme: &Theme,
    flash: Option<&ClearFlash>,
    line_clear_effect: &mut Option<Effect>,
    line_clear_process_time: &mut Option<Instant>,
    quit_selected: QuitOption,
    menu_start: Instant,
    now: Instant,
) {
    let area = frame.area();
    let (need_w, need_h) = required_terminal_size(snap.field.width(), snap.field.height());
    if area.width < need_w || area.height < need_h {
        draw_too_small(frame, theme, area, need_w, need_h);
        return;
    }

    match screen {
        Screen::Menu => draw_menu(frame, theme, area, menu_start, now),
        Screen::Playing | Screen::QuitMenu => {
            draw_game(frame, snap, theme, area, flash);
            if let Some(flash) = flash {
                apply_line_clear_effect(
                    frame,
                    snap,
                    theme,
                    area,
                    flash,
                    line_clear_effect,
                    line_clear_process_time,
                    now,
                );
            }
            if screen == Screen::QuitMenu {
                draw_quit_menu(frame, theme, quit_selected);
            } else if snap.phase == Phase::Paused {
                draw_pause_overlay(frame, theme, area);
            }
        }
        Screen::GameOver => {
            draw_game(frame, snap, theme, area, None);
            draw_game_over(frame, snap, theme, area);
        }
    }
}

fn draw_too_small(frame: &mut Frame, theme: &Theme, area: Rect, need_w: u16, need_h: u16) {
    let lines = vec![
        Line::from(Span::styled(" Terminal too small ", bold(Style::default().fg(theme.title)))),
        Line::from(Span::styled(
            format!(" need {need_w}×{need_h}, have {}×{} ", area.width, area.height),
            Style::default().fg(theme.main_fg),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered(area, area.width, 2),
    );
}

fn draw_menu(frame: &mut Frame, theme: &Theme, area: Rect, menu_start: Instant, now: Instant) {
    let popup = centered(area, 44, 18);
    let key = Style::default().fg(theme.piece_color(PieceKind::J.color_index()));
    let fg = Style::default().fg(theme.main_fg);

    let title = Line::from(
        PieceKind::ALL
            .iter()
            .zip("BLOCKFALL".chars().collect::<Vec<_>>().chunks(2))
            .map(|(kind, letters)| {
                Span::styled(
                    letters.iter().collect::<String>(),
                    bold(Style::default().fg(theme.piece_color(kind.color_index()))),
                )
            })
            .collect::<Vec<_>>(),
    );

    let controls = [
        ("← →", "move"),
        ("SPACE", "rotate"),
        ("↓", "soft drop"),
        ("↑", "hard drop"),
        ("C", "hold"),
        ("P", "pause"),
    ];
    let mut lines = vec![Line::from(""), title, Line::from(""), Line::from("")];
    lines.extend(controls.iter().map(|(k, what)| {
        Line::from(vec![
            Span::styled(format!("{k:>6} "), key),
            Span::styled(format!("{what:<10}"), fg),
        ])
    }));
    lines.extend([
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            " [ ENTER ] START ",
            bold(Style::default().fg(Color::Black).bg(theme.title)),
        )),
        Line::from(""),
        Line::from(Span::styled(" [Q] quit ", Style::default().fg(theme.inactive_fg))),
    ]);

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );

    // Startup animation: slide in from bottom, ease out cubic
    let elapsed = now.saturating_duration_since(menu_start).as_millis() as f32;
    let t = (elapsed / 500.0).min(1.0);
    let offset_t = 1.0 - (1.0 - t).powi(3);
    let mut anim_popup = popup;
    anim_popup.y += ((1.0 - offset_t) * 10.0) as u16;
    anim_popup.height = anim_popup.height.min(area.bottom().saturating_sub(anim_popup.y));

    frame.render_widget(p, anim_popup);
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(p, popup);
}

fn draw_game_over(frame: &mut Frame, snap: &Snapshot<'_>, theme: &Theme, area: Rect) {
    let popup = centered(area, 30, 11);
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", snap.score), fg)),
        Line::from(Span::styled(format!(" Level: {} ", snap.level), fg)),
        Line::from(Span::styled(format!(" Lines: {} ", snap.lines), fg)),
        Line::from(""),
        Line::from(Span::styled(" R — Restart    Q — Quit ", fg)),
        Line::from(""),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" Blockfall ", theme.title)),
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(p, popup);
}

/// Draw game: playfield + sidebar; use full area and center the board.
fn draw_game(
    frame: &mut Frame,
    snap: &Snapshot<'_>,
    theme: &Theme,
    area: Rect,
    flash: Option<&ClearFlash>,
) {
    let (playfield_area, sidebar_area) = game_layout(area, snap);
    draw_playfield(frame, snap, theme, playfield_area, flash);
    draw_sidebar(frame, snap, theme, sidebar_area);
}

fn draw_playfield(
    frame: &mut Frame,
    snap: &Snapshot<'_>,
    theme: &Theme,
    area: Rect,
    flash: Option<&ClearFlash>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Blockfall ", theme.title));
    frame.render_widget(block, area);

    let board = board_rect(area, snap);
    let buf = frame.buffer_mut();
    let mut put = |x: i32, y: i32, symbol: &str, fg: Color| {
        if x < 0 || y < 0 {
            return;
        }
        let rx = board.x.saturating_add(columns(x as usize));
        let ry = board.y.saturating_add(term_len(y as usize));
        if rx.saturating_add(CELL_WIDTH) <= board.right() && ry < board.bottom() {
            buf.set_string(rx, ry, symbol, Style::default().fg(fg).bg(theme.bg));
        }
    };

    for (y, row) in snap.field.rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            match cell {
                Cell::Filled(kind) => {
                    put(x as i32, y as i32, BLOCK, theme.piece_color(kind.color_index()));
                }
                Cell::Empty => put(x as i32, y as i32, EMPTY, theme.div_line),
            }
        }
    }

    if let Some(flash) = flash {
        for (&y, cells) in flash.rows.iter().zip(&flash.cells) {
            for (x, cell) in cells.iter().enumerate() {
                if cell.is_filled() {
                    put(x as i32, y as i32, BLOCK, Color::White);
                }
            }
        }
    }

    if snap.phase == Phase::Over {
        return;
    }
    if let (Some(ghost), Some(current)) = (snap.ghost, snap.current) {
        if ghost.y != current.y {
            let color = theme.piece_color(ghost.kind.color_index());
            for (x, y) in ghost.cells() {
                put(x, y, GHOST, color);
            }
        }
    }
    if let Some(current) = snap.current {
        let color = theme.piece_color(current.kind.color_index());
        for (x, y) in current.cells() {
            put(x, y, BLOCK, color);
        }
    }
}

/// Build set of buffer (x, y) positions covered by the flashing rows.
fn clearing_buffer_positions(board: Rect, flash: &ClearFlash) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &y in &flash.rows {
        let ry = board.y.saturating_add(term_len(y));
        if ry >= board.bottom() {
            continue;
        }
        for rx in board.x..board.right() {
            set.insert((rx, ry));
        }
    }
    set
}

/// Create or update line-clear fade effect and process it.
fn apply_line_clear_effect(
    frame: &mut Frame,
    snap: &Snapshot<'_>,
    theme: &Theme,
    area: Rect,
    flash: &ClearFlash,
    line_clear_effect: &mut Option<Effect>,
    line_clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let (playfield, _) = game_layout(area, snap);
    let board = board_rect(playfield, snap);
    let delta = line_clear_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    *line_clear_process_time = Some(now);

    if line_clear_effect.is_none() {
        let clearing_set = clearing_buffer_positions(board, flash);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            clearing_set.contains(&(pos.x, pos.y))
        }));
        let bg = theme.bg;
        let effect = fx::fade_to(bg, bg, (LINE_CLEAR_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board);
        *line_clear_effect = Some(effect);
    }

    if let Some(effect) = line_clear_effect {
        frame.render_effect(effect, board, tfx_delta);
    }
}

fn sidebar_block(theme: &Theme, title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
}

fn draw_sidebar(frame: &mut Frame, snap: &Snapshot<'_>, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Next
            Constraint::Length(5), // Hold
            Constraint::Length(6), // Score, level, lines, speed
            Constraint::Length(6), // Key help
        ])
        .split(area);

    let next_block = sidebar_block(theme, " Next ");
    let next_inner = next_block.inner(chunks[0]);
    frame.render_widget(next_block, chunks[0]);
    if let Some(next) = snap.next {
        draw_piece_preview(frame, next_inner, next.kind, theme.piece_color(next.kind.color_index()));
    }

    let hold_title = if snap.can_hold { " Hold " } else { " Hold (used) " };
    let hold_block = sidebar_block(theme, hold_title);
    let hold_inner = hold_block.inner(chunks[1]);
    frame.render_widget(hold_block, chunks[1]);
    if let Some(held) = snap.held {
        let color = if snap.can_hold {
            theme.piece_color(held.kind.color_index())
        } else {
            theme.inactive_fg
        };
        draw_piece_preview(frame, hold_inner, held.kind, color);
    }

    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let stats = vec![
        stat("Score: ", snap.score.to_string()),
        stat("Level: ", snap.level.to_string()),
        stat("Lines: ", snap.lines.to_string()),
        stat("Speed: ", format!("{} ms", snap.drop_interval_ms)),
    ];
    let stats_block = sidebar_block(theme, " Stats ");
    frame.render_widget(Paragraph::new(stats).block(stats_block), chunks[2]);

    let dim = Style::default().fg(theme.inactive_fg);
    let help = vec![
        Line::from(Span::styled("←→ move  SPC rotate", dim)),
        Line::from(Span::styled("↓ soft   ↑ hard", dim)),
        Line::from(Span::styled("C hold   P pause", dim)),
        Line::from(Span::styled("Q quit", dim)),
    ];
    frame.render_widget(Paragraph::new(help).block(sidebar_block(theme, " Keys ")), chunks[3]);
}

/// Offset that centres a piece's spawn shape inside a preview box.
fn preview_origin(area: Rect, kind: PieceKind) -> (u16, u16) {
    let shape = kind.shape(0);
    let w = shape.width() as u16 * CELL_WIDTH;
    let h = shape.height() as u16;
    (
        area.x + area.width.saturating_sub(w) / 2,
        area.y + area.height.saturating_sub(h) / 2,
    )
}

/// Draw a piece in its spawn orientation, centred in `area`.
fn draw_piece_preview(frame: &mut Frame, area: Rect, kind: PieceKind, color: Color) {
    let (ox, oy) = preview_origin(area, kind);
    let style = Style::default().fg(color);
    let buf = frame.buffer_mut();
    for (dx, dy) in kind.shape(0).cells() {
        let x = ox + dx as u16 * CELL_WIDTH;
        let y = oy + dy as u16;
        if x + CELL_WIDTH <= area.right() && y < area.bottom() {
            buf.set_string(x, y, BLOCK, style);
        }
    }
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 6);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title).bg(theme.bg))
        .title(" Quit? ");
    let inner = block.inner(quit_rect);
    frame.render_widget(Clear, quit_rect);
    frame.render_widget(block, quit_rect);

    let options = [(QuitOption::Resume, " Resume "), (QuitOption::Exit, " Exit ")];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            bold(Style::default().fg(theme.bg).bg(theme.title))
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        frame.buffer_mut().set_string(rx, ry, label, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall::{EngineConfig, Sequence, Session};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buf = terminal.backend().buffer();
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn render(session: &Session, screen: Screen, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let theme = Theme::default();
        let snap = session.snapshot();
        let now = Instant::now();
        let mut effect = None;
        let mut process_time = None;
        terminal
            .draw(|f| {
                draw(
                    f,
                    screen,
                    &snap,
                    &theme,
                    None,
                    &mut effect,
                    &mut process_time,
                    QuitOption::Resume,
                    now,
                    now,
                )
            })
            .unwrap();
        buffer_text(&terminal)
    }

    #[test]
    fn required_size_fits_default_field() {
        assert_eq!(required_terminal_size(10, 20), (22 + SIDEBAR_WIDTH, 22));
        assert_eq!(required_terminal_size(10, 40), (22 + SIDEBAR_WIDTH, 42));
    }

    #[test]
    fn oversized_field_saturates_instead_of_overflowing() {
        assert_eq!(required_terminal_size(40_000, 20), (u16::MAX, 22));
        assert_eq!(required_terminal_size(10, usize::MAX), (22 + SIDEBAR_WIDTH, u16::MAX));
    }

    #[test]
    fn preview_is_centred() {
        let area = Rect::new(10, 5, 20, 3);
        // I spawn shape is 4 cells = 8 columns wide, 1 row tall
        assert_eq!(preview_origin(area, PieceKind::I), (16, 6));
    }

    #[test]
    fn playing_screen_shows_stats_and_piece() {
        let mut session = Session::new(
            EngineConfig::default(),
            Box::new(Sequence::new(vec![PieceKind::O])),
        )
        .unwrap();
        session.start();
        let text = render(&session, Screen::Playing, 60, 24);
        assert!(text.contains("Score: 0"));
        assert!(text.contains("Level: 1"));
        assert!(text.contains("Next"));
        assert!(text.contains('█'));
        assert!(text.contains('░'));
    }

    #[test]
    fn small_terminal_gets_a_notice() {
        let session =
            Session::new(EngineConfig::default(), Box::new(Sequence::new(vec![]))).unwrap();
        let text = render(&session, Screen::Menu, 30, 10);
        assert!(text.contains("Terminal too small"));
    }
}
