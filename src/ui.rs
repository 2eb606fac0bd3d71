//! Terminal UI rendering with ratatui

use crate::settings::HighScore;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use stackfall::{GameSnapshot, Rotation, TetrominoType};

const BLOCK: &str = "██";
const GHOST: &str = "░░";
const EMPTY: &str = "  ";

/// Side panel widths: hold(12) + next/stats(16)
const HOLD_WIDTH: u16 = 12;
const SIDE_WIDTH: u16 = 16;
/// Number of rows to show above the visible board (spawn area)
const VISIBLE_BUFFER: i32 = 2;
/// Pieces drawn in the next box
const NEXT_SHOWN: usize = 4;

/// What the front end is doing around the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Paused,
    GameOver { new_best: bool },
}

/// Get the color for a tetromino
fn piece_color(piece_type: TetrominoType) -> Color {
    match piece_type {
        TetrominoType::I => Color::Cyan,
        TetrominoType::O => Color::Yellow,
        TetrominoType::T => Color::Magenta,
        TetrominoType::S => Color::Green,
        TetrominoType::Z => Color::Red,
        TetrominoType::J => Color::Blue,
        TetrominoType::L => Color::Rgb(255, 165, 0), // Orange
    }
}

/// Render one frame of the game
pub fn render_game(frame: &mut Frame, state: &GameSnapshot, best: &HighScore, overlay: Overlay) {
    let area = frame.area();

    let board_rows = state.board.len() as u16;
    let board_cols = state.board.first().map_or(0, |row| row.len()) as u16;
    let board_width = board_cols * 2 + 2;
    let game_height = board_rows + VISIBLE_BUFFER as u16 + 2;

    // Center the game area
    let game_area = center_rect(area, HOLD_WIDTH + board_width + SIDE_WIDTH, game_height);

    // Create main layout: hold | board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(HOLD_WIDTH),
            Constraint::Length(board_width),
            Constraint::Length(SIDE_WIDTH),
        ])
        .split(game_area);

    render_hold(frame, main_layout[0], state.held);
    render_board(frame, main_layout[1], state);

    // Right side: next queue and stats
    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(NEXT_SHOWN as u16 * 3 + 2),
            Constraint::Min(6),
        ])
        .split(main_layout[2]);

    render_next_queue(frame, right_layout[0], &state.next);
    render_stats(frame, right_layout[1], state, best);

    match overlay {
        Overlay::None => {}
        Overlay::Paused => render_overlay(frame, area, "PAUSED", "Press P to resume"),
        Overlay::GameOver { new_best } => {
            let title = if new_best { "NEW BEST!" } else { "GAME OVER" };
            render_overlay(frame, area, title, "R to restart, Q to quit");
        }
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the hold piece box
fn render_hold(frame: &mut Frame, area: Rect, hold: Option<TetrominoType>) {
    let block = Block::default()
        .title(" HOLD ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(piece_type) = hold {
        render_mini_piece(frame, inner, piece_type);
    }
}

/// Render the next piece queue
fn render_next_queue(frame: &mut Frame, area: Rect, queue: &[TetrominoType]) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let num_pieces = queue.len().min(NEXT_SHOWN);
    if num_pieces == 0 {
        return;
    }

    let piece_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); num_pieces])
        .split(inner);

    for (i, &piece_type) in queue.iter().take(num_pieces).enumerate() {
        render_mini_piece(frame, piece_areas[i], piece_type);
    }
}

/// Render a small piece preview (for hold and next queue)
fn render_mini_piece(frame: &mut Frame, area: Rect, piece_type: TetrominoType) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let color = piece_color(piece_type);
    let shape = piece_type.shape(Rotation::North);

    // Spawn shapes span two rows; trim the empty rows and columns around them
    let min_row = shape.iter().map(|&(r, _)| r).min().unwrap_or(0);
    let min_col = shape.iter().map(|&(_, c)| c).min().unwrap_or(0);

    let lines: Vec<Line> = (0..2)
        .map(|row_offset| {
            let spans: Vec<Span> = (0..4)
                .map(|col_offset| {
                    if shape.contains(&(min_row + row_offset, min_col + col_offset)) {
                        Span::styled(BLOCK, Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, state: &GameSnapshot) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let active = state.active.cells();
    let ghost = state.ghost_cells();
    let color = piece_color(state.active.piece_type);
    let width = state.board.first().map_or(0, |row| row.len()) as i32;

    // Buffer rows above the board only ever show the falling piece
    let lines: Vec<Line> = (-VISIBLE_BUFFER..state.board.len() as i32)
        .map(|row| {
            let spans: Vec<Span> = (0..width)
                .map(|col| {
                    if active.contains(&(row, col)) {
                        Span::styled(BLOCK, Style::default().fg(color))
                    } else if let Some(placed) = state.cell(row, col) {
                        Span::styled(BLOCK, Style::default().fg(piece_color(placed)))
                    } else if row >= 0 && !state.game_over && ghost.contains(&(row, col)) {
                        Span::styled(GHOST, Style::default().fg(color).dim())
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, state: &GameSnapshot, best: &HighScore) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));

    let lines = vec![
        label("SCORE"),
        Line::from(Span::styled(
            state.score.to_string(),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        label("LEVEL"),
        Line::from(Span::styled(
            state.level.to_string(),
            Style::default().fg(Color::Cyan),
        )),
        Line::raw(""),
        label("LINES"),
        Line::from(Span::styled(
            state.lines.to_string(),
            Style::default().fg(Color::Green),
        )),
        Line::raw(""),
        label("BEST"),
        Line::from(Span::styled(
            best.score.max(state.score).to_string(),
            Style::default().fg(Color::Magenta),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 28u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
