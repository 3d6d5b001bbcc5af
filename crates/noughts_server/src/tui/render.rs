//! Stateless rendering of the game screen.

use noughts_game::{Game, Outcome, Player, Position, Square};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const CELL_WIDTH: u16 = 7;
const CELL_HEIGHT: u16 = 3;

/// Everything the screen shows, borrowed from the application state.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    /// Game to draw.
    pub game: &'a Game,
    /// Highlighted cell.
    pub cursor: Position,
    /// Status line.
    pub status: &'a str,
    /// Our seat in a networked game.
    pub seat: Option<Player>,
    /// Networked session id.
    pub session_id: Option<&'a str>,
    /// Invitation link for the host.
    pub invite: Option<&'a str>,
    /// Blocking notice drawn over the board.
    pub alert: Option<&'a str>,
}

/// Draws the whole screen.
pub fn draw(frame: &mut Frame, view: &View) {
    let [title, scores, board, status, invite, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Min(CELL_HEIGHT * 3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new("Noughts & Crosses")
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        title,
    );
    frame.render_widget(
        Paragraph::new(scoreboard(view)).alignment(Alignment::Center),
        scores,
    );

    draw_board(frame, board, view);

    frame.render_widget(
        Paragraph::new(view.status)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        status,
    );

    let link = match (view.invite, view.session_id) {
        (Some(link), _) => format!("Invite: {link}"),
        (None, Some(id)) => format!("Session: {id}"),
        (None, None) => String::new(),
    };
    frame.render_widget(Paragraph::new(link).alignment(Alignment::Center), invite);

    frame.render_widget(
        Paragraph::new("1-9 or arrows+Enter: move   r: replay   q: quit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        help,
    );

    if let Some(alert) = view.alert {
        draw_alert(frame, alert);
    }
}

fn scoreboard(view: &View) -> Line<'static> {
    let game = view.game;
    let active = match game.outcome() {
        Outcome::Pending => Some(game.to_move()),
        _ => None,
    };
    let entry = |player: Player| {
        let marker = if active == Some(player) { "> " } else { "  " };
        let you = if view.seat == Some(player) { " (you)" } else { "" };
        Span::styled(
            format!(
                "{marker}{} ({}){you}: {}",
                game.name(player),
                player.mark(),
                game.scores().wins(player)
            ),
            mark_style(player),
        )
    };
    Line::from(vec![
        entry(Player::Cross),
        Span::raw(format!("   Draws: {}   ", game.scores().draws())),
        entry(Player::Circle),
    ])
}

fn mark_style(player: Player) -> Style {
    let color = match player {
        Player::Cross => Color::Blue,
        Player::Circle => Color::Red,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn draw_board(frame: &mut Frame, area: Rect, view: &View) {
    let area = center_rect(area, CELL_WIDTH * 3, CELL_HEIGHT * 3);
    let rows = Layout::vertical([Constraint::Length(CELL_HEIGHT); 3]).split(area);
    let winning = view.game.winning_line();

    for (row, row_area) in rows.iter().enumerate() {
        let cols = Layout::horizontal([Constraint::Length(CELL_WIDTH); 3]).split(*row_area);
        for (col, cell_area) in cols.iter().enumerate() {
            let Some(pos) = Position::from_index(row * 3 + col) else {
                continue;
            };
            let highlighted = winning.is_some_and(|line| line.contains(pos));
            draw_cell(frame, *cell_area, view, pos, highlighted);
        }
    }
}

fn draw_cell(frame: &mut Frame, area: Rect, view: &View, pos: Position, highlighted: bool) {
    let (text, mut style) = match view.game.board().get(pos) {
        Square::Empty => (
            (pos.to_index() + 1).to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        Square::Occupied(player) => (player.mark().to_string(), mark_style(player)),
    };
    if highlighted {
        style = style.bg(Color::Green);
    }
    let mut border = Style::default().fg(Color::DarkGray);
    if pos == view.cursor && !view.game.is_over() {
        style = style.add_modifier(Modifier::REVERSED);
        border = border.fg(Color::White);
    }

    let cell = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border));
    frame.render_widget(cell, area);
}

fn draw_alert(frame: &mut Frame, message: &str) {
    let width = (Line::from(message).width() as u16 + 4).min(frame.area().width);
    let area = center_rect(frame.area(), width, 3);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Black).bg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    fn render(view: &View) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(64, 24)).unwrap();
        terminal.draw(|frame| draw(frame, view)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn view(game: &Game) -> View<'_> {
        View {
            game,
            cursor: Position::Center,
            status: "status line",
            seat: None,
            session_id: None,
            invite: None,
            alert: None,
        }
    }

    #[test]
    fn test_draws_names_scores_and_status() {
        let game = Game::with_names("Ann", "Bob");
        let screen = text(&render(&view(&game)));
        assert!(screen.contains("> Ann (X): 0"));
        assert!(screen.contains("Bob (O): 0"));
        assert!(screen.contains("Draws: 0"));
        assert!(screen.contains("status line"));
    }

    #[test]
    fn test_winning_line_is_highlighted() {
        let mut game = Game::new();
        for index in [0, 3, 1, 4, 2] {
            game.play(Position::from_index(index).unwrap()).unwrap();
        }
        let buffer = render(&view(&game));
        let highlighted = buffer
            .content()
            .iter()
            .filter(|cell| cell.symbol() == "X" && cell.bg == Color::Green)
            .count();
        assert_eq!(highlighted, 3);
    }

    #[test]
    fn test_invite_link_and_alert() {
        let game = Game::new();
        let view = View {
            invite: Some("http://relay/?game=ab12"),
            alert: Some("Waiting for second player"),
            ..view(&game)
        };
        let screen = text(&render(&view));
        assert!(screen.contains("Invite: http://relay/?game=ab12"));
        assert!(screen.contains("Waiting for second player"));
    }

    #[test]
    fn test_alert_box_fits_display_width() {
        let game = Game::new();
        let message = "Attente du deuxième joueur…";
        let view = View {
            alert: Some(message),
            ..view(&game)
        };
        let buffer = render(&view);
        let boxed = buffer
            .content()
            .iter()
            .filter(|cell| cell.bg == Color::Yellow)
            .count();
        assert_eq!(boxed, (Line::from(message).width() + 4) * 3);
        assert!(text(&buffer).contains(message));
    }
}
