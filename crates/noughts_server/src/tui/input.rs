//! Keyboard mapping.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use noughts_game::Position;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Claim a cell.
    Place(Position),
    /// Start another round.
    Replay,
    /// Leave the game.
    Quit,
}

/// Moves the cursor one cell with the arrow keys, stopping at the edges.
pub fn move_cursor(cursor: Position, key: KeyCode) -> Position {
    let index = cursor.to_index();
    let (row, col) = (index / 3, index % 3);
    let (row, col) = match key {
        KeyCode::Up => (row.saturating_sub(1), col),
        KeyCode::Down => ((row + 1).min(2), col),
        KeyCode::Left => (row, col.saturating_sub(1)),
        KeyCode::Right => (row, (col + 1).min(2)),
        _ => (row, col),
    };
    Position::from_index(row * 3 + col).unwrap_or(cursor)
}

/// Maps a key to an intent, moving `cursor` for arrow keys.
///
/// Digits 1-9 pick a cell directly, Enter or Space picks the cell under the
/// cursor.
pub fn interpret(key: KeyEvent, cursor: &mut Position) -> Option<Intent> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Intent::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(Intent::Quit),
        KeyCode::Char('r') => Some(Intent::Replay),
        KeyCode::Char(digit @ '1'..='9') => {
            let pos = digit
                .to_digit(10)
                .and_then(|d| Position::from_index(d as usize - 1))?;
            *cursor = pos;
            Some(Intent::Place(pos))
        }
        KeyCode::Enter | KeyCode::Char(' ') => Some(Intent::Place(*cursor)),
        code @ (KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right) => {
            *cursor = move_cursor(*cursor, code);
            None
        }
        _ => None,
    }
}
