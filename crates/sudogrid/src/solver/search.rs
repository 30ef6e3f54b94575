//! Depth-first puzzle search.

use super::digit_set::DigitSet;
use super::game::Game;

fn unavailable_choices(game: &Game, x: u32, y: u32) -> DigitSet {
    let mut used = DigitSet::new();
    for column in 0..Game::WIDTH {
        used.insert(game.get(column, y));
    }
    for row in 0..Game::HEIGHT {
        used.insert(game.get(x, row));
    }
    let block_x = x / Game::BLOCK_WIDTH * Game::BLOCK_WIDTH;
    let block_y = y / Game::BLOCK_HEIGHT * Game::BLOCK_HEIGHT;
    for row in block_y..block_y + Game::BLOCK_HEIGHT {
        for column in block_x..block_x + Game::BLOCK_WIDTH {
            used.insert(game.get(column, row));
        }
    }
    used
}

/// Digits placeable at `(x, y)`: the complement of everything already in
/// the cell's row, column, and block.
fn available_choices(game: &Game, x: u32, y: u32) -> DigitSet {
    unavailable_choices(game, x, y).complement()
}

/// First empty cell strictly after row-major index `last`, if any.
fn next_open_position(game: &Game, last: i32) -> Option<(u32, u32)> {
    for index in (last + 1)..(Game::WIDTH * Game::HEIGHT) as i32 {
        let x = index as u32 % Game::WIDTH;
        let y = index as u32 / Game::WIDTH;
        if game.get(x, y) == Game::EMPTY_VALUE {
            return Some((x, y));
        }
    }
    None
}

fn solve_next(game: &mut Game, last: i32) -> bool {
    // No open position left means every cell is filled.
    let Some((x, y)) = next_open_position(game, last) else {
        return true;
    };
    let index = (y * Game::WIDTH + x) as i32;

    for choice in available_choices(game, x, y) {
        game.set(x, y, choice);
        if solve_next(game, index) {
            return true;
        }
    }

    // Clear the cell before backtracking so it cannot poison other paths.
    game.set(x, y, Game::EMPTY_VALUE);
    false
}

/// Solve in place by depth-first search; `false` when the board has no
/// completion. The board is left untouched on failure.
pub fn solve(game: &mut Game) -> bool {
    solve_next(game, -1)
}

/// Check that no placed digit conflicts with its row, column, or block.
///
/// A pre-flight gate: `solve` assumes its input passes this check.
pub fn solvable(game: &Game) -> bool {
    let mut game = game.clone();
    for y in 0..Game::HEIGHT {
        for x in 0..Game::WIDTH {
            let digit = game.get(x, y);
            if digit == Game::EMPTY_VALUE {
                continue;
            }
            game.set(x, y, Game::EMPTY_VALUE);
            let allowed = available_choices(&game, x, y).contains(digit);
            game.set(x, y, digit);
            if !allowed {
                return false;
            }
        }
    }
    true
}
