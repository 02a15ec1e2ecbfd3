use crate::models::BoardStats;
use crate::slot::{Board, Category, SLOT_COUNT};

pub fn count_of(board: &Board, category: Category) -> usize {
    board.iter().filter(|slot| slot.color == category).count()
}

pub fn build_stats(board: &Board) -> BoardStats {
    let pink = count_of(board, Category::Pink);
    let blue = count_of(board, Category::Blue);

    BoardStats {
        pink,
        blue,
        total: pink + blue,
        capacity: SLOT_COUNT,
    }
}
