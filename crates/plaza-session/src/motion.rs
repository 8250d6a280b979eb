//! The movement rule: strict cardinal single-step.

use plaza_protocol::Position;

/// Returns `true` iff `from → to` is a valid move.
///
/// A move is valid when the Manhattan distance between the two positions
/// is exactly 1: one coordinate changes by exactly one cell and the other
/// is unchanged. This single predicate simultaneously forbids staying
/// still, diagonal movement, and any jump of more than one cell.
///
/// Pure and evaluated before any mutation, so rejection has no side
/// effects. Note the absence of a bounds check: containment is enforced
/// at spawn time only.
pub fn is_cardinal_step(from: Position, to: Position) -> bool {
    // i64 so the subtraction can't overflow at the edges of i32.
    let dx = (i64::from(to.x) - i64::from(from.x)).abs();
    let dy = (i64::from(to.y) - i64::from(from.y)).abs();
    dx + dy == 1
}
