use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Move `cursor` one step through a list of `len` items, wrapping at both ends.
pub(super) fn step(cursor: usize, len: usize, direction: Direction) -> usize {
    if len == 0 {
        return 0;
    }
    match direction {
        Direction::Next if cursor + 1 >= len => 0,
        Direction::Next => cursor + 1,
        Direction::Previous if cursor == 0 || cursor >= len => len - 1,
        Direction::Previous => cursor - 1,
    }
}

/// Return a uniformly random permutation of `items`.
pub(super) fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}
