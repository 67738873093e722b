/// Travel direction of an oscillator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Rising,
    Falling,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Rising => Direction::Falling,
            Direction::Falling => Direction::Rising,
        }
    }
}

/// Fibonacci terms `1, 1, 2, 3, 5, ...` not exceeding `cap`. Never empty.
pub fn fibonacci_terms(cap: u32) -> Vec<u32> {
    let mut terms = vec![1];
    let (mut current, mut next) = (1u32, 2u32);
    while current <= cap {
        terms.push(current);
        match current.checked_add(next) {
            Some(after) => {
                current = next;
                next = after;
            },
            None => {
                if next <= cap {
                    terms.push(next);
                }
                break;
            },
        }
    }
    terms
}

/// Walks the Fibonacci terms up to a cap and back down, forever.
///
/// The walk turns at the peak without repeating it. The sequence opens with two
/// 1s, so each trough reads `1, 1, 1` as the walk passes both of them down and
/// the second one again on the way back up: a cap of 21 produces
/// `1, 1, 2, 3, 5, 8, 13, 21, 13, 8, 5, 3, 2, 1, 1, 1, 2, ...`.
#[derive(Clone, Debug)]
pub struct FibonacciOscillator {
    terms: Vec<u32>,
    index: usize,
    direction: Direction,
}

impl FibonacciOscillator {
    pub fn new(cap: u32) -> Self {
        Self { terms: fibonacci_terms(cap), index: 0, direction: Direction::Rising }
    }

    pub fn current(&self) -> u32 {
        self.terms[self.index]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the current term and steps to the next one.
    pub fn advance(&mut self) -> u32 {
        let value = self.current();
        if self.terms.len() == 1 {
            return value;
        }

        let last = self.terms.len() - 1;
        match self.direction {
            Direction::Rising if self.index < last => self.index += 1,
            Direction::Falling if self.index > 0 => self.index -= 1,
            _ => {
                self.direction = self.direction.flipped();
                self.index = if self.index == 0 { 1 } else { last - 1 };
            },
        }

        value
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.direction = Direction::Rising;
    }
}
