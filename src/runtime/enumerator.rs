//! Pull-based value iteration.

use std::iter::Fuse;

/// A pull iterator with an explicit current element.
///
/// `current` is `None` before the first `move_next` and after the enumerator
/// is exhausted.
pub trait Enumerator {
    type Item;

    /// Advance to the next element; false once exhausted
    fn move_next(&mut self) -> bool;

    fn current(&self) -> Option<&Self::Item>;
}

/// Enumerator over any [`Iterator`]; stays exhausted once the iterator ends
pub struct IterEnumerator<I: Iterator> {
    iter: Fuse<I>,
    current: Option<I::Item>,
}

impl<I: Iterator> IterEnumerator<I> {
    pub fn new<T>(items: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            iter: items.into_iter().fuse(),
            current: None,
        }
    }
}

impl<I: Iterator> Enumerator for IterEnumerator<I> {
    type Item = I::Item;

    fn move_next(&mut self) -> bool {
        self.current = self.iter.next();
        self.current.is_some()
    }

    fn current(&self) -> Option<&I::Item> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_enumerator() {
        let mut e = IterEnumerator::new(vec![1, 2]);
        assert_eq!(e.current(), None);
        assert!(e.move_next());
        assert_eq!(e.current(), Some(&1));
        assert!(e.move_next());
        assert_eq!(e.current(), Some(&2));
        assert!(!e.move_next());
        assert_eq!(e.current(), None);
        assert!(!e.move_next());
    }
}
