//! Newest-first lists with a fixed capacity.
//!
//! Every list a view keeps (readings, blocks, detections, history rows,
//! notifications) is a [`BoundedList`]: inserts go to the head and the oldest
//! element falls off the tail once the capacity is reached.

use std::collections::VecDeque;

/// A newest-first list that never holds more than `capacity` elements.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedList<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedList<T> {
    /// Create an empty list.
    ///
    /// A capacity of zero is raised to one so a push is always observable.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a list from newest-first items, keeping only the first `capacity`.
    pub fn from_newest_first<I>(capacity: usize, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut list = Self::new(capacity);
        list.items.extend(items.into_iter().take(list.capacity));
        list
    }

    /// Insert at the head. Returns the element evicted from the tail, if any.
    ///
    /// ```
    /// use depin_core::BoundedList;
    ///
    /// let mut list = BoundedList::new(2);
    /// assert_eq!(list.push(1), None);
    /// assert_eq!(list.push(2), None);
    /// assert_eq!(list.push(3), Some(1));
    /// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![3, 2]);
    /// ```
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_front(item);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    /// Insert a newest-first batch so that its first element ends up at the head.
    pub fn extend_newest<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: DoubleEndedIterator,
    {
        for item in batch.into_iter().rev() {
            self.push(item);
        }
    }

    /// Discard the contents and take newest-first `items` up to capacity.
    pub fn replace<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.items.clear();
        self.items.extend(items.into_iter().take(self.capacity));
    }

    /// The newest element.
    pub fn head(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> + ExactSizeIterator {
        self.items.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Keep only the elements matching the predicate, preserving order.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.items.retain(f);
    }

    /// Copy out the contents, newest first.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a BoundedList<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
