use super::{DictValue, ListRef, Object};
use std::fmt::{self, Display, Formatter};

/// A lazy arithmetic progression; members are computed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeValue {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl RangeValue {
    pub fn new(start: i64, stop: i64, step: i64) -> Self {
        Self { start, stop, step }
    }

    pub fn len(&self) -> usize {
        let (start, stop, step) = (self.start as i128, self.stop as i128, self.step as i128);
        let len = if step > 0 && start < stop {
            (stop - start - 1) / step + 1
        } else if step < 0 && start > stop {
            (start - stop - 1) / -step + 1
        } else {
            0
        };
        len as usize
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        if index >= self.len() {
            return None;
        }
        Some((self.start as i128 + index as i128 * self.step as i128) as i64)
    }

    pub fn contains(&self, n: i64) -> bool {
        let in_bounds = if self.step > 0 {
            self.start <= n && n < self.stop
        } else {
            self.stop < n && n <= self.start
        };
        in_bounds && (n as i128 - self.start as i128) % self.step as i128 == 0
    }
}

impl Display for RangeValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.step == 1 {
            write!(f, "range({}, {})", self.start, self.stop)
        } else {
            write!(f, "range({}, {}, {})", self.start, self.stop, self.step)
        }
    }
}

/// Iteration state for a `for` loop or an iterable builtin argument.
#[derive(Debug)]
pub enum ObjectIter {
    /// Reads the live list, so appends made by the loop body are visited.
    List { list: ListRef, next: usize },
    Range { range: RangeValue, next: usize },
    Snapshot(std::vec::IntoIter<Object>),
}

impl ObjectIter {
    pub fn list(list: ListRef) -> Self {
        Self::List { list, next: 0 }
    }

    pub fn range(range: RangeValue) -> Self {
        Self::Range { range, next: 0 }
    }

    pub fn keys(dict: &DictValue) -> Self {
        let keys: Vec<Object> = dict.keys().cloned().map(Object::from).collect();
        Self::Snapshot(keys.into_iter())
    }

    pub fn chars(s: &str) -> Self {
        let chars: Vec<Object> = s.chars().map(|c| Object::String(c.to_string())).collect();
        Self::Snapshot(chars.into_iter())
    }
}

impl Iterator for ObjectIter {
    type Item = Object;

    fn next(&mut self) -> Option<Object> {
        match self {
            Self::List { list, next } => {
                let item = list.borrow().get(*next).cloned();
                *next += 1;
                item
            }
            Self::Range { range, next } => {
                let item = range.get(*next).map(Object::Integer);
                *next += 1;
                item
            }
            Self::Snapshot(items) => items.next(),
        }
    }
}
