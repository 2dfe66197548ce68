/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A bounded stack used for both the shared value stack and the call-frame
//! stack, so exceeding either configured bound surfaces as the same
//! deterministic [ExeFailure::StackOverflow].

use crate::error::{ExeFailure, ExeResult};

#[derive(Debug)]
pub(crate) struct Stack<T> {
    items: Vec<T>,
    max_size: usize,
}

impl<T> Stack<T> {
    pub fn new(max_size: usize) -> Self {
        Self {
            items: Vec::new(),
            max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) -> ExeResult<()> {
        if self.items.len() >= self.max_size {
            return Err(ExeFailure::StackOverflow);
        }
        self.items.push(item);
        Ok(())
    }

    /// Pop with a floor: popping below `floor` is a frame-discipline
    /// violation, not an empty stack, and fails with `StackUnderflow`.
    pub fn pop_with_floor(&mut self, floor: usize) -> ExeResult<T> {
        if self.items.len() <= floor {
            return Err(ExeFailure::StackUnderflow);
        }
        self.items.pop().ok_or(ExeFailure::StackUnderflow)
    }

    pub fn pop(&mut self) -> ExeResult<T> {
        self.pop_with_floor(0)
    }

    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn set(&mut self, index: usize, item: T) -> ExeResult<()> {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(ExeFailure::StackUnderflow),
        }
    }

    /// Drop every slot at or above `len`, unwinding a frame's region.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Duplicate the top item.
    pub fn dup(&mut self) -> ExeResult<()>
    where
        T: Clone,
    {
        let top = self.top().cloned().ok_or(ExeFailure::StackUnderflow)?;
        self.push(top)
    }

    /// Swap the two top items.
    pub fn swap(&mut self, floor: usize) -> ExeResult<()> {
        let len = self.items.len();
        if len < 2 || len - 2 < floor {
            return Err(ExeFailure::StackUnderflow);
        }
        self.items.swap(len - 1, len - 2);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_beyond_max_overflows() {
        let mut stack: Stack<u8> = Stack::new(2);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(stack.push(3), Err(ExeFailure::StackOverflow));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn pop_respects_floor() {
        let mut stack: Stack<u8> = Stack::new(8);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(stack.pop_with_floor(1).unwrap(), 2);
        assert_eq!(stack.pop_with_floor(1), Err(ExeFailure::StackUnderflow));
        assert_eq!(stack.pop().unwrap(), 1);
        assert_eq!(stack.pop(), Err(ExeFailure::StackUnderflow));
    }

    #[test]
    fn swap_respects_floor() {
        let mut stack: Stack<u8> = Stack::new(8);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(stack.swap(1), Err(ExeFailure::StackUnderflow));
        stack.swap(0).unwrap();
        assert_eq!(stack.pop().unwrap(), 1);
    }
}
