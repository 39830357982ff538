//! Transaction Frames and the Transaction Stack
//!
//! Every `BEGIN` pushes a [`Frame`] holding the writes staged while it is the
//! innermost transaction. Nothing staged in a frame touches the committed map
//! until the outermost frame commits.
//!
//! ```text
//!   committed map  <-  frame 0  <-  frame 1  <-  frame 2 (innermost)
//!                      (outer)                   set/unset land here
//! ```
//!
//! Reads resolve a key by walking the stack from the innermost frame outwards
//! and falling back to the committed map. A commit folds the innermost frame
//! into its parent (savepoint semantics); only when no parent remains does the
//! frame reach the committed map.

use crate::storage::error::StoreError;
use std::collections::HashMap;

/// A write staged inside a transaction frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staged {
    /// The key is set to this value.
    Value(String),
    /// The key is deleted within the frame.
    Tombstone,
}

impl Staged {
    /// Returns the staged value, or `None` for a tombstone.
    #[inline]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Staged::Value(v) => Some(v),
            Staged::Tombstone => None,
        }
    }
}

/// One layer of pending writes plus the pre-image needed to undo them.
#[derive(Debug, Default, Clone)]
pub struct Frame {
    /// Staged writes keyed by key
    updates: HashMap<String, Staged>,
    /// Value each key held before this frame first touched it (`None` = absent)
    old_values: HashMap<String, Option<String>>,
}

impl Frame {
    /// Creates an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a write for `key`.
    ///
    /// `before` is the value the key holds in the committed map right now. It
    /// is remembered only on the first touch of `key` in this frame; later
    /// touches leave the recorded pre-image alone.
    pub fn stage(&mut self, key: &str, write: Staged, before: Option<&str>) {
        if !self.old_values.contains_key(key) {
            self.old_values
                .insert(key.to_string(), before.map(str::to_string));
        }
        self.updates.insert(key.to_string(), write);
    }

    /// Returns the write staged for `key` in this frame, if any.
    #[inline]
    pub fn staged(&self, key: &str) -> Option<&Staged> {
        self.updates.get(key)
    }

    /// Returns the pre-image recorded for `key`.
    ///
    /// The outer `Option` is `None` when this frame never touched `key`; the
    /// inner one is `None` when the key did not exist at first touch.
    pub fn old_value(&self, key: &str) -> Option<Option<&str>> {
        self.old_values.get(key).map(|v| v.as_deref())
    }

    /// Iterates over the staged writes in this frame.
    pub fn updates(&self) -> impl Iterator<Item = (&str, &Staged)> {
        self.updates.iter().map(|(k, w)| (k.as_str(), w))
    }

    /// Number of keys touched by this frame.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Returns `true` if nothing has been staged in this frame.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Consumes the frame, yielding each staged write with its pre-image.
    pub fn into_writes(self) -> impl Iterator<Item = (String, Staged, Option<String>)> {
        let Frame {
            updates,
            mut old_values,
        } = self;
        updates.into_iter().map(move |(key, write)| {
            let before = old_values.remove(&key).flatten();
            (key, write, before)
        })
    }

    /// Folds a committed child frame into this one.
    ///
    /// The child's writes overwrite ours. Pre-images we already hold win,
    /// since they describe the state before the outer transaction began.
    fn absorb(&mut self, child: Frame) {
        let Frame {
            updates,
            mut old_values,
        } = child;

        for (key, write) in updates {
            if !self.old_values.contains_key(&key) {
                let before = old_values.remove(&key).flatten();
                self.old_values.insert(key.clone(), before);
            }
            self.updates.insert(key, write);
        }
    }
}

/// Result of committing the innermost frame.
#[derive(Debug)]
pub enum CommitOutcome {
    /// The frame was folded into its parent, which is now innermost.
    Merged,
    /// The frame was the outermost one; its writes must reach the committed map.
    Detached(Frame),
}

/// Ordered stack of open transaction frames, innermost last.
#[derive(Debug)]
pub struct TransactionStack {
    frames: Vec<Frame>,
    max_depth: usize,
}

impl TransactionStack {
    /// Creates an empty stack that admits at most `max_depth` frames.
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Number of open frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if no transaction is open.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Maximum number of frames this stack admits.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Opens a new innermost frame.
    ///
    /// Fails without touching the stack when it is already at `max_depth`.
    pub fn push(&mut self) -> Result<(), StoreError> {
        if self.frames.len() >= self.max_depth {
            return Err(StoreError::TransactionDepthExceeded {
                limit: self.max_depth,
            });
        }
        self.frames.push(Frame::new());
        Ok(())
    }

    /// Returns the innermost frame for staging writes.
    #[inline]
    pub fn innermost_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    /// Pops and discards the innermost frame.
    pub fn rollback(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Pops the innermost frame and folds it into its parent if one remains.
    ///
    /// Returns `None` when the stack is empty.
    pub fn commit(&mut self) -> Option<CommitOutcome> {
        let frame = self.frames.pop()?;
        match self.frames.last_mut() {
            Some(parent) => {
                parent.absorb(frame);
                Some(CommitOutcome::Merged)
            }
            None => Some(CommitOutcome::Detached(frame)),
        }
    }

    /// Finds the innermost staged write for `key`.
    ///
    /// `None` means no open frame mentions the key and the committed map decides.
    pub fn lookup(&self, key: &str) -> Option<&Staged> {
        self.frames.iter().rev().find_map(|frame| frame.staged(key))
    }

    /// Flattens every open frame into a single overlay of effective writes.
    ///
    /// Frames are applied outermost first, so inner frames shadow outer ones.
    pub fn overlay(&self) -> HashMap<&str, &Staged> {
        let mut overlay = HashMap::new();
        for frame in &self.frames {
            for (key, write) in frame.updates() {
                overlay.insert(key, write);
            }
        }
        overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(v: &str) -> Staged {
        Staged::Value(v.to_string())
    }

    #[test]
    fn test_first_touch_records_old_value_once() {
        let mut frame = Frame::new();

        frame.stage("a", value("2"), Some("1"));
        frame.stage("a", value("3"), Some("2"));

        assert_eq!(frame.old_value("a"), Some(Some("1")));
        assert_eq!(frame.staged("a"), Some(&value("3")));
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_old_value_absent_key() {
        let mut frame = Frame::new();
        frame.stage("new", Staged::Tombstone, None);

        assert_eq!(frame.old_value("new"), Some(None));
        assert_eq!(frame.old_value("other"), None);
    }

    #[test]
    fn test_push_respects_max_depth() {
        let mut stack = TransactionStack::new(2);

        assert!(stack.push().is_ok());
        assert!(stack.push().is_ok());
        assert!(matches!(
            stack.push(),
            Err(StoreError::TransactionDepthExceeded { limit: 2 })
        ));
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_zero_depth_rejects_begin() {
        let mut stack = TransactionStack::new(0);
        assert!(stack.push().is_err());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_lookup_prefers_innermost() {
        let mut stack = TransactionStack::new(10);
        stack.push().unwrap();
        stack.innermost_mut().unwrap().stage("a", value("outer"), None);
        stack.push().unwrap();
        stack.innermost_mut().unwrap().stage("a", Staged::Tombstone, None);

        assert_eq!(stack.lookup("a"), Some(&Staged::Tombstone));
        assert_eq!(stack.lookup("b"), None);

        stack.rollback();
        assert_eq!(stack.lookup("a"), Some(&value("outer")));
    }

    #[test]
    fn test_commit_merges_into_parent() {
        let mut stack = TransactionStack::new(10);
        stack.push().unwrap();
        stack.innermost_mut().unwrap().stage("a", value("2"), Some("1"));
        stack.push().unwrap();
        let inner = stack.innermost_mut().unwrap();
        inner.stage("a", value("3"), Some("1"));
        inner.stage("b", value("x"), None);

        assert!(matches!(stack.commit(), Some(CommitOutcome::Merged)));
        assert_eq!(stack.depth(), 1);

        let parent = stack.innermost_mut().unwrap();
        assert_eq!(parent.staged("a"), Some(&value("3")));
        assert_eq!(parent.staged("b"), Some(&value("x")));
        assert_eq!(parent.old_value("a"), Some(Some("1")));
        assert_eq!(parent.old_value("b"), Some(None));
    }

    #[test]
    fn test_commit_outermost_detaches_frame() {
        let mut stack = TransactionStack::new(10);
        stack.push().unwrap();
        stack.innermost_mut().unwrap().stage("k", value("v"), None);

        match stack.commit() {
            Some(CommitOutcome::Detached(frame)) => {
                assert_eq!(frame.staged("k"), Some(&value("v")));
            }
            other => panic!("expected detached frame, got {:?}", other),
        }
        assert!(stack.is_empty());
        assert!(stack.commit().is_none());
        assert!(stack.rollback().is_none());
    }

    #[test]
    fn test_overlay_inner_shadows_outer() {
        let mut stack = TransactionStack::new(10);
        stack.push().unwrap();
        let outer = stack.innermost_mut().unwrap();
        outer.stage("a", value("1"), None);
        outer.stage("b", value("1"), None);
        stack.push().unwrap();
        stack.innermost_mut().unwrap().stage("a", Staged::Tombstone, None);

        let overlay = stack.overlay();
        assert_eq!(overlay.len(), 2);
        assert_eq!(overlay.get("a"), Some(&&Staged::Tombstone));
        assert_eq!(overlay.get("b"), Some(&&value("1")));
    }
}
