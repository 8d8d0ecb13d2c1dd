//! Undo/redo history, one independent timeline per scope key.
//!
//! Every completed edit is registered as a reversible [`Task`]. Registering
//! clears the redo future of that scope; undo and redo move tasks between
//! the two stacks and replay them against the map.
//!
//! Gestures that produce several tasks can be wrapped in
//! `begin_group` / `end_group`: everything registered in between is pushed
//! as a single `Task::Batch` when the outermost group closes.

use crate::tasks::Task;
use gd_core::Map;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Default)]
struct HistoryStack {
    /// Oldest first, so eviction pops from the front.
    undo: VecDeque<Task>,
    redo: Vec<Task>,
    /// Group nesting depth (0 = not grouping).
    group_depth: usize,
    group: Vec<Task>,
}

impl HistoryStack {
    fn push_undo(&mut self, task: Task, max_depth: usize) {
        self.undo.push_back(task);
        while self.undo.len() > max_depth {
            if let Some(evicted) = self.undo.pop_front() {
                log::debug!("history: evicted '{}'", evicted.label());
            }
        }
    }
}

/// Per-scope undo/redo stacks of reversible tasks.
#[derive(Debug)]
pub struct HistoryService {
    stacks: HashMap<String, HistoryStack>,
    /// Maximum undo depth per scope.
    max_depth: usize,
}

impl Default for HistoryService {
    fn default() -> Self {
        Self::new(100)
    }
}

impl HistoryService {
    pub fn new(max_depth: usize) -> Self {
        Self {
            stacks: HashMap::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record an edit that has already been applied to the map.
    /// Clears the scope's redo stack.
    pub fn register(&mut self, key: &str, task: Task) {
        let max_depth = self.max_depth;
        let stack = self.stacks.entry(key.to_string()).or_default();
        if stack.group_depth > 0 {
            stack.group.push(task);
            return;
        }
        log::debug!("history[{key}]: register '{}'", task.label());
        stack.push_undo(task, max_depth);
        stack.redo.clear();
    }

    /// Undo the newest task of `key`. Returns its label, or `None` if there
    /// was nothing to undo.
    pub fn undo(&mut self, key: &str, map: &mut Map) -> Option<String> {
        let stack = self.stacks.get_mut(key)?;
        if stack.group_depth > 0 {
            log::warn!("history[{key}]: undo ignored while a group is open");
            return None;
        }
        let task = stack.undo.pop_back()?;
        task.undo(map);
        let label = task.label();
        log::debug!("history[{key}]: undo '{label}'");
        stack.redo.push(task);
        Some(label)
    }

    /// Redo the most recently undone task of `key`.
    pub fn redo(&mut self, key: &str, map: &mut Map) -> Option<String> {
        let max_depth = self.max_depth;
        let stack = self.stacks.get_mut(key)?;
        if stack.group_depth > 0 {
            log::warn!("history[{key}]: redo ignored while a group is open");
            return None;
        }
        let task = stack.redo.pop()?;
        task.redo(map);
        let label = task.label();
        log::debug!("history[{key}]: redo '{label}'");
        stack.push_undo(task, max_depth);
        Some(label)
    }

    /// Forget both stacks of `key`, including any open group.
    pub fn clean(&mut self, key: &str) {
        if self.stacks.remove(key).is_some() {
            log::debug!("history[{key}]: cleaned");
        }
    }

    pub fn can_undo(&self, key: &str) -> bool {
        self.stacks.get(key).is_some_and(|s| !s.undo.is_empty())
    }

    pub fn can_redo(&self, key: &str) -> bool {
        self.stacks.get(key).is_some_and(|s| !s.redo.is_empty())
    }

    /// The task the next `undo` of `key` would revert.
    pub fn peek_undo(&self, key: &str) -> Option<&Task> {
        self.stacks.get(key)?.undo.back()
    }

    pub fn undo_len(&self, key: &str) -> usize {
        self.stacks.get(key).map_or(0, |s| s.undo.len())
    }

    /// Start a group. Groups nest; only the outermost `end_group` pushes.
    pub fn begin_group(&mut self, key: &str) {
        let stack = self.stacks.entry(key.to_string()).or_default();
        stack.group_depth += 1;
    }

    /// Close a group. When the outermost group closes, the collected tasks
    /// are registered as one batch (or nothing, if none were collected).
    pub fn end_group(&mut self, key: &str) {
        let Some(stack) = self.stacks.get_mut(key) else {
            return;
        };
        if stack.group_depth == 0 {
            return;
        }
        stack.group_depth -= 1;
        if stack.group_depth > 0 {
            return;
        }
        let mut tasks = std::mem::take(&mut stack.group);
        let task = match tasks.len() {
            0 => return,
            1 => tasks.remove(0),
            _ => Task::Batch(tasks),
        };
        self.register(key, task);
    }
}
