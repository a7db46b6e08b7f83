//! Scope stack for function frames and nested blocks
//!
//! Each active invocation owns a frame: a stack of block tables. Entering an
//! `if`/`while` body pushes a block onto the current frame, leaving it pops.
//! Lookups only see the current frame; there are no globals.
//!
//! Bindings live in shared cells so a reference parameter can alias the
//! caller's storage instead of holding a copy.

use super::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Storage cell behind a binding
pub type Cell = Rc<RefCell<Value>>;

type Block = HashMap<String, Cell>;

/// How a name enters a new frame
#[derive(Debug, Clone)]
pub enum Binding {
    /// Fresh cell holding this value
    Value(Value),
    /// Share an existing cell
    Alias(Cell),
}

/// Frame-and-block scope management for the interpreter
#[derive(Debug)]
pub struct ScopeStack {
    /// Stack of frames, each a stack of blocks; index 0 of a frame is its root block
    frames: Vec<Vec<Block>>,
}

impl ScopeStack {
    /// Create a scope stack holding the entry frame
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![vec![Block::new()]],
        }
    }

    fn frame(&self) -> &[Block] {
        self.frames.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Push a fresh frame for an invocation
    pub fn push_frame(&mut self) {
        self.frames.push(vec![Block::new()]);
    }

    /// Drop the current frame; the entry frame is never popped
    pub fn pop_frame(&mut self) -> bool {
        if self.frames.len() <= 1 {
            return false;
        }
        self.frames.pop();
        true
    }

    /// Open a nested block in the current frame
    pub fn nest_block(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(Block::new());
        }
    }

    /// Close the innermost block; a frame's root block is never closed
    pub fn unnest_block(&mut self) -> bool {
        match self.frames.last_mut() {
            Some(frame) if frame.len() > 1 => {
                frame.pop();
                true
            }
            _ => false,
        }
    }

    /// Number of active frames
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of blocks in the current frame
    pub fn block_depth(&self) -> usize {
        self.frame().len()
    }

    /// Define a name in the innermost block.
    /// Returns false if the name already exists in that block.
    pub fn create_symbol(&mut self, name: &str, value: Value) -> bool {
        let Some(block) = self.frames.last_mut().and_then(|f| f.last_mut()) else {
            return false;
        };
        if block.contains_key(name) {
            return false;
        }
        block.insert(name.to_owned(), Rc::new(RefCell::new(value)));
        true
    }

    /// Create or overwrite a name in the current frame's root block
    pub fn create_in_frame_root(&mut self, name: &str, value: Value) {
        if let Some(root) = self.frames.last_mut().and_then(|f| f.first_mut()) {
            match root.get(name) {
                Some(cell) => *cell.borrow_mut() = value,
                None => {
                    root.insert(name.to_owned(), Rc::new(RefCell::new(value)));
                }
            }
        }
    }

    /// Storage cell for a name, searching from the innermost block outwards
    pub fn cell(&self, name: &str) -> Option<Cell> {
        self.frame()
            .iter()
            .rev()
            .find_map(|block| block.get(name))
            .map(Rc::clone)
    }

    /// Look up a variable's current value
    pub fn get(&self, name: &str) -> Option<Value> {
        self.cell(name).map(|cell| cell.borrow().clone())
    }

    /// Update a variable in place, so aliases observe the write.
    /// Returns true if the variable was found.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.cell(name) {
            Some(cell) => {
                *cell.borrow_mut() = value;
                true
            }
            None => false,
        }
    }

    /// Check if a variable is visible from the current block
    pub fn contains(&self, name: &str) -> bool {
        self.frame().iter().any(|block| block.contains_key(name))
    }

    /// Bind names into the innermost block, replacing any of the same name
    pub fn import_bindings(&mut self, bindings: impl IntoIterator<Item = (String, Binding)>) {
        let Some(block) = self.frames.last_mut().and_then(|f| f.last_mut()) else {
            return;
        };
        for (name, binding) in bindings {
            let cell = match binding {
                Binding::Value(value) => Rc::new(RefCell::new(value)),
                Binding::Alias(cell) => cell,
            };
            block.insert(name, cell);
        }
    }

    /// Independent copy of every visible binding; inner blocks shadow outer ones
    pub fn snapshot_visible(&self) -> HashMap<String, Value> {
        let mut snapshot = HashMap::new();
        for block in self.frame() {
            for (name, cell) in block {
                snapshot.insert(name.clone(), cell.borrow().deep_copy());
            }
        }
        snapshot
    }

    /// Names visible from the current block, for suggestions
    pub fn visible_names(&self) -> Vec<&str> {
        self.frame()
            .iter()
            .flat_map(|block| block.keys().map(String::as_str))
            .collect()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_create_get() {
        let mut stack = ScopeStack::new();
        assert!(stack.create_symbol("x", Value::Int(42)));
        assert_eq!(stack.get("x"), Some(Value::Int(42)));
        assert_eq!(stack.get("y"), None);
    }

    #[test]
    fn test_redeclaration_in_same_block_fails() {
        let mut stack = ScopeStack::new();
        assert!(stack.create_symbol("x", Value::Int(1)));
        assert!(!stack.create_symbol("x", Value::Int(2)));
        assert_eq!(stack.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_nested_block_may_shadow() {
        let mut stack = ScopeStack::new();
        stack.create_symbol("x", Value::Int(1));

        stack.nest_block();
        assert!(stack.create_symbol("x", Value::Int(2)));
        assert_eq!(stack.get("x"), Some(Value::Int(2)));

        assert!(stack.unnest_block());
        assert_eq!(stack.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_set_in_outer_block_persists() {
        let mut stack = ScopeStack::new();
        stack.create_symbol("x", Value::Int(0));

        for _ in 0..10 {
            stack.nest_block();
        }
        assert!(stack.set("x", Value::Int(42)));
        for _ in 0..10 {
            stack.unnest_block();
        }

        assert_eq!(stack.get("x"), Some(Value::Int(42)));
    }

    #[test]
    fn test_set_returns_false_for_missing() {
        let mut stack = ScopeStack::new();
        assert!(!stack.set("x", Value::Int(42)));
    }

    #[test]
    fn test_frames_are_isolated() {
        let mut stack = ScopeStack::new();
        stack.create_symbol("x", Value::Int(1));

        stack.push_frame();
        assert_eq!(stack.get("x"), None);
        assert!(!stack.contains("x"));
        stack.create_symbol("y", Value::Int(2));

        assert!(stack.pop_frame());
        assert_eq!(stack.get("x"), Some(Value::Int(1)));
        assert_eq!(stack.get("y"), None);
    }

    #[test]
    fn test_entry_frame_and_root_block_stay() {
        let mut stack = ScopeStack::new();
        assert!(!stack.pop_frame());
        assert!(!stack.unnest_block());
        assert_eq!(stack.frame_depth(), 1);
        assert_eq!(stack.block_depth(), 1);
    }

    #[test]
    fn test_alias_binding_shares_storage() {
        let mut stack = ScopeStack::new();
        stack.create_symbol("x", Value::Int(1));
        let cell = stack.cell("x").unwrap();

        stack.push_frame();
        stack.import_bindings([("r".to_string(), Binding::Alias(cell))]);
        stack.set("r", Value::Int(7));
        stack.pop_frame();

        assert_eq!(stack.get("x"), Some(Value::Int(7)));
    }

    #[test]
    fn test_value_binding_is_a_copy() {
        let mut stack = ScopeStack::new();
        stack.create_symbol("x", Value::Int(1));
        let value = stack.get("x").unwrap();

        stack.push_frame();
        stack.import_bindings([("v".to_string(), Binding::Value(value))]);
        stack.set("v", Value::Int(7));
        stack.pop_frame();

        assert_eq!(stack.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_later_import_shadows_earlier() {
        let mut stack = ScopeStack::new();
        stack.push_frame();
        stack.import_bindings([("x".to_string(), Binding::Value(Value::Int(1)))]);
        stack.import_bindings([("x".to_string(), Binding::Value(Value::Int(2)))]);
        assert_eq!(stack.get("x"), Some(Value::Int(2)));
    }

    #[test]
    fn test_frame_root_survives_block_exit() {
        let mut stack = ScopeStack::new();
        stack.nest_block();
        stack.nest_block();
        stack.create_in_frame_root("resulti", Value::Int(5));
        stack.unnest_block();
        stack.unnest_block();
        assert_eq!(stack.get("resulti"), Some(Value::Int(5)));

        stack.create_in_frame_root("resulti", Value::Int(6));
        assert_eq!(stack.get("resulti"), Some(Value::Int(6)));
    }

    #[test]
    fn test_snapshot_is_independent_and_shadowed() {
        let mut stack = ScopeStack::new();
        stack.create_symbol("x", Value::Int(1));
        stack.create_symbol("o", Value::new_object());
        stack.nest_block();
        stack.create_symbol("x", Value::Int(2));

        let snapshot = stack.snapshot_visible();
        stack.set("x", Value::Int(3));
        if let Some(Value::Object(o)) = stack.get("o") {
            o.borrow_mut().set("f".into(), Value::Int(1));
        }

        assert_eq!(snapshot.get("x"), Some(&Value::Int(2)));
        let captured = snapshot.get("o").and_then(Value::as_object).unwrap();
        assert!(captured.borrow().is_empty());
    }

    #[test]
    fn test_visible_names() {
        let mut stack = ScopeStack::new();
        stack.create_symbol("a", Value::Int(1));
        stack.nest_block();
        stack.create_symbol("b", Value::Int(2));
        let mut names = stack.visible_names();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }
}
