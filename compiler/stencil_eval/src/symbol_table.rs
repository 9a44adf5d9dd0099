//! Scope chain for one render.
//!
//! Names are interned before they touch a scope. Host bindings live in the
//! global tier, seeded once per render; everything declared by the template
//! lives in the local tier. Scopes form a stack of frames: entering a block
//! pushes one, leaving pops it, and lookups walk from the innermost frame
//! outward before falling back to the globals.

use rustc_hash::FxHashMap;
use stencil_ir::{InternTable, SymbolId, Tier};

use crate::value::Value;

type Frame = FxHashMap<SymbolId, Value>;

pub struct SymbolTable {
    locals: InternTable,
    globals: InternTable,
    global_values: Vec<Value>,
    /// Frame 0 is the template's top-level scope and is never popped.
    frames: Vec<Frame>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            locals: InternTable::new(Tier::Local),
            globals: InternTable::new(Tier::Global),
            global_values: Vec::new(),
            frames: vec![Frame::default()],
        }
    }

    /// A table whose global tier holds `bindings`.
    pub fn seeded<I>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut table = SymbolTable::new();
        for (name, value) in bindings {
            table.set_global(&name, value);
        }
        table
    }

    pub fn push_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Number of open scopes, including the top-level one.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the innermost scope. Declaring `nil` does nothing.
    pub fn declare(&mut self, name: &str, value: Value) {
        if value.is_nil() {
            return;
        }
        let id = self.locals.intern(name);
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(id, value);
        }
    }

    /// Overwrite the innermost existing binding of `name`.
    ///
    /// Returns `false` when no scope holds `name`; assignment never
    /// declares.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(id) = self.locals.lookup(name) {
            if let Some(slot) = self
                .frames
                .iter_mut()
                .rev()
                .find_map(|frame| frame.get_mut(&id))
            {
                *slot = value;
                return true;
            }
        }
        if let Some(slot) = self.global_slot_mut(name) {
            if !slot.is_nil() {
                *slot = value;
                return true;
            }
        }
        false
    }

    /// Innermost binding of `name`, locals before globals.
    pub fn resolve(&self, name: &str) -> Option<&Value> {
        if let Some(id) = self.locals.lookup(name) {
            if let Some(value) = self.frames.iter().rev().find_map(|frame| frame.get(&id)) {
                return Some(value);
            }
        }
        let id = self.globals.lookup(name)?;
        self.global_values
            .get(id.index() as usize)
            .filter(|value| !value.is_nil())
    }

    /// Bind `name` in the global tier, replacing any earlier value.
    pub fn set_global(&mut self, name: &str, value: Value) {
        let index = self.globals.intern(name).index() as usize;
        if index >= self.global_values.len() {
            self.global_values.resize(index + 1, Value::Nil);
        }
        self.global_values[index] = value;
    }

    fn global_slot_mut(&mut self, name: &str) -> Option<&mut Value> {
        let id = self.globals.lookup(name)?;
        self.global_values.get_mut(id.index() as usize)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}
