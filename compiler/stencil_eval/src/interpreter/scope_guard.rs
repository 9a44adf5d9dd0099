//! RAII scope guard for the interpreter's symbol table.
//!
//! [`ScopedInterpreter`] pushes a scope when created and pops it when
//! dropped, so a block that exits through `?`, a control action or a panic
//! still leaves the scope stack balanced.
//!
//! The guard holds `&mut Interpreter` and derefs to it, so code inside the
//! scope keeps calling interpreter methods directly.

use std::ops::{Deref, DerefMut};

use super::Interpreter;

pub struct ScopedInterpreter<'guard> {
    interpreter: &'guard mut Interpreter,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.symbols.pop_scope();
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Enter a new scope, left again when the guard drops.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_> {
        self.symbols.push_scope();
        ScopedInterpreter { interpreter: self }
    }

    /// Run `f` inside a fresh scope.
    pub fn with_scope<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
    {
        let mut scoped = self.scoped();
        f(&mut scoped)
    }

    /// Run `f` inside a fresh scope holding `bindings`.
    pub fn with_bindings<T, F, I>(&mut self, bindings: I, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
        I: IntoIterator<Item = (String, crate::Value)>,
    {
        self.with_scope(|scoped| {
            for (name, value) in bindings {
                scoped.symbols.declare(&name, value);
            }
            f(scoped)
        })
    }
}
