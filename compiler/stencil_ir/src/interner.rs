//! Two-tier name interning for variable lookup.
//!
//! A render keeps two tables: names declared while evaluating (`Local`) and
//! names seeded from the host context (`Global`). Ids carry their tier, so a
//! local id and a global id with the same index never compare equal.
//!
//! Ids are stable for the lifetime of a table and never reused.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// Which id space a [`SymbolId`] belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Tier {
    Local,
    Global,
}

/// An interned name.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct SymbolId {
    tier: Tier,
    index: u32,
}

impl SymbolId {
    #[inline]
    pub const fn tier(self) -> Tier {
        self.tier
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tier {
            Tier::Local => write!(f, "L{}", self.index),
            Tier::Global => write!(f, "G{}", self.index),
        }
    }
}

/// Bidirectional name <-> id mapping for one tier.
pub struct InternTable {
    tier: Tier,
    map: FxHashMap<Rc<str>, u32>,
    names: Vec<Rc<str>>,
}

impl InternTable {
    pub fn new(tier: Tier) -> Self {
        InternTable {
            tier,
            map: FxHashMap::default(),
            names: Vec::new(),
        }
    }

    #[inline]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Intern `name`, returning the existing id if it was seen before.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&index) = self.map.get(name) {
            return SymbolId {
                tier: self.tier,
                index,
            };
        }
        let index = u32::try_from(self.names.len()).unwrap_or(u32::MAX);
        let shared: Rc<str> = Rc::from(name);
        self.names.push(Rc::clone(&shared));
        self.map.insert(shared, index);
        SymbolId {
            tier: self.tier,
            index,
        }
    }

    /// Look up `name` without interning it.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.map.get(name).map(|&index| SymbolId {
            tier: self.tier,
            index,
        })
    }

    /// The name behind `id`, if `id` belongs to this table.
    pub fn name(&self, id: SymbolId) -> Option<&str> {
        if id.tier != self.tier {
            return None;
        }
        self.names.get(id.index as usize).map(|s| &**s)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Debug for InternTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternTable")
            .field("tier", &self.tier)
            .field("len", &self.names.len())
            .finish()
    }
}
