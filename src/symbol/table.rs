use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Storage class of a declared variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Static,
    Field,
    Argument,
    Local,
}

impl StorageClass {
    /// Whether entries of this class live in the class scope.
    #[must_use]
    pub fn is_class_level(self) -> bool {
        matches!(self, StorageClass::Static | StorageClass::Field)
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            StorageClass::Static => "static",
            StorageClass::Field => "field",
            StorageClass::Argument => "argument",
            StorageClass::Local => "local",
        };
        write!(f, "{}", s)
    }
}

/// Symbol information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    pub declared_type: String,
    pub storage_class: StorageClass,
    pub index: usize,
}

/// One lifetime of declarations, in definition order.
#[derive(Debug, Default)]
struct Scope {
    entries: Vec<SymbolEntry>,
    /// Name -> position in `entries` of its first definition.
    by_name: HashMap<String, usize>,
}

impl Scope {
    fn count(&self, storage_class: StorageClass) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.storage_class == storage_class)
            .count()
    }

    fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    fn define(&mut self, name: String, declared_type: String, storage_class: StorageClass) -> &SymbolEntry {
        let index = self.count(storage_class);
        let position = self.entries.len();

        if self.by_name.contains_key(&name) {
            warn!("'{name}' is already declared in this scope; the first declaration stays visible");
        } else {
            self.by_name.insert(name.clone(), position);
        }

        self.entries.push(SymbolEntry {
            name,
            declared_type,
            storage_class,
            index,
        });
        &self.entries[position]
    }
}

/// Symbol table with a class scope and a subroutine scope
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// `static` and `field` entries for the class being compiled
    class_scope: Scope,
    /// `argument` and `local` entries for the current subroutine
    subroutine_scope: Scope,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every argument and local, keeping the class scope.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope = Scope::default();
    }

    /// Define a variable in the scope implied by its storage class and give it
    /// the next free slot for that class.
    ///
    /// Redefining a name in the same scope is not rejected: the duplicate is
    /// logged, still consumes a slot, and lookups keep returning the first one.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        declared_type: impl Into<String>,
        storage_class: StorageClass,
    ) -> &SymbolEntry {
        let scope = if storage_class.is_class_level() {
            &mut self.class_scope
        } else {
            &mut self.subroutine_scope
        };
        scope.define(name.into(), declared_type.into(), storage_class)
    }

    /// Look up a name, innermost scope first
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<StorageClass> {
        self.lookup(name).map(|entry| entry.storage_class)
    }

    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|entry| entry.declared_type.as_str())
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup(name).map(|entry| entry.index)
    }

    /// Number of entries of `storage_class` across both scopes
    #[must_use]
    pub fn var_count(&self, storage_class: StorageClass) -> usize {
        self.class_scope.count(storage_class) + self.subroutine_scope.count(storage_class)
    }
}
