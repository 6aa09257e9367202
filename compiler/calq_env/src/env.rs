// Variable environment for calq expressions.
// One shared value slot per name, handed out by a registry.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Slot {
    name: String,
    // f64 bit pattern
    bits: AtomicU64,
}

/// A named variable with a settable value.
///
/// Cloning a `Variable` clones the handle, not the slot: all clones observe
/// the same value. Equality and hashing go by identity, so two variables
/// created outside a registry with the same name are still distinct.
#[derive(Clone)]
pub struct Variable(Arc<Slot>);

impl Variable {
    /// Create a new variable, with initial value 0.
    ///
    /// Most callers want [`VariableRegistry::lookup_or_create`] instead, which
    /// guarantees one identity per name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Variable(Arc::new(Slot {
            name: name.into(),
            bits: AtomicU64::new(0f64.to_bits()),
        }))
    }

    /// The variable's name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The current value.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.0.bits.load(Ordering::Relaxed))
    }

    /// Set the value; visible through every handle to this variable.
    pub fn set_value(&self, value: f64) {
        self.0.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Returns true if both handles refer to the same slot.
    pub fn same_as(&self, other: &Variable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name())
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Variable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Variable", 2)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("value", &self.value())?;
        state.end()
    }
}

/// Interns one [`Variable`] per name.
///
/// Find-or-create is serialized by a mutex owned by the registry, so two
/// threads asking for the same new name get the same variable.
#[derive(Debug, Default)]
pub struct VariableRegistry {
    variables: Mutex<HashMap<String, Variable>>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Variable>> {
        // The map is never left half-updated, so a poisoned lock is still usable
        self.variables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the variable named `name`, creating it with value 0 if it
    /// doesn't exist yet.
    pub fn lookup_or_create(&self, name: &str) -> Variable {
        let mut table = self.table();
        if let Some(existing) = table.get(name) {
            return existing.clone();
        }
        log::debug!("Creating variable '{}'", name);
        let variable = Variable::new(name);
        table.insert(name.to_string(), variable.clone());
        variable
    }

    /// Look up an existing variable without creating it.
    pub fn get(&self, name: &str) -> Option<Variable> {
        self.table().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Names of all interned variables, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table().keys().cloned().collect();
        names.sort();
        names
    }
}

lazy_static! {
    static ref GLOBAL: VariableRegistry = VariableRegistry::new();
}

/// The process-wide registry used by parsers that aren't given their own.
pub fn global() -> &'static VariableRegistry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_lookup_returns_same_identity() {
        let registry = VariableRegistry::new();
        let a = registry.lookup_or_create("x");
        let b = registry.lookup_or_create("x");
        assert!(a.same_as(&b));
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_value_shared_between_handles() {
        let registry = VariableRegistry::new();
        let a = registry.lookup_or_create("rate");
        let b = registry.lookup_or_create("rate");
        assert_eq!(a.value(), 0.0);
        a.set_value(-40.5);
        assert_eq!(b.value(), -40.5);
        b.clone().set_value(f64::NAN);
        assert!(a.value().is_nan());
    }

    #[test]
    fn test_distinct_names_are_distinct() {
        let registry = VariableRegistry::new();
        let x = registry.lookup_or_create("x");
        let y = registry.lookup_or_create("y");
        assert_ne!(x, y);
        assert_eq!(registry.names(), vec!["x".to_string(), "y".to_string()]);
        assert!(registry.get("z").is_none());
        assert!(registry.contains("y"));
    }

    #[test]
    fn test_unregistered_variables_compare_by_identity() {
        let a = Variable::new("x");
        let b = Variable::new("x");
        assert_ne!(a, b);
        let set: HashSet<Variable> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_concurrent_creation_yields_one_identity() {
        let registry = Arc::new(VariableRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.lookup_or_create("shared"))
            })
            .collect();
        let variables: Vec<Variable> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(variables.windows(2).all(|w| w[0].same_as(&w[1])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_global_registry() {
        let a = global().lookup_or_create("__env_test_global");
        let b = global().lookup_or_create("__env_test_global");
        assert!(a.same_as(&b));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_variable() {
        let v = Variable::new("t");
        v.set_value(1.5);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"name":"t","value":1.5}"#);
    }
}
