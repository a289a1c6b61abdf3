//! Scoped stack of active conditions.

use super::types::{Condition, Predicate};
use crate::error::StopEvolution;
use crate::population::Population;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type SharedCondition<'a, C> = Rc<RefCell<Box<dyn Condition<C> + 'a>>>;

struct Entry<'a, C> {
    id: u64,
    name: String,
    condition: SharedCondition<'a, C>,
}

/// The set of conditions an evolution loop consults.
///
/// Conditions are activated with [`enter`](Self::enter), which returns a
/// [`ConditionGuard`]; dropping the guard deactivates the condition again,
/// also when the scope is left by `?` or a panic. Guards nest, so the stack
/// is restored to its previous depth at the end of every scope.
///
/// The stack is single-threaded. Independent evolutions that run
/// concurrently each need their own stack.
///
/// ```
/// use u_evol::{ConditionStack, TimeLimit};
///
/// let stack = ConditionStack::<Vec<u8>>::new();
/// {
///     let _outer = stack.enter_fn(|pop| pop.generation() < 10);
///     let _inner = stack.enter(TimeLimit::new(60.0));
///     assert_eq!(stack.len(), 2);
/// }
/// assert!(stack.is_empty());
/// ```
pub struct ConditionStack<'a, C> {
    entries: RefCell<Vec<Entry<'a, C>>>,
    next_id: Cell<u64>,
}

impl<'a, C> Default for ConditionStack<'a, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, C> ConditionStack<'a, C> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Number of active conditions.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Names of the active conditions, outermost first.
    pub fn names(&self) -> Vec<String> {
        self.entries.borrow().iter().map(|e| e.name.clone()).collect()
    }

    /// Activates `condition` until the returned guard is dropped.
    ///
    /// The condition's [`on_enter`](Condition::on_enter) runs first, so
    /// stateful conditions start fresh.
    #[must_use = "the condition is deactivated as soon as the guard is dropped"]
    pub fn enter<K>(&self, mut condition: K) -> ConditionGuard<'_, 'a, C>
    where
        K: Condition<C> + 'a,
    {
        condition.on_enter();
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let name = condition.name().to_string();
        log::trace!("condition `{name}` entered");
        let condition: Box<dyn Condition<C> + 'a> = Box::new(condition);
        self.entries.borrow_mut().push(Entry {
            id,
            name,
            condition: Rc::new(RefCell::new(condition)),
        });
        ConditionGuard { stack: self, id }
    }

    /// Activates a closure predicate until the returned guard is dropped.
    #[must_use = "the condition is deactivated as soon as the guard is dropped"]
    pub fn enter_fn<F>(&self, predicate: F) -> ConditionGuard<'_, 'a, C>
    where
        F: FnMut(&Population<C>) -> bool + 'a,
        C: 'a,
    {
        self.enter(Predicate::new(predicate))
    }

    /// Runs `body` with `condition` active.
    pub fn scope<K, R>(&self, condition: K, body: impl FnOnce(&Self) -> R) -> R
    where
        K: Condition<C> + 'a,
    {
        let _guard = self.enter(condition);
        body(self)
    }

    /// Checks every active condition against `population`.
    ///
    /// All conditions are consulted, even after one has failed, so that
    /// stateful conditions record every generation. The first failing
    /// condition (outermost first) is reported.
    ///
    /// The conditions active when the check starts are the ones consulted.
    /// A condition may inspect the stack, enter conditions or drop guards
    /// while it runs.
    ///
    /// # Panics
    /// Panics if a condition calls `check` on its own stack.
    pub fn check(&self, population: &Population<C>) -> Result<(), StopEvolution> {
        let active: Vec<(String, SharedCondition<'a, C>)> = self
            .entries
            .borrow()
            .iter()
            .map(|e| (e.name.clone(), Rc::clone(&e.condition)))
            .collect();
        let mut failed: Option<String> = None;

        for (name, condition) in active {
            let ok = condition.borrow_mut().check(population);
            if !ok && failed.is_none() {
                failed = Some(name);
            }
        }

        match failed {
            Some(condition) => Err(StopEvolution {
                condition,
                generation: population.generation(),
            }),
            None => Ok(()),
        }
    }

    fn remove(&self, id: u64) {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let Some(pos) = entries.iter().position(|e| e.id == id) else {
                return;
            };
            if pos + 1 != entries.len() {
                log::warn!(
                    "condition `{}` left out of order ({} above it)",
                    entries[pos].name,
                    entries.len() - pos - 1
                );
            }
            entries.remove(pos)
        };
        log::trace!("condition `{}` exited", removed.name);
    }
}

impl<C> std::fmt::Debug for ConditionStack<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionStack")
            .field("active", &self.names())
            .finish()
    }
}

/// Keeps a condition active; deactivates it on drop.
pub struct ConditionGuard<'s, 'a, C> {
    stack: &'s ConditionStack<'a, C>,
    id: u64,
}

impl<C> Drop for ConditionGuard<'_, '_, C> {
    fn drop(&mut self) {
        self.stack.remove(self.id);
    }
}

impl<C> std::fmt::Debug for ConditionGuard<'_, '_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionGuard").field("id", &self.id).finish()
    }
}
