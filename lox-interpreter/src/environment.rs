use crate::value::Value;
use fxhash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// One link of the lexical scope chain. Environments are shared: a block
/// points at its enclosing environment, and function values keep their
/// closure environment alive for as long as the function is reachable.
/// Enclosing pointers only go outward, so chains never form cycles.
#[derive(Default)]
pub struct Environment {
    enclosing: Option<Rc<Environment>>,
    values: RefCell<FxHashMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Rc<Environment> {
        Rc::new(Environment::default())
    }

    pub fn with_enclosing(enclosing: &Rc<Environment>) -> Rc<Environment> {
        Rc::new(Environment {
            enclosing: Some(enclosing.clone()),
            values: RefCell::default(),
        })
    }

    /// Definitions always land in this environment, shadowing any outer
    /// binding with the same name.
    pub fn define(&self, name: String, value: Value) {
        self.values.borrow_mut().insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.borrow().get(name) {
            return Some(value.clone());
        }
        self.enclosing.as_ref()?.get(name)
    }

    pub fn assign(&self, name: &str, value: Value) -> bool {
        {
            let mut values = self.values.borrow_mut();
            if let Some(slot) = values.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.assign(name, value),
            None => false,
        }
    }

    pub fn get_at(self: &Rc<Self>, depth: usize, name: &str) -> Option<Value> {
        self.ancestor(depth)?.values.borrow().get(name).cloned()
    }

    pub fn assign_at(self: &Rc<Self>, depth: usize, name: &str, value: Value) -> bool {
        match self.ancestor(depth) {
            Some(environment) => {
                environment
                    .values
                    .borrow_mut()
                    .insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    fn ancestor(self: &Rc<Self>, depth: usize) -> Option<Rc<Environment>> {
        let mut environment = self.clone();
        for _ in 0..depth {
            let enclosing = environment.enclosing.clone()?;
            environment = enclosing;
        }
        Some(environment)
    }
}
