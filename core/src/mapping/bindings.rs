use hashbrown::HashMap;

use crate::expr::Expr;
use crate::mapping::OutputLocation;

/// Output location to source expression, in first-insertion order.
/// Inserting a location again replaces its expression in place.
#[derive(Clone, Default)]
pub struct BindingTable {
    entries: Vec<(OutputLocation, Expr)>,
    index: HashMap<OutputLocation, usize>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the expression previously bound to `location`.
    pub fn insert(&mut self, location: OutputLocation, expr: Expr) -> Option<Expr> {
        match self.index.get(&location) {
            Some(&position) => Some(core::mem::replace(&mut self.entries[position].1, expr)),
            None => {
                self.index.insert(location.clone(), self.entries.len());
                self.entries.push((location, expr));
                None
            }
        }
    }

    pub fn get(&self, location: &OutputLocation) -> Option<&Expr> {
        self.index
            .get(location)
            .map(|&position| &self.entries[position].1)
    }

    pub fn contains(&self, location: &OutputLocation) -> bool {
        self.index.contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutputLocation, &Expr)> {
        self.entries.iter().map(|(location, expr)| (location, expr))
    }

    pub(crate) fn exprs_mut(&mut self) -> impl Iterator<Item = &mut Expr> {
        self.entries.iter_mut().map(|(_, expr)| expr)
    }
}

impl IntoIterator for BindingTable {
    type Item = (OutputLocation, Expr);
    type IntoIter = std::vec::IntoIter<(OutputLocation, Expr)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl core::fmt::Debug for BindingTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(location, expr)| (location, expr)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::types::TypeManager;
    use crate::values::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_last_write_wins_in_place() {
        let manager = TypeManager::new();
        let target = manager
            .class("Target")
            .unwrap()
            .property("A", &manager.i32())
            .property("B", &manager.i32())
            .build()
            .unwrap();
        let a = OutputLocation::parse(&target, "A").unwrap();
        let b = OutputLocation::parse(&target, "B").unwrap();
        let one = Expr::constant(Value::I32(1), &manager.i32());
        let two = Expr::constant(Value::I32(2), &manager.i32());

        let mut table = BindingTable::new();
        assert!(table.insert(a.clone(), one.clone()).is_none());
        table.insert(b.clone(), one.clone());
        assert!(table.insert(a.clone(), two).is_some());

        let order: Vec<_> = table.iter().map(|(l, e)| format!("{} <- {}", l, e)).collect();
        assert_eq!(order, vec!["A <- 2", "B <- 1"]);
        assert_eq!(table.len(), 2);
    }
}
