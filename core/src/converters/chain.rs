use core::fmt;
use std::sync::Arc;

use crate::converters::sequences::{SeqShape, ToSequence};
use crate::converters::{
    BoxRule, ConversionRule, ConvertibleToPrimitive, EnumUnderlying, FromNullable, OperatorRule,
    ParentClass, StringToEnum, ToNullable, ToStringRule, UnboxRule,
};
use crate::expr::Expr;
use crate::types::{ConversionKind, Ty, TypeManager};

/// Ordered, mutable list of conversion rules. Earlier rules win.
#[derive(Clone)]
pub struct ConverterChain {
    rules: Vec<Arc<dyn ConversionRule>>,
}

impl ConverterChain {
    /// The built-in rules in their default priority order.
    pub fn new() -> Self {
        let rules: Vec<Arc<dyn ConversionRule>> = vec![
            Arc::new(FromNullable),
            Arc::new(ToNullable),
            Arc::new(BoxRule),
            Arc::new(UnboxRule),
            Arc::new(EnumUnderlying),
            Arc::new(OperatorRule(ConversionKind::Implicit)),
            Arc::new(OperatorRule(ConversionKind::Explicit)),
            Arc::new(StringToEnum),
            Arc::new(ConvertibleToPrimitive),
            Arc::new(ToStringRule),
            Arc::new(ToSequence(SeqShape::Array)),
            Arc::new(ToSequence(SeqShape::List)),
            Arc::new(ToSequence(SeqShape::Set)),
            Arc::new(ToSequence(SeqShape::Enumerable)),
            Arc::new(ParentClass),
        ];
        ConverterChain { rules }
    }

    /// A chain without any rule: only identity and plain assignability apply.
    pub fn empty() -> Self {
        ConverterChain { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[Arc<dyn ConversionRule>] {
        &self.rules
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Append with the lowest priority.
    pub fn push(&mut self, rule: impl ConversionRule + 'static) -> &mut Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Insert at `index`; indices past the end append.
    pub fn insert(&mut self, index: usize, rule: impl ConversionRule + 'static) -> &mut Self {
        let index = index.min(self.rules.len());
        self.rules.insert(index, Arc::new(rule));
        self
    }

    /// Remove every rule called `name`. Returns whether one was found.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.name() != name);
        self.rules.len() != before
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name() == name)
    }

    /// The rule that would handle `from -> to`.
    pub fn find(&self, from: &Ty, to: &Ty) -> Option<&dyn ConversionRule> {
        self.rules
            .iter()
            .find(|rule| rule.can_convert(from, to))
            .map(|rule| rule.as_ref())
    }

    pub fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        from == to || self.find(from, to).is_some()
    }

    /// Convert `expr` to `to` with the first applicable rule. Identical types
    /// need no conversion.
    pub fn try_convert(&self, types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        if expr.ty() == to {
            return Some(expr);
        }
        let rule = self.find(expr.ty(), to)?;
        tracing::trace!(rule = rule.name(), from = %expr.ty(), to = %to, "Applying conversion rule");
        rule.convert(types, expr, to)
    }
}

impl Default for ConverterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
