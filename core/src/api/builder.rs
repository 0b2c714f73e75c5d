use crate::api::{Error, Mapper, MapperOptions};
use crate::compiler::Program;
use crate::converters::ConverterChain;
use crate::expr::{Expr, Var, VarAllocator};
use crate::mapping::generator::Generator;
use crate::mapping::optimizer::hoist_shared_members;
use crate::mapping::{
    BindingTable, ConfigError, OutputLocation, auto_match, default_predicate,
};
use crate::types::{MemberRef, Ty, TypeManager};

/// Parameter that bound source expressions are written against.
const SOURCE: Var = Var(0);
/// Parameter that bound target accessors are written against.
const TARGET: Var = Var(1);
/// Argument of the compiled program.
const INPUT: Var = Var(2);
const FIRST_LOCAL: u32 = 3;

/// Collects bindings for one (source, target) pair and builds a [`Mapper`].
///
/// # Example
///
/// ```
/// use remap_core::api::MapperBuilder;
/// use remap_core::types::TypeManager;
/// use remap_core::values::Value;
///
/// let types = TypeManager::new();
/// let person = types.class("Person").unwrap()
///     .property("Name", &types.string())
///     .build().unwrap();
/// let contact = types.class("Contact").unwrap()
///     .property("DisplayName", &types.string())
///     .build().unwrap();
///
/// let mut builder = MapperBuilder::new(&types, &person, &contact);
/// builder.bind_path("DisplayName", "Name").unwrap();
/// let mapper = builder.build().unwrap();
///
/// let input = Value::construct(&person);
/// input.as_object().unwrap().set("Name", Value::from("Ada"));
/// let output = mapper.map(&input).unwrap();
/// assert_eq!(output.get("DisplayName"), Some(Value::from("Ada")));
/// ```
pub struct MapperBuilder<'t> {
    types: &'t TypeManager,
    source: Ty,
    target: Ty,
    chain: ConverterChain,
    options: MapperOptions,
    bindings: BindingTable,
    ignored: Vec<OutputLocation>,
    /// Set once anything but the default auto-binding configured the mapper.
    explicit: bool,
}

impl<'t> MapperBuilder<'t> {
    pub fn new(types: &'t TypeManager, source: &Ty, target: &Ty) -> Self {
        MapperBuilder {
            types,
            source: source.clone(),
            target: target.clone(),
            chain: ConverterChain::new(),
            options: MapperOptions::default(),
            bindings: BindingTable::new(),
            ignored: Vec::new(),
            explicit: false,
        }
    }

    pub fn with_options(mut self, options: MapperOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_converters(mut self, chain: ConverterChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    pub fn converters(&self) -> &ConverterChain {
        &self.chain
    }

    /// The rule chain used by `build` and by `auto_bind`. Changes apply to
    /// everything built afterwards.
    pub fn converters_mut(&mut self) -> &mut ConverterChain {
        &mut self.chain
    }

    /// The source parameter, for writing source expressions.
    pub fn source(&self) -> Expr {
        Expr::param(SOURCE, "src", &self.source)
    }

    /// The target parameter, for writing target accessors.
    pub fn target(&self) -> Expr {
        Expr::param(TARGET, "dst", &self.target)
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Bind a member chain on [`target()`](Self::target) to an expression
    /// over [`source()`](Self::source). Binding `target()` itself replaces
    /// the construction of the target value. When that value is an object of
    /// the input, `build` refuses further member bindings.
    pub fn bind(&mut self, target: Expr, source: Expr) -> Result<&mut Self, ConfigError> {
        let location = OutputLocation::from_expr(&target, TARGET, "target")?;
        self.insert(location, source)
    }

    /// Bind dotted member paths. The empty string denotes the whole value.
    pub fn bind_path(
        &mut self,
        target_path: &str,
        source_path: &str,
    ) -> Result<&mut Self, ConfigError> {
        let location = OutputLocation::parse(&self.target, target_path)?;
        let source = OutputLocation::parse(&self.source, source_path)?;
        if let Some(member) = source.members().iter().find(|member| !member.is_readable()) {
            return Err(ConfigError::WriteOnlyMember {
                path: format!("{}.{}", member.owner(), member.name()),
            });
        }
        let expr = source.access(self.source());
        self.insert(location, expr)
    }

    /// Bind a dotted target path to an arbitrary expression over
    /// [`source()`](Self::source), such as a host function call.
    pub fn bind_value(&mut self, target_path: &str, expr: Expr) -> Result<&mut Self, ConfigError> {
        let location = OutputLocation::parse(&self.target, target_path)?;
        self.insert(location, expr)
    }

    fn insert(&mut self, location: OutputLocation, expr: Expr) -> Result<&mut Self, ConfigError> {
        if expr.references_other_than(SOURCE).is_some() {
            return Err(ConfigError::ForeignVariable {
                expr: expr.to_string(),
            });
        }
        tracing::trace!(location = %location, expr = %expr, "Binding");
        self.bindings.insert(location, expr);
        self.explicit = true;
        Ok(self)
    }

    /// Bind every writable target member to the first readable source member
    /// with the same name whose type is assignable or convertible.
    pub fn auto_bind(&mut self) -> &mut Self {
        let pairs = {
            let predicate = default_predicate(&self.chain);
            auto_match(&self.source, &self.target, &predicate, &self.ignored)
        };
        self.apply_matches(pairs)
    }

    /// Like [`auto_bind`](Self::auto_bind) with a custom `(source, target)`
    /// member predicate.
    pub fn auto_bind_with(
        &mut self,
        predicate: impl Fn(&MemberRef, &MemberRef) -> bool,
    ) -> &mut Self {
        let pairs = auto_match(&self.source, &self.target, &predicate, &self.ignored);
        self.explicit = true;
        self.apply_matches(pairs)
    }

    fn apply_matches(&mut self, pairs: Vec<(MemberRef, MemberRef)>) -> &mut Self {
        tracing::trace!(count = pairs.len(), "Auto-binding members");
        for (target, source) in pairs {
            let expr = self.source().member(&source);
            self.bindings.insert(OutputLocation::from_members([target]), expr);
        }
        self
    }

    /// Exclude a source member from later auto-binding passes.
    pub fn ignore(&mut self, source_path: &str) -> Result<&mut Self, ConfigError> {
        let location = OutputLocation::parse(&self.source, source_path)?;
        self.ignored.push(location);
        Ok(self)
    }

    /// Generate and compile the mapping program.
    pub fn build(&self) -> Result<Mapper, Error> {
        let input = Expr::param(INPUT, "x", &self.source);
        let shortcut = if !self.explicit && self.options.conversion_shortcut {
            self.chain.try_convert(self.types, input.clone(), &self.target)
        } else {
            None
        };
        let expr = match shortcut {
            Some(expr) => expr,
            None => self.generate(input)?,
        };
        let program = Program::compile(&expr, INPUT)?;

        tracing::debug!(
            source = %self.source,
            target = %self.target,
            bindings = self.bindings.len(),
            "Built mapper"
        );
        tracing::debug!("Mapping program:\n{}", expr);
        Ok(Mapper::new(self.source.clone(), self.target.clone(), expr, program))
    }

    fn generate(&self, input: Expr) -> Result<Expr, ConfigError> {
        let mut bindings = self.bindings.clone();
        let mut vars = VarAllocator::starting_at(FIRST_LOCAL);
        let hoisted = if self.options.hoist_shared_members {
            hoist_shared_members(&mut bindings, SOURCE, &mut vars)
        } else {
            Vec::new()
        };
        tracing::debug!(hoisted = hoisted.len(), "Generating mapping block");

        Generator {
            types: self.types,
            chain: &self.chain,
            vars: &mut vars,
            source_param: SOURCE,
            input,
            target: self.target.clone(),
            construct_missing: self.options.construct_missing_nested,
        }
        .generate(bindings, hoisted)
    }
}
