use std::sync::Arc;

use hashbrown::HashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::api::{Error, Mapper, MapperBuilder, MapperOptions};
use crate::converters::ConverterChain;
use crate::types::{Ty, TypeManager};

type Slot = Arc<OnceCell<Mapper>>;

/// Builds mappers over one [`TypeManager`] and caches the default mapper of
/// each (source, target) pair.
///
/// Concurrent requests for the same uncached pair build it once; the other
/// callers wait for that build and share its result. A failed build is not
/// cached, so a later request tries again.
pub struct MapperRegistry {
    types: Arc<TypeManager>,
    chain: ConverterChain,
    options: MapperOptions,
    cache: RwLock<HashMap<(Ty, Ty), Slot>>,
}

impl MapperRegistry {
    pub fn new(types: Arc<TypeManager>) -> Self {
        MapperRegistry {
            types,
            chain: ConverterChain::new(),
            options: MapperOptions::default(),
            cache: RwLock::new(HashMap::new()),
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

    pub fn types(&self) -> &Arc<TypeManager> {
        &self.types
    }

    pub fn converters(&self) -> &ConverterChain {
        &self.chain
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// A builder sharing this registry's converters and options. Mappers it
    /// builds are not cached.
    pub fn builder(&self, source: &Ty, target: &Ty) -> MapperBuilder<'_> {
        MapperBuilder::new(&self.types, source, target)
            .with_converters(self.chain.clone())
            .with_options(self.options.clone())
    }

    /// The auto-bound mapper from `source` to `target`, built on first use.
    pub fn default_mapper(&self, source: &Ty, target: &Ty) -> Result<Mapper, Error> {
        let slot = self.slot(source, target);
        slot.get_or_try_init(|| {
            tracing::debug!(%source, %target, "Building default mapper");
            let mut builder = self.builder(source, target);
            builder.auto_bind();
            builder.build()
        })
        .cloned()
    }

    fn slot(&self, source: &Ty, target: &Ty) -> Slot {
        let key = (source.clone(), target.clone());
        if let Some(slot) = self.cache.read().get(&key) {
            return slot.clone();
        }
        self.cache.write().entry(key).or_default().clone()
    }

    /// Number of pairs requested so far, built or not.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}
