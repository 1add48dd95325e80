//! # Factory Registry
//!
//! Immutable `ViewType → ViewFactory` snapshot built once per `Mode`.
//!
//! A registry is selected when a `Graph` is opened and never changes
//! afterwards, so several configurations (strict and lax) can serve
//! different graphs in the same process without seeing each other.

pub mod standard;

use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;

use crate::config::Mode;
use crate::factory::FactoryRef;
use crate::view::ViewType;
use crate::{Error, Result};

pub struct FactoryRegistry {
    mode: Mode,
    factories: HashMap<ViewType, FactoryRef>,
    /// Registration order, used by `classify`.
    order: Vec<ViewType>,
}

impl FactoryRegistry {
    pub fn builder(mode: Mode) -> RegistryBuilder {
        RegistryBuilder { mode, factories: HashMap::new(), order: Vec::new() }
    }

    /// The standard OWL registry for `mode`, built on first use and shared.
    pub fn shared(mode: Mode) -> Arc<FactoryRegistry> {
        static STRICT: OnceLock<Arc<FactoryRegistry>> = OnceLock::new();
        static LAX: OnceLock<Arc<FactoryRegistry>> = OnceLock::new();
        let slot = match mode {
            Mode::Strict => &STRICT,
            Mode::Lax => &LAX,
        };
        slot.get_or_init(|| Arc::new(standard::build(mode))).clone()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn resolve(&self, view_type: ViewType) -> Result<&FactoryRef> {
        self.factories.get(&view_type).ok_or_else(|| Error::Conversion {
            node: String::new(),
            view_type: view_type.to_string(),
            reason: "no factory registered".into(),
        })
    }

    pub fn contains(&self, view_type: ViewType) -> bool {
        self.factories.contains_key(&view_type)
    }

    /// Registered view types in registration order.
    pub fn view_types(&self) -> &[ViewType] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

pub struct RegistryBuilder {
    mode: Mode,
    factories: HashMap<ViewType, FactoryRef>,
    order: Vec<ViewType>,
}

impl RegistryBuilder {
    /// Register (or replace) the factory for `view_type`.
    pub fn register(mut self, view_type: ViewType, factory: FactoryRef) -> Self {
        if self.factories.insert(view_type, factory).is_none() {
            self.order.push(view_type);
        }
        self
    }

    /// Start from every factory of an existing registry.
    pub fn extend_from(mut self, other: &FactoryRegistry) -> Self {
        for vt in &other.order {
            if let Some(f) = other.factories.get(vt) {
                self = self.register(*vt, f.clone());
            }
        }
        self
    }

    pub fn build(self) -> FactoryRegistry {
        tracing::debug!(mode = ?self.mode, factories = self.order.len(), "factory registry built");
        FactoryRegistry { mode: self.mode, factories: self.factories, order: self.order }
    }
}
