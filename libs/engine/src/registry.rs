//! Two-tier extension registry
//!
//! Symbols resolve local-first: an expression's own [`Registry`] shadows
//! the process-wide tier in [`global`]. The global tier is initialized
//! once with the built-in operator and function set; registration is
//! keyed by symbol (or by `TypeId` for converters), so re-registering an
//! equivalent implementation is a no-op.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::convert::NumConverter;
use crate::ops::{Function, Operator};

/// One registry tier: symbol → operator/function, `TypeId` → converter.
#[derive(Default, Clone)]
pub struct Registry {
    operators: HashMap<String, Arc<dyn Operator>>,
    functions: HashMap<String, Arc<dyn Function>>,
    converters: HashMap<TypeId, Arc<dyn NumConverter>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_operator(&mut self, operator: Arc<dyn Operator>) {
        self.operators
            .insert(operator.symbol().to_string(), operator);
    }

    pub fn register_function(&mut self, function: Arc<dyn Function>) {
        self.functions
            .insert(function.symbol().to_string(), function);
    }

    /// Registers a converter for concrete type `T`.
    pub fn register_converter<T: Any>(&mut self, converter: Arc<dyn NumConverter>) {
        self.converters.insert(TypeId::of::<T>(), converter);
    }

    pub fn operator(&self, symbol: &str) -> Option<Arc<dyn Operator>> {
        self.operators.get(symbol).cloned()
    }

    pub fn function(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.functions.get(name).cloned()
    }

    /// Converter for the concrete type behind `value`, if any.
    pub fn converter_for(&self, value: &dyn Any) -> Option<Arc<dyn NumConverter>> {
        self.converters.get(&value.type_id()).cloned()
    }

    pub fn operator_symbols(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(String::as_str)
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("operators", &self.operators.keys().collect::<Vec<_>>())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("converters", &self.converters.len())
            .finish()
    }
}

/// The process-wide tier.
pub mod global {
    use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

    use once_cell::sync::Lazy;

    use super::*;
    use crate::error::{Error, Result};
    use crate::num::Num;
    use crate::ops;

    static GLOBAL: Lazy<RwLock<Registry>> = Lazy::new(|| {
        let mut registry = Registry::new();

        registry.register_operator(Arc::new(ops::Add));
        registry.register_operator(Arc::new(ops::Sub));
        registry.register_operator(Arc::new(ops::Mul));
        registry.register_operator(Arc::new(ops::Div));
        registry.register_operator(Arc::new(ops::Mod));
        registry.register_operator(Arc::new(ops::Pow));

        registry.register_function(Arc::new(ops::Abs));
        registry.register_function(Arc::new(ops::Sqrt));
        registry.register_function(Arc::new(ops::Log));
        registry.register_function(Arc::new(ops::Sin));
        registry.register_function(Arc::new(ops::Cos));
        registry.register_function(Arc::new(ops::Tan));
        registry.register_function(Arc::new(ops::Sinh));
        registry.register_function(Arc::new(ops::Cosh));
        registry.register_function(Arc::new(ops::Tanh));

        RwLock::new(registry)
    });

    fn read() -> RwLockReadGuard<'static, Registry> {
        GLOBAL.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write() -> RwLockWriteGuard<'static, Registry> {
        GLOBAL.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register_operator(operator: Arc<dyn Operator>) {
        write().register_operator(operator);
    }

    pub fn register_function(function: Arc<dyn Function>) {
        write().register_function(function);
    }

    pub fn register_converter<T: Any>(converter: Arc<dyn NumConverter>) {
        write().register_converter::<T>(converter);
    }

    pub fn operator(symbol: &str) -> Option<Arc<dyn Operator>> {
        read().operator(symbol)
    }

    pub fn function(name: &str) -> Option<Arc<dyn Function>> {
        read().function(name)
    }

    pub fn operator_symbols() -> Vec<String> {
        read().operator_symbols().map(str::to_string).collect()
    }

    /// Converts a foreign value through the registered converter for its
    /// concrete type.
    pub fn convert_to_num(value: &dyn Any) -> Result<Num> {
        let converter = read().converter_for(value);
        match converter {
            Some(converter) => converter.to_num(value),
            None => Err(Error::UnsupportedType(format!("{:?}", value.type_id()))),
        }
    }
}
