//! Ordered registry of compute methods.

use std::error::Error;
use std::fmt;

use indexmap::IndexMap;

use halo_core::CommError;

use crate::context::ComputeContext;
use crate::hooks::Method;

/// Errors from method registration (build-time, not per-cycle).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A method with this name is already registered.
    DuplicateName {
        /// The contested name.
        name: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "method '{name}' registered twice"),
        }
    }
}

impl Error for RegistryError {}

/// Methods keyed by name, run in registration order.
#[derive(Default)]
pub struct MethodList {
    methods: IndexMap<String, Box<dyn Method>>,
}

impl MethodList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `method`.
    ///
    /// Fails if another method already uses the same name.
    pub fn register(&mut self, method: Box<dyn Method>) -> Result<(), RegistryError> {
        let name = method.name().to_string();
        if self.methods.contains_key(&name) {
            return Err(RegistryError::DuplicateName { name });
        }
        self.methods.insert(name, method);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, method: Box<dyn Method>) -> Result<Self, RegistryError> {
        self.register(method)?;
        Ok(self)
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no methods are registered.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Registered names in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Run every method on `ctx` in order, stopping at the first failure.
    pub fn compute(&self, ctx: &mut ComputeContext<'_>) -> Result<(), CommError> {
        for (name, method) in &self.methods {
            method
                .compute_block(ctx)
                .map_err(|reason| CommError::Method {
                    name: name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}

impl fmt::Debug for MethodList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.methods.keys()).finish()
    }
}
