//! Precompiled contracts.
//!
//! A precompiled contract is a built-in handler addressed by a small number.
//! When a nested call targets an address in the reserved low range and a
//! handler is registered there, the handler replaces interpreter execution.

use std::collections::BTreeMap;

use tessera_primitives::{types::address_to_u64, Address, ExecutionResult, Message};

/// A built-in contract.
pub trait Precompiled: Send + Sync {
    fn call(&self, message: &Message) -> ExecutionResult;
}

impl<F> Precompiled for F
where
    F: Fn(&Message) -> ExecutionResult + Send + Sync,
{
    fn call(&self, message: &Message) -> ExecutionResult {
        self(message)
    }
}

/// Lookup of precompiled contracts by numeric address.
pub trait PrecompiledRegistry: Send + Sync {
    fn get(&self, address: u64) -> Option<&dyn Precompiled>;
}

/// A registry backed by an ordered map.
#[derive(Default)]
pub struct PrecompiledMap {
    handlers: BTreeMap<u64, Box<dyn Precompiled>>,
}

impl PrecompiledMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` at `address`, replacing any previous handler.
    pub fn register(&mut self, address: u64, handler: impl Precompiled + 'static) -> &mut Self {
        self.handlers.insert(address, Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl PrecompiledRegistry for PrecompiledMap {
    fn get(&self, address: u64) -> Option<&dyn Precompiled> {
        self.handlers.get(&address).map(|handler| handler.as_ref())
    }
}

impl std::fmt::Debug for PrecompiledMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

/// The numeric precompiled address of `address`, if it lies in
/// `1..max_address`.
pub fn precompiled_address(address: &Address, max_address: u64) -> Option<u64> {
    address_to_u64(address).filter(|n| *n > 0 && *n < max_address)
}
