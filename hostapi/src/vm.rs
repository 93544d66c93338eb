//! Interpreter interface.
//!
//! The bytecode interpreter is an external collaborator. A [`VmFactory`]
//! produces a [`VmInstance`] bound to one piece of code; the instance runs
//! that code against a [`HostApi`].

use async_trait::async_trait;
use tessera_primitives::{ExecutionResult, Hash, Message, Revision};

use crate::error::HostError;
use crate::traits::HostApi;

/// Builds interpreter instances.
pub trait VmFactory: Send + Sync {
    /// Create an instance for `code`, identified by `code_hash`, targeting
    /// `revision`.
    fn create(
        &self,
        code_hash: &Hash,
        code: &[u8],
        revision: Revision,
    ) -> Result<Box<dyn VmInstance>, HostError>;
}

/// An interpreter instance bound to one piece of code.
#[async_trait]
pub trait VmInstance: Send + Sync {
    /// Execute `code` for `message`, calling back into `host`.
    ///
    /// Recoverable failures (revert, out of gas, bad instruction) are
    /// reported as a non-success status in the result.
    async fn execute(
        &self,
        host: &mut dyn HostApi,
        revision: Revision,
        message: &Message,
        code: &[u8],
    ) -> Result<ExecutionResult, HostError>;
}
