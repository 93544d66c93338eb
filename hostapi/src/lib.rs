//! `tessera-hostapi`: the host interface between contract execution and
//! its external collaborators.
//!
//! This crate provides:
//!
//! - `HostApi` trait: what an interpreter may call back into
//! - `VmFactory` / `VmInstance`: the interpreter itself, as an interface
//! - `Precompiled` / `PrecompiledRegistry`: built-in contracts by address
//! - `HostConfig`: revision, hash algorithm and limits
//! - `HostError`: fatal execution errors

pub mod config;
pub mod error;
pub mod precompiled;
pub mod traits;
pub mod vm;

pub use config::HostConfig;
pub use error::HostError;
pub use precompiled::{precompiled_address, Precompiled, PrecompiledMap, PrecompiledRegistry};
pub use traits::HostApi;
pub use vm::{VmFactory, VmInstance};
