//! Execution messages.
//!
//! A [`Message`] is one execution request: a call into existing code or the
//! creation of a new contract. The host borrows it for the duration of one
//! execution and never mutates it.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Bytes32, ZERO_ADDRESS, ZERO_WORD};

/// The kind of an execution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallKind {
    Call,
    DelegateCall,
    CallCode,
    Create,
    Create2,
}

impl CallKind {
    /// Returns true for `Create` and `Create2`.
    pub fn is_create(self) -> bool {
        matches!(self, Self::Create | Self::Create2)
    }
}

/// Target instruction-set revision the interpreter must honour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Revision {
    Frontier,
    Homestead,
    TangerineWhistle,
    SpuriousDragon,
    Byzantium,
    Constantinople,
    Petersburg,
    Istanbul,
    Berlin,
    London,
    #[default]
    Paris,
    Shanghai,
    Cancun,
}

/// One execution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Call or creation kind.
    pub kind: CallKind,
    /// Nesting depth; 0 for the top-level message.
    pub depth: i32,
    /// Gas made available to this execution.
    pub gas: i64,
    /// Account that sent the message. Zero means "unset".
    pub sender: Address,
    /// Account whose storage the execution runs against.
    pub recipient: Address,
    /// Account whose code is executed. Equals `recipient` except for
    /// delegate-style calls.
    pub code_address: Address,
    /// Call data, or the init code for creations.
    pub input: Vec<u8>,
    /// Transferred value.
    pub value: Bytes32,
    /// Salt for `Create2`.
    pub create2_salt: Bytes32,
}

impl Message {
    /// A plain call from `sender` into `recipient`.
    pub fn call(sender: Address, recipient: Address, input: Vec<u8>, gas: i64) -> Self {
        Self {
            kind: CallKind::Call,
            depth: 0,
            gas,
            sender,
            recipient,
            code_address: recipient,
            input,
            value: ZERO_WORD,
            create2_salt: ZERO_WORD,
        }
    }

    /// A contract creation from `sender` running `init_code`.
    pub fn create(sender: Address, init_code: Vec<u8>, gas: i64) -> Self {
        Self {
            kind: CallKind::Create,
            depth: 0,
            gas,
            sender,
            recipient: ZERO_ADDRESS,
            code_address: ZERO_ADDRESS,
            input: init_code,
            value: ZERO_WORD,
            create2_salt: ZERO_WORD,
        }
    }

    /// Returns a copy of this message one level deeper in the call tree.
    pub fn nested(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }
}
