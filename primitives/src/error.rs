//! Status codes and primitive error types.
//!
//! `StatusCode` is the result code reported by an interpreter for one
//! execution. Its numbering follows the EVMC status codes so results can be
//! exchanged with EVMC-style interpreters without translation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Interpreter-reported execution status.
///
/// `Success` is the only non-failure value. Every other status is an
/// interpreter-reported failure, which always goes together with a
/// storage rollback in the host that ran the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StatusCode {
    Success = 0,
    Failure = 1,
    Revert = 2,
    OutOfGas = 3,
    InvalidInstruction = 4,
    UndefinedInstruction = 5,
    StackOverflow = 6,
    StackUnderflow = 7,
    BadJumpDestination = 8,
    InvalidMemoryAccess = 9,
    CallDepthExceeded = 10,
    StaticModeViolation = 11,
    PrecompileFailure = 12,
    ContractValidationFailure = 13,
    ArgumentOutOfRange = 14,
    InsufficientBalance = 17,
    InternalError = -1,
    Rejected = -2,
    OutOfMemory = -3,
}

impl StatusCode {
    /// Convert from the raw `i32` representation.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::Failure),
            2 => Some(Self::Revert),
            3 => Some(Self::OutOfGas),
            4 => Some(Self::InvalidInstruction),
            5 => Some(Self::UndefinedInstruction),
            6 => Some(Self::StackOverflow),
            7 => Some(Self::StackUnderflow),
            8 => Some(Self::BadJumpDestination),
            9 => Some(Self::InvalidMemoryAccess),
            10 => Some(Self::CallDepthExceeded),
            11 => Some(Self::StaticModeViolation),
            12 => Some(Self::PrecompileFailure),
            13 => Some(Self::ContractValidationFailure),
            14 => Some(Self::ArgumentOutOfRange),
            17 => Some(Self::InsufficientBalance),
            -1 => Some(Self::InternalError),
            -2 => Some(Self::Rejected),
            -3 => Some(Self::OutOfMemory),
            _ => None,
        }
    }

    /// Return the `i32` representation of this status.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true for `Success`.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Revert => "REVERT",
            Self::OutOfGas => "OUT_OF_GAS",
            Self::InvalidInstruction => "INVALID_INSTRUCTION",
            Self::UndefinedInstruction => "UNDEFINED_INSTRUCTION",
            Self::StackOverflow => "STACK_OVERFLOW",
            Self::StackUnderflow => "STACK_UNDERFLOW",
            Self::BadJumpDestination => "BAD_JUMP_DESTINATION",
            Self::InvalidMemoryAccess => "INVALID_MEMORY_ACCESS",
            Self::CallDepthExceeded => "CALL_DEPTH_EXCEEDED",
            Self::StaticModeViolation => "STATIC_MODE_VIOLATION",
            Self::PrecompileFailure => "PRECOMPILE_FAILURE",
            Self::ContractValidationFailure => "CONTRACT_VALIDATION_FAILURE",
            Self::ArgumentOutOfRange => "ARGUMENT_OUT_OF_RANGE",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Rejected => "REJECTED",
            Self::OutOfMemory => "OUT_OF_MEMORY",
        };
        write!(f, "{}({})", name, self.as_i32())
    }
}

/// Errors produced while decoding primitive wire formats.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Input ended before the value was complete.
    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEnd { offset: usize },

    /// A status code outside the known set.
    #[error("unknown status code {0}")]
    UnknownStatus(i32),

    /// An optional-field flag other than 0 or 1.
    #[error("invalid optional flag {0}")]
    InvalidFlag(u8),

    /// Bytes remained after the value was decoded.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_repr_values() {
        assert_eq!(StatusCode::Success as i32, 0);
        assert_eq!(StatusCode::Revert as i32, 2);
        assert_eq!(StatusCode::InsufficientBalance as i32, 17);
        assert_eq!(StatusCode::InternalError as i32, -1);
        assert_eq!(StatusCode::OutOfMemory as i32, -3);
    }

    #[test]
    fn test_status_from_i32() {
        for code in [-3, -2, -1, 0, 1, 2, 3, 10, 14, 17] {
            let status = StatusCode::from_i32(code).unwrap();
            assert_eq!(status.as_i32(), code);
        }
        assert_eq!(StatusCode::from_i32(15), None);
        assert_eq!(StatusCode::from_i32(-4), None);
    }

    #[test]
    fn test_only_success_is_success() {
        assert!(StatusCode::Success.is_success());
        assert!(!StatusCode::Revert.is_success());
        assert!(!StatusCode::InternalError.is_success());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Revert.to_string(), "REVERT(2)");
        assert_eq!(StatusCode::Rejected.to_string(), "REJECTED(-2)");
    }
}
