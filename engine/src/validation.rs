//! Transaction validation.
//!
//! These checks run before a transaction touches storage. A failure
//! produces a rejected receipt without executing anything.

use tessera_hostapi::{HostConfig, HostError};
use tessera_primitives::Transaction;

/// Validate the gas of a transaction.
///
/// Checks:
/// - `gas > 0`
/// - `gas <= block_gas_limit`
pub fn validate_gas(tx: &Transaction, config: &HostConfig) -> Result<(), HostError> {
    if tx.gas <= 0 {
        return Err(HostError::InvalidTransaction(format!(
            "gas must be > 0, got {}",
            tx.gas
        )));
    }
    if tx.gas > config.block_gas_limit {
        return Err(HostError::InvalidTransaction(format!(
            "gas {} exceeds block gas limit {}",
            tx.gas, config.block_gas_limit
        )));
    }
    Ok(())
}

/// Validate the payload of a transaction.
///
/// A creation needs init code; ABI metadata only accompanies creations.
pub fn validate_payload(tx: &Transaction) -> Result<(), HostError> {
    if tx.is_create() && tx.input.is_empty() {
        return Err(HostError::InvalidTransaction(
            "contract creation without init code".into(),
        ));
    }
    if !tx.is_create() && tx.abi.is_some() {
        return Err(HostError::InvalidTransaction(
            "ABI metadata attached to a call".into(),
        ));
    }
    Ok(())
}

/// Validate a transaction before execution.
pub fn validate_transaction(tx: &Transaction, config: &HostConfig) -> Result<(), HostError> {
    validate_gas(tx, config)?;
    validate_payload(tx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_primitives::StatusCode;

    fn valid_call() -> Transaction {
        Transaction::call([1; 20], [2; 20], vec![0x01], 1_000)
    }

    #[test]
    fn test_valid_transactions() {
        let config = HostConfig::default();
        assert!(validate_transaction(&valid_call(), &config).is_ok());

        let create = Transaction::create([1; 20], vec![0x06, 0x00], 1_000).with_abi("[]");
        assert!(validate_transaction(&create, &config).is_ok());
    }

    #[test]
    fn test_zero_gas_rejected() {
        let mut tx = valid_call();
        tx.gas = 0;
        let err = validate_transaction(&tx, &HostConfig::default()).unwrap_err();
        assert!(matches!(err, HostError::InvalidTransaction(_)));
        assert_eq!(err.status_code(), StatusCode::Rejected);
    }

    #[test]
    fn test_negative_gas_rejected() {
        let mut tx = valid_call();
        tx.gas = -5;
        assert!(validate_gas(&tx, &HostConfig::default()).is_err());
    }

    #[test]
    fn test_gas_above_block_limit_rejected() {
        let config = HostConfig {
            block_gas_limit: 500,
            ..HostConfig::default()
        };
        let mut tx = valid_call();
        tx.gas = 500;
        assert!(validate_gas(&tx, &config).is_ok());
        tx.gas = 501;
        let err = validate_gas(&tx, &config).unwrap_err();
        assert!(err.to_string().contains("exceeds block gas limit"));
    }

    #[test]
    fn test_empty_creation_rejected() {
        let tx = Transaction::create([1; 20], vec![], 1_000);
        assert!(validate_payload(&tx).is_err());
    }

    #[test]
    fn test_abi_on_call_rejected() {
        let tx = valid_call().with_abi("[]");
        assert!(validate_payload(&tx).is_err());
    }
}
