use cosmwasm_std::{OverflowError, StdError, Uint128};
use cw_ownable::OwnershipError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    OwnershipError(#[from] OwnershipError),

    #[error("{0}")]
    PaymentError(#[from] cw_utils::PaymentError),

    #[error("{0}")]
    OverflowError(#[from] OverflowError),

    #[error("Caller does not hold the composer capability")]
    MissingComposerRole {},

    #[error("Operation is not allowed with the current cooldown setting")]
    OperationNotAllowed {},

    #[error("Fast redeem is disabled")]
    FastRedeemDisabled {},

    #[error("Amount must not be zero")]
    InvalidZeroAmount {},

    #[error("Address must not be empty")]
    InvalidZeroAddress {},

    #[error("Redeem amount {requested} exceeds redeemable balance {available}")]
    ExcessiveRedeemAmount {
        requested: Uint128,
        available: Uint128,
    },

    #[error("Withdraw amount {requested} exceeds withdrawable assets {available}")]
    ExcessiveWithdrawAmount {
        requested: Uint128,
        available: Uint128,
    },

    #[error("No open cooldown")]
    NoCooldown {},

    #[error("Cooldown ends at {cooldown_end}")]
    CooldownNotElapsed { cooldown_end: u64 },

    #[error("Fast redeem fee rounds down to zero")]
    ZeroFee {},

    #[error("Cooldown duration must not exceed {max} seconds")]
    InvalidCooldownDuration { max: u64 },

    #[error("Fast redeem fee must be between {min} and {max} bps")]
    InvalidFastRedeemFee { min: u16, max: u16 },

    #[error("Semver parsing error: {0}")]
    SemVer(String),

    #[error("Can't migrate from {storage_contract_name} to {contract_name}")]
    MigrationError {
        storage_contract_name: String,
        contract_name: String,
    },
}

impl From<semver::Error> for ContractError {
    fn from(err: semver::Error) -> Self {
        Self::SemVer(err.to_string())
    }
}

pub type ContractResult<T> = Result<T, ContractError>;
