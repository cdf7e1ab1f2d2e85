use crate::codec::CodecError;
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

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Only the endpoint can deliver messages, got {sender}")]
    OnlyEndpoint { sender: String },

    #[error("Only the composer itself can handle a compose")]
    OnlySelf {},

    #[error("Compose sender {from} is not a known bridge")]
    OnlyValidComposeCaller { from: String },

    #[error("No peer registered for chain {chain_id}")]
    NoPeer { chain_id: u32 },

    #[error("Sender {sender} is not the peer of chain {chain_id}")]
    OnlyPeer { chain_id: u32, sender: String },

    #[error("Insufficient message value: required {required}, provided {provided}")]
    InsufficientMsgValue {
        required: Uint128,
        provided: Uint128,
    },

    #[error("Address must not be empty")]
    InvalidZeroAddress {},

    #[error("Origin chain must not be zero")]
    InvalidOrigin {},

    #[error("Nothing to unstake")]
    NoAssetsToUnstake {},

    #[error("Nothing to redeem")]
    NoAssetsToRedeem {},

    #[error("Shares can only be composed with a cooldown or fast redeem command")]
    InitiateCooldownRequired {},

    #[error("Slippage exceeded: got {amount}, minimum {min_amount}")]
    SlippageExceeded {
        amount: Uint128,
        min_amount: Uint128,
    },

    #[error("Native value is not expected for a local delivery")]
    NoMsgValueExpected {},

    #[error("unknown reply id: {id}")]
    UnknownReplyId { id: u64 },

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
