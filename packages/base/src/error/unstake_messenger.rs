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
    ParseReplyError(#[from] cw_utils::ParseReplyError),

    #[error("{0}")]
    OverflowError(#[from] OverflowError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Hub peer is not configured")]
    HubNotConfigured {},

    #[error("Return trip allocation must not be zero")]
    InvalidReturnTripAllocation {},

    #[error("Insufficient fee: required {required}, provided {provided}")]
    InsufficientFee {
        required: Uint128,
        provided: Uint128,
    },

    #[error("Chain {chain_id} is not the hub chain {hub_chain}")]
    InvalidChain { chain_id: u32, hub_chain: u32 },

    #[error("Peer must not be empty")]
    InvalidPeer {},

    #[error("Enforced options of unstake requests must not carry a native drop")]
    EnforcedNativeDrop {},

    #[error("Fee buffer must be between {min} and {max} bps")]
    InvalidFeeBuffer { min: u16, max: u16 },

    #[error("Unstake is already in progress")]
    ReentrantCall {},

    #[error("Endpoint did not return a messaging receipt")]
    MissingReceipt {},

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
