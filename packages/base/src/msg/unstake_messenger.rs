use crate::codec::ExecutorOptions;
use crate::msg::transport::MessagingFee;
use crate::state::unstake_messenger::Config;
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Coin, Uint128};
use cw_ownable::{cw_ownable_execute, cw_ownable_query};

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: Option<String>,
    pub endpoint: String,
    pub hub_chain: u32,
    pub native_denom: String,
    pub fee_buffer_bps: Option<u16>,
    pub receive_gas: Option<u64>,
}

#[cw_ownable_execute]
#[cw_serde]
pub enum ExecuteMsg {
    /// Requests the hub to release the sender's matured cooldown back to this chain.
    /// The attached native funds pay the dispatch, `return_trip_allocation` included.
    Unstake {
        return_trip_allocation: Uint128,
    },
    SetPeer {
        chain_id: u32,
        peer: String,
    },
    SetEnforcedOptions {
        msg_type: u16,
        options: ExecutorOptions,
    },
    SetFeeBuffer {
        bps: u16,
    },
    UpdateConfig {
        receive_gas: Option<u64>,
    },
    Rescue {
        to: String,
        amount: Coin,
    },
}

#[cw_ownable_query]
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(Option<String>)]
    Peer {},
    #[returns(ExecutorOptions)]
    EnforcedOptions { msg_type: u16 },
    #[returns(MessagingFee)]
    QuoteUnstakeWithReturnValue { user: String, return_value: Uint128 },
    #[returns(MessagingFee)]
    QuoteUnstakeWithBuffer { user: String, return_value: Uint128 },
}

#[cw_serde]
pub struct MigrateMsg {}
