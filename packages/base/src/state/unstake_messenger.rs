use crate::codec::ExecutorOptions;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};

pub const UNSTAKE_REPLY_ID: u64 = 1;

pub const DEFAULT_FEE_BUFFER_BPS: u16 = 1_000;
pub const MIN_FEE_BUFFER_BPS: u16 = 500;
pub const MAX_FEE_BUFFER_BPS: u16 = 5_000;
pub const DEFAULT_RECEIVE_GAS: u64 = 350_000;

#[cw_serde]
pub struct Config {
    pub endpoint: Addr,
    pub hub_chain: u32,
    pub native_denom: String,
    pub fee_buffer_bps: u16,
    /// Gas requested for the hub-side receive of an unstake request.
    pub receive_gas: u64,
}

/// Held while the endpoint dispatch is in flight.
#[cw_serde]
pub struct PendingUnstake {
    pub user: Addr,
    pub paid: Uint128,
    pub native_fee: Uint128,
    pub return_trip_allocation: Uint128,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const HUB_PEER: Item<String> = Item::new("hub_peer");
pub const ENFORCED_OPTIONS: Map<u16, ExecutorOptions> = Map::new("enforced_options");
pub const PENDING_UNSTAKE: Item<PendingUnstake> = Item::new("pending_unstake");
