use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};

pub const HANDLE_COMPOSE_REPLY_ID: u64 = 1;

#[cw_serde]
pub struct Config {
    pub endpoint: Addr,
    pub vault: Addr,
    pub asset_bridge: Addr,
    pub share_bridge: Addr,
    pub asset_denom: String,
    pub native_denom: String,
    pub hub_chain: u32,
}

/// What a compose transfer credited to the composer.
#[cw_serde]
#[derive(Copy)]
pub enum AssetKind {
    Asset,
    Share,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Asset => write!(f, "asset"),
            AssetKind::Share => write!(f, "share"),
        }
    }
}

/// Everything needed to send a failed compose back where it came from.
#[cw_serde]
pub struct PendingCompose {
    pub message_id: String,
    pub asset: AssetKind,
    pub src_chain: u32,
    pub compose_from: String,
    pub amount: Uint128,
    pub native_value: Uint128,
    pub executor: Addr,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const PEERS: Map<u32, String> = Map::new("peers");
pub const PENDING_COMPOSE: Item<PendingCompose> = Item::new("pending_compose");
