use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};

pub const MAX_COOLDOWN_DURATION: u64 = 90 * 24 * 60 * 60;
pub const MIN_FAST_REDEEM_FEE_BPS: u16 = 1;
pub const MAX_FAST_REDEEM_FEE_BPS: u16 = 2_000;
pub const BPS_DENOMINATOR: u128 = 10_000;

#[cw_serde]
pub struct Config {
    pub asset_denom: String,
    pub treasury: Addr,
    /// Zero switches cooldowns off and enables plain redeem/withdraw.
    pub cooldown_duration: u64,
    pub fast_redeem_enabled: bool,
    pub fast_redeem_fee_bps: u16,
}

impl Config {
    pub fn cooldown_enabled(&self) -> bool {
        self.cooldown_duration > 0
    }
}

#[cw_serde]
#[derive(Default)]
pub struct CooldownEntry {
    pub cooldown_end: u64,
    pub underlying_amount: Uint128,
}

impl CooldownEntry {
    pub fn is_open(&self) -> bool {
        !self.underlying_amount.is_zero()
    }

    pub fn is_mature(&self, now: u64) -> bool {
        now >= self.cooldown_end
    }
}

pub const CONFIG: Item<Config> = Item::new("config");
/// Assets backing outstanding shares. Assets reserved for cooldowns are not part of it.
pub const TOTAL_ASSETS: Item<Uint128> = Item::new("total_assets");
pub const TOTAL_SHARES: Item<Uint128> = Item::new("total_shares");
pub const COOLDOWN_ASSETS: Item<Uint128> = Item::new("cooldown_assets");
pub const BALANCES: Map<&Addr, Uint128> = Map::new("balances");
/// Keyed by redeemer id. Local redeemers use their address, cross-chain ones the account on the
/// origin chain, which is not necessarily a valid address here.
pub const COOLDOWNS: Map<&str, CooldownEntry> = Map::new("cooldowns");
pub const COMPOSERS: Map<&Addr, bool> = Map::new("composers");
