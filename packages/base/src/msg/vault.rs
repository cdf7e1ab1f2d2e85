use crate::state::vault::{Config, CooldownEntry};
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Decimal, Uint128};
use cw_ownable::{cw_ownable_execute, cw_ownable_query};

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: Option<String>,
    pub asset_denom: String,
    pub treasury: String,
    pub cooldown_duration: u64,
    pub fast_redeem_enabled: bool,
    pub fast_redeem_fee_bps: u16,
}

#[cw_serde]
#[derive(Default)]
pub struct ConfigOptional {
    pub treasury: Option<String>,
    pub cooldown_duration: Option<u64>,
    pub fast_redeem_enabled: Option<bool>,
    pub fast_redeem_fee_bps: Option<u16>,
}

#[cw_ownable_execute]
#[cw_serde]
pub enum ExecuteMsg {
    Deposit {
        receiver: Option<String>,
    },
    Redeem {
        shares: Uint128,
        receiver: Option<String>,
    },
    Withdraw {
        assets: Uint128,
        receiver: Option<String>,
    },
    Transfer {
        recipient: String,
        amount: Uint128,
    },
    CooldownShares {
        shares: Uint128,
    },
    CooldownAssets {
        assets: Uint128,
    },
    Unstake {
        receiver: Option<String>,
    },
    FastRedeem {
        shares: Uint128,
        receiver: Option<String>,
    },
    FastWithdraw {
        assets: Uint128,
        receiver: Option<String>,
    },
    CooldownSharesByComposer {
        shares: Uint128,
        redeemer: String,
    },
    CooldownAssetsByComposer {
        assets: Uint128,
        redeemer: String,
    },
    UnstakeThroughComposer {
        redeemer: String,
    },
    FastRedeemThroughComposer {
        shares: Uint128,
        crosschain_receiver: String,
        owner: String,
    },
    FastWithdrawThroughComposer {
        assets: Uint128,
        crosschain_receiver: String,
        owner: String,
    },
    AddRewards {},
    UpdateConfig {
        new_config: Box<ConfigOptional>,
    },
    GrantComposer {
        address: String,
    },
    RevokeComposer {
        address: String,
    },
}

#[cw_serde]
pub struct VaultStateResponse {
    pub total_assets: Uint128,
    pub total_shares: Uint128,
    pub cooldown_assets: Uint128,
    pub exchange_rate: Decimal,
}

#[cw_serde]
pub struct FastRedeemPreview {
    pub shares: Uint128,
    pub gross_assets: Uint128,
    pub fee_assets: Uint128,
    pub net_assets: Uint128,
}

#[cw_ownable_query]
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(Uint128)]
    Balance { address: String },
    #[returns(VaultStateResponse)]
    VaultState {},
    #[returns(CooldownEntry)]
    Cooldown { redeemer: String },
    #[returns(Uint128)]
    PreviewDeposit { assets: Uint128 },
    #[returns(Uint128)]
    PreviewRedeem { shares: Uint128 },
    #[returns(Uint128)]
    PreviewWithdraw { assets: Uint128 },
    #[returns(FastRedeemPreview)]
    PreviewFastRedeem { shares: Uint128 },
    #[returns(FastRedeemPreview)]
    PreviewFastWithdraw { assets: Uint128 },
    #[returns(bool)]
    IsComposer { address: String },
    #[returns(Vec<String>)]
    Composers {},
}

#[cw_serde]
pub struct MigrateMsg {}
