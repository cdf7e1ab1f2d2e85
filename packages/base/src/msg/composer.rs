use crate::codec::SendParam;
use crate::msg::transport::{ComposeEnvelope, MessagingFee, Origin};
use crate::state::composer::{AssetKind, Config};
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Coin, Uint128};
use cw_ownable::{cw_ownable_execute, cw_ownable_query};

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: Option<String>,
    pub endpoint: String,
    pub vault: String,
    pub asset_bridge: String,
    pub share_bridge: String,
    pub native_denom: String,
    pub hub_chain: u32,
}

#[cw_ownable_execute]
#[cw_serde]
pub enum ExecuteMsg {
    /// Direct message delivered by the endpoint, native value attached as funds.
    Receive {
        origin: Origin,
        message_id: String,
        payload: Binary,
    },
    /// Compose callback delivered by the endpoint after a bridge credited `message.amount`.
    Compose {
        from: String,
        message_id: String,
        message: ComposeEnvelope,
        executor: String,
    },
    /// Internal step of `Compose`, callable by the composer itself only.
    HandleCompose {
        asset: AssetKind,
        compose_from: String,
        compose_msg: Binary,
        amount: Uint128,
        executor: String,
    },
    SetPeer {
        chain_id: u32,
        peer: Option<String>,
    },
    Rescue {
        to: String,
        amount: Coin,
    },
    RescueShares {
        to: String,
        amount: Uint128,
    },
}

#[cw_ownable_query]
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(Option<String>)]
    Peer { chain_id: u32 },
    /// Bridge fee of the return leg of an unstake, `extra_options` as carried by the request.
    #[returns(MessagingFee)]
    QuoteUnstakeReturn {
        to: String,
        amount: Uint128,
        dst_chain: u32,
        extra_options: Binary,
    },
    /// Bridge fee of the return leg of a fast redeem of `shares`, `send_param` as it will be
    /// carried by the compose message. Its amounts are replaced with the net assets.
    #[returns(MessagingFee)]
    QuoteFastRedeemReturn {
        shares: Uint128,
        send_param: SendParam,
    },
}

#[cw_serde]
pub struct MigrateMsg {}
