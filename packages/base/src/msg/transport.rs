//! Interface of the messaging transport and of the token bridges riding on it. Both are
//! external contracts; only the messages exchanged with them are declared here.

use crate::codec::SendParam;
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Uint128};

#[cw_serde]
#[derive(Default)]
pub struct MessagingFee {
    pub native_fee: Uint128,
    pub alt_fee: Uint128,
}

/// Returned by the endpoint as the `data` of a `Send`.
#[cw_serde]
pub struct MessagingReceipt {
    pub message_id: String,
    pub nonce: u64,
    pub fee: MessagingFee,
}

/// Source of an inbound message, authenticated by the endpoint.
#[cw_serde]
pub struct Origin {
    pub src_chain: u32,
    pub sender: String,
    pub nonce: u64,
}

/// Built by the bridge once the transferred tokens are credited on this chain.
#[cw_serde]
pub struct ComposeEnvelope {
    pub nonce: u64,
    pub src_chain: u32,
    pub amount: Uint128,
    /// Account that started the transfer on the source chain.
    pub compose_from: String,
    pub compose_msg: Binary,
}

#[cw_serde]
pub enum EndpointExecuteMsg {
    /// Native fee attached as funds, excess goes back to `refund_address`.
    Send {
        dst_chain: u32,
        receiver: String,
        payload: Binary,
        options: Binary,
        refund_address: String,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum EndpointQueryMsg {
    #[returns(MessagingFee)]
    Quote {
        dst_chain: u32,
        receiver: String,
        payload: Binary,
        options: Binary,
        pay_in_alt_token: bool,
    },
}

#[cw_serde]
pub enum BridgeExecuteMsg {
    /// Native fee attached as funds. Asset bridges also take the transferred tokens as funds,
    /// share bridges expect the shares to be transferred to them right before.
    Send {
        send_param: SendParam,
        fee: MessagingFee,
        refund_address: String,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum BridgeQueryMsg {
    #[returns(MessagingFee)]
    QuoteSend {
        send_param: SendParam,
        pay_in_alt_token: bool,
    },
}
