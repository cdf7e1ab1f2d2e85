use cosmwasm_std::{
    attr, ensure, ensure_eq, entry_point, to_json_binary, Addr, Attribute, BankMsg, Binary, Coin,
    Coins, CosmosMsg, Deps, DepsMut, Env, MessageInfo, Reply, Response, SubMsg, SubMsgResult,
    Uint128, WasmMsg,
};
use hubstake_base::{
    codec::{ComposeCommand, ComposeMessage, HubMessage, SendParam, UnstakeMessage},
    error::composer::{ContractError, ContractResult},
    msg::{
        composer::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg},
        transport::{BridgeExecuteMsg, BridgeQueryMsg, ComposeEnvelope, MessagingFee, Origin},
        vault::{ExecuteMsg as VaultExecuteMsg, FastRedeemPreview, QueryMsg as VaultQueryMsg},
    },
    state::{
        composer::{
            AssetKind, Config, PendingCompose, CONFIG, HANDLE_COMPOSE_REPLY_ID, PEERS,
            PENDING_COMPOSE,
        },
        vault::{Config as VaultConfig, CooldownEntry},
    },
};
use hubstake_helpers::answer::{attr_coin, response};

pub const CONTRACT_NAME: &str = concat!("crates.io:hubstake__", env!("CARGO_PKG_NAME"));
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> ContractResult<Response> {
    cw2::set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    let owner = msg.owner.unwrap_or_else(|| info.sender.to_string());
    cw_ownable::initialize_owner(deps.storage, deps.api, Some(owner.as_str()))?;

    let vault = deps.api.addr_validate(&msg.vault)?;
    let vault_config: VaultConfig = deps
        .querier
        .query_wasm_smart(&vault, &VaultQueryMsg::Config {})?;
    let config = Config {
        endpoint: deps.api.addr_validate(&msg.endpoint)?,
        vault,
        asset_bridge: deps.api.addr_validate(&msg.asset_bridge)?,
        share_bridge: deps.api.addr_validate(&msg.share_bridge)?,
        asset_denom: vault_config.asset_denom,
        native_denom: msg.native_denom,
        hub_chain: msg.hub_chain,
    };
    CONFIG.save(deps.storage, &config)?;

    Ok(response(
        "instantiate",
        CONTRACT_NAME,
        [
            attr("owner", owner),
            attr("endpoint", config.endpoint),
            attr("vault", config.vault),
            attr("asset_bridge", config.asset_bridge),
            attr("share_bridge", config.share_bridge),
            attr("asset_denom", config.asset_denom),
            attr("native_denom", config.native_denom),
            attr("hub_chain", config.hub_chain.to_string()),
        ],
    ))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> ContractResult<Binary> {
    match msg {
        QueryMsg::Config {} => Ok(to_json_binary(&CONFIG.load(deps.storage)?)?),
        QueryMsg::Ownership {} => Ok(to_json_binary(&cw_ownable::get_ownership(
            deps.storage,
        )?)?),
        QueryMsg::Peer { chain_id } => {
            Ok(to_json_binary(&PEERS.may_load(deps.storage, chain_id)?)?)
        }
        QueryMsg::QuoteUnstakeReturn {
            to,
            amount,
            dst_chain,
            extra_options,
        } => {
            let config = CONFIG.load(deps.storage)?;
            let send_param = unstake_send_param(dst_chain, to, amount, extra_options);
            Ok(to_json_binary(&quote_asset_return(deps, &config, send_param)?)?)
        }
        QueryMsg::QuoteFastRedeemReturn { shares, send_param } => {
            let config = CONFIG.load(deps.storage)?;
            let preview: FastRedeemPreview = deps.querier.query_wasm_smart(
                &config.vault,
                &VaultQueryMsg::PreviewFastRedeem { shares },
            )?;
            let send_param = fast_redeem_send_param(send_param, preview.net_assets);
            Ok(to_json_binary(&quote_asset_return(deps, &config, send_param)?)?)
        }
    }
}

/// Return leg of an unstake: nothing composed on arrival, the full amount must land.
fn unstake_send_param(
    dst_chain: u32,
    to: String,
    amount: Uint128,
    extra_options: Binary,
) -> SendParam {
    SendParam {
        dst_chain,
        to,
        amount,
        min_amount: amount,
        extra_options,
        compose_msg: Binary::default(),
        command: Binary::default(),
    }
}

/// Return leg of a fast redeem: the send param of the compose message carrying exactly the
/// net assets.
fn fast_redeem_send_param(mut send_param: SendParam, net_assets: Uint128) -> SendParam {
    send_param.amount = net_assets;
    send_param.min_amount = net_assets;
    send_param
}

fn quote_asset_return(
    deps: Deps,
    config: &Config,
    send_param: SendParam,
) -> ContractResult<MessagingFee> {
    if send_param.dst_chain == config.hub_chain {
        return Ok(MessagingFee::default());
    }
    Ok(deps.querier.query_wasm_smart(
        &config.asset_bridge,
        &BridgeQueryMsg::QuoteSend {
            send_param,
            pay_in_alt_token: false,
        },
    )?)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> ContractResult<Response> {
    match msg {
        ExecuteMsg::UpdateOwnership(action) => {
            cw_ownable::update_ownership(deps, &env.block, &info.sender, action)?;
            Ok(response::<(&str, &str), _>(
                "execute-update-ownership",
                CONTRACT_NAME,
                [],
            ))
        }
        ExecuteMsg::Receive {
            origin,
            message_id,
            payload,
        } => execute_receive(deps, env, info, origin, message_id, payload),
        ExecuteMsg::Compose {
            from,
            message_id,
            message,
            executor,
        } => execute_compose(deps, env, info, from, message_id, message, executor),
        ExecuteMsg::HandleCompose {
            asset,
            compose_from,
            compose_msg,
            amount,
            executor,
        } => execute_handle_compose(
            deps,
            env,
            info,
            asset,
            compose_from,
            compose_msg,
            amount,
            executor,
        ),
        ExecuteMsg::SetPeer { chain_id, peer } => execute_set_peer(deps, info, chain_id, peer),
        ExecuteMsg::Rescue { to, amount } => execute_rescue(deps, info, to, amount),
        ExecuteMsg::RescueShares { to, amount } => {
            execute_rescue_shares(deps, info, to, amount)
        }
    }
}

fn execute_receive(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    origin: Origin,
    message_id: String,
    payload: Binary,
) -> ContractResult<Response> {
    let config = CONFIG.load(deps.storage)?;
    ensure_eq!(
        info.sender,
        config.endpoint,
        ContractError::OnlyEndpoint {
            sender: info.sender.to_string()
        }
    );
    ensure!(origin.src_chain != 0, ContractError::InvalidOrigin {});
    let peer = PEERS
        .may_load(deps.storage, origin.src_chain)?
        .ok_or(ContractError::NoPeer {
            chain_id: origin.src_chain,
        })?;
    ensure_eq!(
        peer,
        origin.sender,
        ContractError::OnlyPeer {
            chain_id: origin.src_chain,
            sender: origin.sender
        }
    );
    let native_value = cw_utils::may_pay(&info, &config.native_denom)?;

    let HubMessage::Unstake(UnstakeMessage {
        user,
        extra_options,
    }) = HubMessage::decode(&payload)?;
    ensure!(!user.is_empty(), ContractError::InvalidZeroAddress {});

    let cooldown: CooldownEntry = deps.querier.query_wasm_smart(
        &config.vault,
        &VaultQueryMsg::Cooldown {
            redeemer: user.clone(),
        },
    )?;
    let amount = cooldown.underlying_amount;
    ensure!(!amount.is_zero(), ContractError::NoAssetsToUnstake {});

    let mut msgs = vec![CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: config.vault.to_string(),
        msg: to_json_binary(&VaultExecuteMsg::UnstakeThroughComposer {
            redeemer: user.clone(),
        })?,
        funds: vec![],
    })];
    // excess return fee stays with the composer, the owner can rescue it
    msgs.extend(send_out(
        &config,
        AssetKind::Asset,
        unstake_send_param(origin.src_chain, user.clone(), amount, extra_options),
        native_value,
        &env.contract.address,
    )?);

    Ok(response(
        "unstake-processed",
        CONTRACT_NAME,
        [
            attr("user", user),
            attr("src_chain", origin.src_chain.to_string()),
            attr_coin("amount", amount, &config.asset_denom),
            attr("message_id", message_id),
        ],
    )
    .add_messages(msgs))
}

fn execute_compose(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    from: String,
    message_id: String,
    message: ComposeEnvelope,
    executor: String,
) -> ContractResult<Response> {
    let config = CONFIG.load(deps.storage)?;
    ensure_eq!(
        info.sender,
        config.endpoint,
        ContractError::OnlyEndpoint {
            sender: info.sender.to_string()
        }
    );
    let asset = if from == config.asset_bridge.as_str() {
        AssetKind::Asset
    } else if from == config.share_bridge.as_str() {
        AssetKind::Share
    } else {
        return Err(ContractError::OnlyValidComposeCaller { from });
    };
    let executor = deps.api.addr_validate(&executor)?;
    let native_value = cw_utils::may_pay(&info, &config.native_denom)?;

    PENDING_COMPOSE.save(
        deps.storage,
        &PendingCompose {
            message_id: message_id.clone(),
            asset,
            src_chain: message.src_chain,
            compose_from: message.compose_from.clone(),
            amount: message.amount,
            native_value,
            executor: executor.clone(),
        },
    )?;

    let handle_compose = WasmMsg::Execute {
        contract_addr: env.contract.address.to_string(),
        msg: to_json_binary(&ExecuteMsg::HandleCompose {
            asset,
            compose_from: message.compose_from.clone(),
            compose_msg: message.compose_msg,
            amount: message.amount,
            executor: executor.to_string(),
        })?,
        funds: native_coins(&config, native_value),
    };

    Ok(response(
        "execute-compose",
        CONTRACT_NAME,
        [
            attr("message_id", message_id),
            attr("asset", asset.to_string()),
            attr("src_chain", message.src_chain.to_string()),
            attr("compose_from", message.compose_from),
            attr("amount", message.amount),
            attr_coin("native_value", native_value, &config.native_denom),
        ],
    )
    .add_submessage(SubMsg::reply_always(
        handle_compose,
        HANDLE_COMPOSE_REPLY_ID,
    )))
}

#[allow(clippy::too_many_arguments)]
fn execute_handle_compose(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    asset: AssetKind,
    compose_from: String,
    compose_msg: Binary,
    amount: Uint128,
    executor: String,
) -> ContractResult<Response> {
    ensure_eq!(
        info.sender,
        env.contract.address,
        ContractError::OnlySelf {}
    );
    let config = CONFIG.load(deps.storage)?;
    let executor = deps.api.addr_validate(&executor)?;
    let native_value = cw_utils::may_pay(&info, &config.native_denom)?;

    let message = ComposeMessage::decode(&compose_msg)?;
    ensure!(
        native_value >= message.min_msg_value,
        ContractError::InsufficientMsgValue {
            required: message.min_msg_value,
            provided: native_value,
        }
    );

    match asset {
        AssetKind::Asset => deposit_and_send(
            deps.as_ref(),
            &config,
            compose_from,
            message.send_param,
            amount,
            native_value,
            &executor,
        ),
        AssetKind::Share => match message.command() {
            Some(ComposeCommand::InitiateCooldown) => {
                initiate_cooldown(&config, compose_from, amount, native_value, &executor)
            }
            Some(ComposeCommand::FastRedeem) => fast_redeem_and_send(
                deps.as_ref(),
                &config,
                compose_from,
                message.send_param,
                amount,
                native_value,
                &executor,
            ),
            None => Err(ContractError::InitiateCooldownRequired {}),
        },
    }
}

fn deposit_and_send(
    deps: Deps,
    config: &Config,
    compose_from: String,
    mut send_param: SendParam,
    amount: Uint128,
    native_value: Uint128,
    executor: &Addr,
) -> ContractResult<Response> {
    ensure_no_local_value(config, &send_param, native_value)?;
    let shares: Uint128 = deps.querier.query_wasm_smart(
        &config.vault,
        &VaultQueryMsg::PreviewDeposit { assets: amount },
    )?;
    ensure!(
        shares >= send_param.min_amount,
        ContractError::SlippageExceeded {
            amount: shares,
            min_amount: send_param.min_amount,
        }
    );
    send_param.amount = shares;

    let attrs = vec![
        attr("compose_from", compose_from),
        attr_coin("assets", amount, &config.asset_denom),
        attr("shares", shares),
        attr("dst_chain", send_param.dst_chain.to_string()),
        attr("to", send_param.to.clone()),
    ];
    let mut msgs = vec![CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: config.vault.to_string(),
        msg: to_json_binary(&VaultExecuteMsg::Deposit { receiver: None })?,
        funds: vec![Coin::new(amount.u128(), &config.asset_denom)],
    })];
    msgs.extend(send_out(
        config,
        AssetKind::Share,
        send_param,
        native_value,
        executor,
    )?);

    Ok(response("deposit-and-send", CONTRACT_NAME, attrs).add_messages(msgs))
}

fn initiate_cooldown(
    config: &Config,
    compose_from: String,
    shares: Uint128,
    native_value: Uint128,
    executor: &Addr,
) -> ContractResult<Response> {
    let mut msgs = vec![CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: config.vault.to_string(),
        msg: to_json_binary(&VaultExecuteMsg::CooldownSharesByComposer {
            shares,
            redeemer: compose_from.clone(),
        })?,
        funds: vec![],
    })];
    // no return leg, the attached value goes back to whoever paid it
    if !native_value.is_zero() {
        msgs.push(CosmosMsg::Bank(BankMsg::Send {
            to_address: executor.to_string(),
            amount: native_coins(config, native_value),
        }));
    }

    Ok(response(
        "cooldown-initiated",
        CONTRACT_NAME,
        [attr("redeemer", compose_from), attr("shares", shares)],
    )
    .add_messages(msgs))
}

fn fast_redeem_and_send(
    deps: Deps,
    config: &Config,
    compose_from: String,
    send_param: SendParam,
    shares: Uint128,
    native_value: Uint128,
    executor: &Addr,
) -> ContractResult<Response> {
    ensure_no_local_value(config, &send_param, native_value)?;
    let preview: FastRedeemPreview = deps.querier.query_wasm_smart(
        &config.vault,
        &VaultQueryMsg::PreviewFastRedeem { shares },
    )?;
    ensure!(
        !preview.net_assets.is_zero(),
        ContractError::NoAssetsToRedeem {}
    );
    let send_param = fast_redeem_send_param(send_param, preview.net_assets);

    let attrs = vec![
        attr("owner", compose_from.clone()),
        attr("shares", shares),
        attr_coin("net_assets", preview.net_assets, &config.asset_denom),
        attr_coin("fee", preview.fee_assets, &config.asset_denom),
        attr("dst_chain", send_param.dst_chain.to_string()),
        attr("to", send_param.to.clone()),
    ];
    let mut msgs = vec![CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: config.vault.to_string(),
        msg: to_json_binary(&VaultExecuteMsg::FastRedeemThroughComposer {
            shares,
            crosschain_receiver: send_param.to.clone(),
            owner: compose_from,
        })?,
        funds: vec![],
    })];
    msgs.extend(send_out(
        config,
        AssetKind::Asset,
        send_param,
        native_value,
        executor,
    )?);

    Ok(response("fast-redeem-processed", CONTRACT_NAME, attrs).add_messages(msgs))
}

fn ensure_no_local_value(
    config: &Config,
    send_param: &SendParam,
    native_value: Uint128,
) -> ContractResult<()> {
    ensure!(
        send_param.dst_chain != config.hub_chain || native_value.is_zero(),
        ContractError::NoMsgValueExpected {}
    );
    Ok(())
}

/// Moves `send_param.amount` of `asset` held by the composer to `send_param.to`. Local
/// destinations are paid directly and any native value goes back to `refund_address`;
/// remote ones go through the matching bridge with `native_fee` as the transport fee.
fn send_out(
    config: &Config,
    asset: AssetKind,
    send_param: SendParam,
    native_fee: Uint128,
    refund_address: &Addr,
) -> ContractResult<Vec<CosmosMsg>> {
    let mut msgs: Vec<CosmosMsg> = vec![];
    if send_param.dst_chain == config.hub_chain {
        msgs.push(match asset {
            AssetKind::Asset => CosmosMsg::Bank(BankMsg::Send {
                to_address: send_param.to,
                amount: vec![Coin::new(send_param.amount.u128(), &config.asset_denom)],
            }),
            AssetKind::Share => CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: config.vault.to_string(),
                msg: to_json_binary(&VaultExecuteMsg::Transfer {
                    recipient: send_param.to,
                    amount: send_param.amount,
                })?,
                funds: vec![],
            }),
        });
        if !native_fee.is_zero() {
            msgs.push(CosmosMsg::Bank(BankMsg::Send {
                to_address: refund_address.to_string(),
                amount: native_coins(config, native_fee),
            }));
        }
        return Ok(msgs);
    }

    let mut funds = Coins::default();
    funds.add(Coin::new(native_fee.u128(), &config.native_denom))?;
    let bridge = match asset {
        AssetKind::Asset => {
            funds.add(Coin::new(send_param.amount.u128(), &config.asset_denom))?;
            &config.asset_bridge
        }
        AssetKind::Share => {
            msgs.push(CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: config.vault.to_string(),
                msg: to_json_binary(&VaultExecuteMsg::Transfer {
                    recipient: config.share_bridge.to_string(),
                    amount: send_param.amount,
                })?,
                funds: vec![],
            }));
            &config.share_bridge
        }
    };
    msgs.push(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: bridge.to_string(),
        msg: to_json_binary(&BridgeExecuteMsg::Send {
            send_param,
            fee: MessagingFee {
                native_fee,
                alt_fee: Uint128::zero(),
            },
            refund_address: refund_address.to_string(),
        })?,
        funds: funds.into_vec(),
    }));
    Ok(msgs)
}

fn native_coins(config: &Config, amount: Uint128) -> Vec<Coin> {
    if amount.is_zero() {
        return vec![];
    }
    vec![Coin::new(amount.u128(), &config.native_denom)]
}

fn execute_set_peer(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: u32,
    peer: Option<String>,
) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    let mut attrs = vec![attr("chain_id", chain_id.to_string())];
    match peer {
        Some(peer) => {
            ensure!(!peer.is_empty(), ContractError::InvalidZeroAddress {});
            PEERS.save(deps.storage, chain_id, &peer)?;
            attrs.push(attr("peer", peer));
        }
        None => PEERS.remove(deps.storage, chain_id),
    }
    Ok(response("execute-set-peer", CONTRACT_NAME, attrs))
}

fn execute_rescue(
    deps: DepsMut,
    info: MessageInfo,
    to: String,
    amount: Coin,
) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    let to = deps.api.addr_validate(&to)?;
    let attrs: Vec<Attribute> = vec![
        attr("to", to.as_str()),
        attr_coin("amount", amount.amount, &amount.denom),
    ];
    Ok(
        response("execute-rescue", CONTRACT_NAME, attrs).add_message(BankMsg::Send {
            to_address: to.into_string(),
            amount: vec![amount],
        }),
    )
}

fn execute_rescue_shares(
    deps: DepsMut,
    info: MessageInfo,
    to: String,
    amount: Uint128,
) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    let config = CONFIG.load(deps.storage)?;
    let to = deps.api.addr_validate(&to)?;
    Ok(response(
        "execute-rescue-shares",
        CONTRACT_NAME,
        [attr("to", to.as_str()), attr("amount", amount.to_string())],
    )
    .add_message(WasmMsg::Execute {
        contract_addr: config.vault.to_string(),
        msg: to_json_binary(&VaultExecuteMsg::Transfer {
            recipient: to.into_string(),
            amount,
        })?,
        funds: vec![],
    }))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> ContractResult<Response> {
    match msg.id {
        HANDLE_COMPOSE_REPLY_ID => handle_compose_reply(deps, msg.result),
        id => Err(ContractError::UnknownReplyId { id }),
    }
}

/// Closes a compose. A failed handler is compensated by sending everything the bridge credited
/// back to the account that started the transfer, on the chain it came from.
fn handle_compose_reply(deps: DepsMut, result: SubMsgResult) -> ContractResult<Response> {
    let pending = PENDING_COMPOSE.load(deps.storage)?;
    PENDING_COMPOSE.remove(deps.storage);

    match result {
        SubMsgResult::Ok(_) => Ok(response(
            "compose-sent",
            CONTRACT_NAME,
            [
                attr("message_id", pending.message_id),
                attr("asset", pending.asset.to_string()),
            ],
        )),
        SubMsgResult::Err(err) => {
            deps.api.debug(&format!(
                "WASMDEBUG: compose {} failed: {}",
                pending.message_id, err
            ));
            let config = CONFIG.load(deps.storage)?;
            let send_param = SendParam {
                dst_chain: pending.src_chain,
                to: pending.compose_from.clone(),
                amount: pending.amount,
                min_amount: Uint128::zero(),
                extra_options: Binary::default(),
                compose_msg: Binary::default(),
                command: Binary::default(),
            };
            let msgs = send_out(
                &config,
                pending.asset,
                send_param,
                pending.native_value,
                &pending.executor,
            )?;
            Ok(response(
                "compose-refunded",
                CONTRACT_NAME,
                [
                    attr("message_id", pending.message_id),
                    attr("asset", pending.asset.to_string()),
                    attr("src_chain", pending.src_chain.to_string()),
                    attr("compose_from", pending.compose_from),
                    attr("amount", pending.amount),
                    attr("reason", err),
                ],
            )
            .add_messages(msgs))
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> ContractResult<Response> {
    let contract_version_metadata = cw2::get_contract_version(deps.storage)?;
    let storage_contract_name = contract_version_metadata.contract.as_str();
    if storage_contract_name != CONTRACT_NAME {
        return Err(ContractError::MigrationError {
            storage_contract_name: storage_contract_name.to_string(),
            contract_name: CONTRACT_NAME.to_string(),
        });
    }

    let storage_version: semver::Version = contract_version_metadata.version.parse()?;
    let version: semver::Version = CONTRACT_VERSION.parse()?;

    if storage_version < version {
        cw2::set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    }

    Ok(Response::new())
}

