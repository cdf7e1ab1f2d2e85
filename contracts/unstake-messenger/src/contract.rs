use cosmwasm_std::{
    attr, ensure, entry_point, from_json, to_json_binary, Attribute, BankMsg, Binary, Coin, Deps,
    DepsMut, Env, MessageInfo, Reply, Response, Storage, SubMsg, Uint128, WasmMsg,
};
use hubstake_base::{
    codec::{ExecutorOptions, HubMessage, UnstakeMessage, MSG_TYPE_UNSTAKE},
    error::unstake_messenger::{ContractError, ContractResult},
    msg::{
        transport::{EndpointExecuteMsg, EndpointQueryMsg, MessagingFee, MessagingReceipt},
        unstake_messenger::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg},
    },
    state::unstake_messenger::{
        Config, PendingUnstake, CONFIG, DEFAULT_FEE_BUFFER_BPS, DEFAULT_RECEIVE_GAS,
        ENFORCED_OPTIONS, HUB_PEER, MAX_FEE_BUFFER_BPS, MIN_FEE_BUFFER_BPS, PENDING_UNSTAKE,
        UNSTAKE_REPLY_ID,
    },
};
use hubstake_helpers::answer::{attr_coin, response};

pub const CONTRACT_NAME: &str = concat!("crates.io:hubstake__", env!("CARGO_PKG_NAME"));
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const BPS_DENOMINATOR: u128 = 10_000;

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

    let fee_buffer_bps = msg.fee_buffer_bps.unwrap_or(DEFAULT_FEE_BUFFER_BPS);
    validate_fee_buffer(fee_buffer_bps)?;
    let config = Config {
        endpoint: deps.api.addr_validate(&msg.endpoint)?,
        hub_chain: msg.hub_chain,
        native_denom: msg.native_denom,
        fee_buffer_bps,
        receive_gas: msg.receive_gas.unwrap_or(DEFAULT_RECEIVE_GAS),
    };
    CONFIG.save(deps.storage, &config)?;

    Ok(response(
        "instantiate",
        CONTRACT_NAME,
        [
            attr("owner", owner),
            attr("endpoint", config.endpoint),
            attr("hub_chain", config.hub_chain.to_string()),
            attr("native_denom", config.native_denom),
            attr("fee_buffer_bps", config.fee_buffer_bps.to_string()),
            attr("receive_gas", config.receive_gas.to_string()),
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
        QueryMsg::Peer {} => Ok(to_json_binary(&HUB_PEER.may_load(deps.storage)?)?),
        QueryMsg::EnforcedOptions { msg_type } => Ok(to_json_binary(
            &ENFORCED_OPTIONS
                .may_load(deps.storage, msg_type)?
                .unwrap_or_default(),
        )?),
        QueryMsg::QuoteUnstakeWithReturnValue { user, return_value } => {
            let config = CONFIG.load(deps.storage)?;
            Ok(to_json_binary(&quote_unstake(
                deps,
                &config,
                user,
                return_value,
            )?)?)
        }
        QueryMsg::QuoteUnstakeWithBuffer { user, return_value } => {
            let config = CONFIG.load(deps.storage)?;
            let fee = quote_unstake(deps, &config, user, return_value)?;
            Ok(to_json_binary(&MessagingFee {
                native_fee: fee.native_fee.multiply_ratio(
                    BPS_DENOMINATOR + config.fee_buffer_bps as u128,
                    BPS_DENOMINATOR,
                ),
                alt_fee: fee.alt_fee,
            })?)
        }
    }
}

/// Outbound unstake request for `user`, as sent to the hub peer.
struct UnstakeDispatch {
    peer: String,
    payload: Binary,
    options: Binary,
}

impl UnstakeDispatch {
    fn new(
        storage: &dyn Storage,
        config: &Config,
        user: String,
        return_value: Uint128,
    ) -> ContractResult<Self> {
        let peer = HUB_PEER
            .may_load(storage)?
            .ok_or(ContractError::HubNotConfigured {})?;
        ensure!(
            !return_value.is_zero(),
            ContractError::InvalidReturnTripAllocation {}
        );

        let payload = HubMessage::Unstake(UnstakeMessage {
            user,
            extra_options: Binary::default(),
        });
        // the return value rides as the only native drop so the hub gets exactly that much
        let options = ENFORCED_OPTIONS
            .may_load(storage, payload.msg_type())?
            .unwrap_or_default()
            .combine(&ExecutorOptions {
                receive_gas: config.receive_gas,
                native_drop: return_value,
            })?;

        Ok(UnstakeDispatch {
            peer,
            payload: payload.encode(),
            options: options.encode(),
        })
    }

    fn quote(&self, deps: Deps, config: &Config) -> ContractResult<MessagingFee> {
        Ok(deps.querier.query_wasm_smart(
            &config.endpoint,
            &EndpointQueryMsg::Quote {
                dst_chain: config.hub_chain,
                receiver: self.peer.clone(),
                payload: self.payload.clone(),
                options: self.options.clone(),
                pay_in_alt_token: false,
            },
        )?)
    }
}

fn quote_unstake(
    deps: Deps,
    config: &Config,
    user: String,
    return_value: Uint128,
) -> ContractResult<MessagingFee> {
    UnstakeDispatch::new(deps.storage, config, user, return_value)?.quote(deps, config)
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
        ExecuteMsg::Unstake {
            return_trip_allocation,
        } => execute_unstake(deps, info, return_trip_allocation),
        ExecuteMsg::SetPeer { chain_id, peer } => execute_set_peer(deps, info, chain_id, peer),
        ExecuteMsg::SetEnforcedOptions { msg_type, options } => {
            execute_set_enforced_options(deps, info, msg_type, options)
        }
        ExecuteMsg::SetFeeBuffer { bps } => execute_set_fee_buffer(deps, info, bps),
        ExecuteMsg::UpdateConfig { receive_gas } => {
            execute_update_config(deps, info, receive_gas)
        }
        ExecuteMsg::Rescue { to, amount } => execute_rescue(deps, info, to, amount),
    }
}

fn execute_unstake(
    deps: DepsMut,
    info: MessageInfo,
    return_trip_allocation: Uint128,
) -> ContractResult<Response> {
    ensure!(
        PENDING_UNSTAKE.may_load(deps.storage)?.is_none(),
        ContractError::ReentrantCall {}
    );
    let config = CONFIG.load(deps.storage)?;
    let paid = cw_utils::may_pay(&info, &config.native_denom)?;

    let dispatch = UnstakeDispatch::new(
        deps.storage,
        &config,
        info.sender.to_string(),
        return_trip_allocation,
    )?;
    let fee = dispatch.quote(deps.as_ref(), &config)?;
    ensure!(
        paid >= fee.native_fee,
        ContractError::InsufficientFee {
            required: fee.native_fee,
            provided: paid,
        }
    );

    PENDING_UNSTAKE.save(
        deps.storage,
        &PendingUnstake {
            user: info.sender.clone(),
            paid,
            native_fee: fee.native_fee,
            return_trip_allocation,
        },
    )?;

    let send = WasmMsg::Execute {
        contract_addr: config.endpoint.to_string(),
        msg: to_json_binary(&EndpointExecuteMsg::Send {
            dst_chain: config.hub_chain,
            receiver: dispatch.peer,
            payload: dispatch.payload,
            options: dispatch.options,
            refund_address: info.sender.to_string(),
        })?,
        funds: if paid.is_zero() {
            vec![]
        } else {
            vec![Coin::new(paid.u128(), &config.native_denom)]
        },
    };

    Ok(response(
        "execute-unstake",
        CONTRACT_NAME,
        [
            attr("user", info.sender),
            attr_coin(
                "return_trip_allocation",
                return_trip_allocation,
                &config.native_denom,
            ),
            attr_coin("native_fee", fee.native_fee, &config.native_denom),
            attr_coin("paid", paid, &config.native_denom),
        ],
    )
    .add_submessage(SubMsg::reply_on_success(send, UNSTAKE_REPLY_ID)))
}

fn execute_set_peer(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: u32,
    peer: String,
) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    let config = CONFIG.load(deps.storage)?;
    ensure!(
        chain_id == config.hub_chain,
        ContractError::InvalidChain {
            chain_id,
            hub_chain: config.hub_chain,
        }
    );
    ensure!(!peer.is_empty(), ContractError::InvalidPeer {});
    HUB_PEER.save(deps.storage, &peer)?;

    Ok(response(
        "execute-set-peer",
        CONTRACT_NAME,
        [attr("chain_id", chain_id.to_string()), attr("peer", peer)],
    ))
}

fn execute_set_enforced_options(
    deps: DepsMut,
    info: MessageInfo,
    msg_type: u16,
    options: ExecutorOptions,
) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    ensure!(
        msg_type != MSG_TYPE_UNSTAKE || options.native_drop.is_zero(),
        ContractError::EnforcedNativeDrop {}
    );
    ENFORCED_OPTIONS.save(deps.storage, msg_type, &options)?;

    Ok(response(
        "execute-set-enforced-options",
        CONTRACT_NAME,
        [
            attr("msg_type", msg_type.to_string()),
            attr("receive_gas", options.receive_gas.to_string()),
            attr("native_drop", options.native_drop),
        ],
    ))
}

fn execute_set_fee_buffer(deps: DepsMut, info: MessageInfo, bps: u16) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    validate_fee_buffer(bps)?;
    CONFIG.update(deps.storage, |mut config| -> ContractResult<_> {
        config.fee_buffer_bps = bps;
        Ok(config)
    })?;

    Ok(response(
        "execute-set-fee-buffer",
        CONTRACT_NAME,
        [attr("fee_buffer_bps", bps.to_string())],
    ))
}

fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    receive_gas: Option<u64>,
) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    let mut config = CONFIG.load(deps.storage)?;
    let mut attrs: Vec<Attribute> = vec![];
    if let Some(receive_gas) = receive_gas {
        config.receive_gas = receive_gas;
        attrs.push(attr("receive_gas", receive_gas.to_string()));
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(response("execute-update-config", CONTRACT_NAME, attrs))
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

fn validate_fee_buffer(bps: u16) -> ContractResult<()> {
    ensure!(
        (MIN_FEE_BUFFER_BPS..=MAX_FEE_BUFFER_BPS).contains(&bps),
        ContractError::InvalidFeeBuffer {
            min: MIN_FEE_BUFFER_BPS,
            max: MAX_FEE_BUFFER_BPS,
        }
    );
    Ok(())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> ContractResult<Response> {
    match msg.id {
        UNSTAKE_REPLY_ID => finalize_unstake(deps, msg),
        id => Err(ContractError::UnknownReplyId { id }),
    }
}

fn finalize_unstake(deps: DepsMut, msg: Reply) -> ContractResult<Response> {
    let pending = PENDING_UNSTAKE.load(deps.storage)?;
    PENDING_UNSTAKE.remove(deps.storage);

    let data = cw_utils::parse_reply_execute_data(msg)?
        .data
        .ok_or(ContractError::MissingReceipt {})?;
    let receipt: MessagingReceipt = from_json(data)?;
    deps.api.debug(&format!(
        "WASMDEBUG: unstake sent: user: {} receipt: {:?}",
        pending.user, receipt
    ));
    // the endpoint refunds whatever exceeds the quote to the user
    let refund = pending.paid.checked_sub(pending.native_fee)?;

    Ok(response(
        "reply-unstake-sent",
        CONTRACT_NAME,
        [
            attr("user", pending.user),
            attr("message_id", receipt.message_id.clone()),
            attr("nonce", receipt.nonce.to_string()),
            attr("native_fee", pending.native_fee),
            attr("return_trip_allocation", pending.return_trip_allocation),
            attr("refund", refund),
        ],
    )
    .set_data(to_json_binary(&receipt.message_id)?))
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
