use cosmwasm_std::{
    attr, coins, ensure, entry_point, to_json_binary, Addr, Api, Attribute, BankMsg, Binary,
    Decimal, Deps, DepsMut, Env, MessageInfo, Order, Response, StdResult, Storage, Uint128,
};
use hubstake_base::{
    error::vault::{ContractError, ContractResult},
    msg::vault::{
        ConfigOptional, ExecuteMsg, FastRedeemPreview, InstantiateMsg, MigrateMsg, QueryMsg,
        VaultStateResponse,
    },
    state::vault::{
        Config, CooldownEntry, BALANCES, BPS_DENOMINATOR, COMPOSERS, CONFIG, COOLDOWNS,
        COOLDOWN_ASSETS, MAX_COOLDOWN_DURATION, MAX_FAST_REDEEM_FEE_BPS, MIN_FAST_REDEEM_FEE_BPS,
        TOTAL_ASSETS, TOTAL_SHARES,
    },
};
use hubstake_helpers::{
    answer::{attr_coin, response, response_with_data},
    math::{mul_div, Rounding},
};

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

    let config = Config {
        asset_denom: msg.asset_denom,
        treasury: deps.api.addr_validate(&msg.treasury)?,
        cooldown_duration: msg.cooldown_duration,
        fast_redeem_enabled: msg.fast_redeem_enabled,
        fast_redeem_fee_bps: msg.fast_redeem_fee_bps,
    };
    validate_config(&config)?;
    CONFIG.save(deps.storage, &config)?;
    TOTAL_ASSETS.save(deps.storage, &Uint128::zero())?;
    TOTAL_SHARES.save(deps.storage, &Uint128::zero())?;
    COOLDOWN_ASSETS.save(deps.storage, &Uint128::zero())?;

    Ok(response(
        "instantiate",
        CONTRACT_NAME,
        [
            attr("owner", owner),
            attr("asset_denom", config.asset_denom),
            attr("treasury", config.treasury),
            attr("cooldown_duration", config.cooldown_duration.to_string()),
            attr("fast_redeem_enabled", config.fast_redeem_enabled.to_string()),
            attr("fast_redeem_fee_bps", config.fast_redeem_fee_bps.to_string()),
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
        QueryMsg::Balance { address } => {
            let address = deps.api.addr_validate(&address)?;
            Ok(to_json_binary(&balance_of(deps.storage, &address)?)?)
        }
        QueryMsg::VaultState {} => query_vault_state(deps),
        QueryMsg::Cooldown { redeemer } => {
            let entry = COOLDOWNS
                .may_load(deps.storage, &redeemer)?
                .unwrap_or_default();
            Ok(to_json_binary(&entry)?)
        }
        QueryMsg::PreviewDeposit { assets } => Ok(to_json_binary(&convert_to_shares(
            deps.storage,
            assets,
            Rounding::Floor,
        )?)?),
        QueryMsg::PreviewRedeem { shares } => Ok(to_json_binary(&convert_to_assets(
            deps.storage,
            shares,
            Rounding::Floor,
        )?)?),
        QueryMsg::PreviewWithdraw { assets } => Ok(to_json_binary(&convert_to_shares(
            deps.storage,
            assets,
            Rounding::Ceil,
        )?)?),
        QueryMsg::PreviewFastRedeem { shares } => {
            let config = CONFIG.load(deps.storage)?;
            let gross = convert_to_assets(deps.storage, shares, Rounding::Floor)?;
            Ok(to_json_binary(&preview_fast_exit(&config, shares, gross))?)
        }
        QueryMsg::PreviewFastWithdraw { assets } => {
            let config = CONFIG.load(deps.storage)?;
            let shares = convert_to_shares(deps.storage, assets, Rounding::Ceil)?;
            Ok(to_json_binary(&preview_fast_exit(&config, shares, assets))?)
        }
        QueryMsg::IsComposer { address } => {
            let address = deps.api.addr_validate(&address)?;
            Ok(to_json_binary(&is_composer(deps.storage, &address)?)?)
        }
        QueryMsg::Composers {} => {
            let composers = COMPOSERS
                .keys(deps.storage, None, None, Order::Ascending)
                .map(|key| key.map(|addr| addr.into_string()))
                .collect::<StdResult<Vec<_>>>()?;
            Ok(to_json_binary(&composers)?)
        }
    }
}

fn query_vault_state(deps: Deps) -> ContractResult<Binary> {
    let total_assets = TOTAL_ASSETS.load(deps.storage)?;
    let total_shares = TOTAL_SHARES.load(deps.storage)?;
    Ok(to_json_binary(&VaultStateResponse {
        total_assets,
        total_shares,
        cooldown_assets: COOLDOWN_ASSETS.load(deps.storage)?,
        exchange_rate: Decimal::from_ratio(
            total_assets + Uint128::one(),
            total_shares + Uint128::one(),
        ),
    })?)
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
        ExecuteMsg::Deposit { receiver } => execute_deposit(deps, info, receiver),
        ExecuteMsg::Redeem { shares, receiver } => execute_redeem(deps, info, shares, receiver),
        ExecuteMsg::Withdraw { assets, receiver } => {
            execute_withdraw(deps, info, assets, receiver)
        }
        ExecuteMsg::Transfer { recipient, amount } => {
            execute_transfer(deps, info, recipient, amount)
        }
        ExecuteMsg::CooldownShares { shares } => {
            let redeemer = info.sender.to_string();
            execute_cooldown_shares(deps, env, info, shares, redeemer)
        }
        ExecuteMsg::CooldownAssets { assets } => {
            let redeemer = info.sender.to_string();
            execute_cooldown_assets(deps, env, info, assets, redeemer)
        }
        ExecuteMsg::Unstake { receiver } => execute_unstake(deps, env, info, receiver),
        ExecuteMsg::FastRedeem { shares, receiver } => {
            execute_fast_redeem(deps, info, shares, receiver)
        }
        ExecuteMsg::FastWithdraw { assets, receiver } => {
            execute_fast_withdraw(deps, info, assets, receiver)
        }
        ExecuteMsg::CooldownSharesByComposer { shares, redeemer } => {
            assert_composer(deps.storage, &info.sender)?;
            ensure!(!redeemer.is_empty(), ContractError::InvalidZeroAddress {});
            execute_cooldown_shares(deps, env, info, shares, redeemer)
        }
        ExecuteMsg::CooldownAssetsByComposer { assets, redeemer } => {
            assert_composer(deps.storage, &info.sender)?;
            ensure!(!redeemer.is_empty(), ContractError::InvalidZeroAddress {});
            execute_cooldown_assets(deps, env, info, assets, redeemer)
        }
        ExecuteMsg::UnstakeThroughComposer { redeemer } => {
            execute_unstake_through_composer(deps, env, info, redeemer)
        }
        ExecuteMsg::FastRedeemThroughComposer {
            shares,
            crosschain_receiver,
            owner,
        } => execute_fast_redeem_through_composer(deps, info, shares, crosschain_receiver, owner),
        ExecuteMsg::FastWithdrawThroughComposer {
            assets,
            crosschain_receiver,
            owner,
        } => {
            execute_fast_withdraw_through_composer(deps, info, assets, crosschain_receiver, owner)
        }
        ExecuteMsg::AddRewards {} => execute_add_rewards(deps, info),
        ExecuteMsg::UpdateConfig { new_config } => {
            execute_update_config(deps, info, *new_config)
        }
        ExecuteMsg::GrantComposer { address } => execute_grant_composer(deps, info, address),
        ExecuteMsg::RevokeComposer { address } => execute_revoke_composer(deps, info, address),
    }
}

fn execute_deposit(
    deps: DepsMut,
    info: MessageInfo,
    receiver: Option<String>,
) -> ContractResult<Response> {
    let config = CONFIG.load(deps.storage)?;
    let assets = cw_utils::must_pay(&info, &config.asset_denom)?;
    let receiver = receiver_or_sender(deps.api, receiver, &info.sender)?;

    let shares = convert_to_shares(deps.storage, assets, Rounding::Floor)?;
    ensure!(!shares.is_zero(), ContractError::InvalidZeroAmount {});
    mint_shares(deps.storage, &receiver, shares)?;
    TOTAL_ASSETS.update(deps.storage, |total| -> StdResult<_> {
        Ok(total.checked_add(assets)?)
    })?;

    Ok(response_with_data(
        "execute-deposit",
        CONTRACT_NAME,
        [
            attr("sender", info.sender),
            attr("receiver", receiver),
            attr_coin("assets", assets, &config.asset_denom),
            attr("shares", shares),
        ],
        &shares,
    )?)
}

fn execute_redeem(
    deps: DepsMut,
    info: MessageInfo,
    shares: Uint128,
    receiver: Option<String>,
) -> ContractResult<Response> {
    let config = CONFIG.load(deps.storage)?;
    ensure!(
        !config.cooldown_enabled(),
        ContractError::OperationNotAllowed {}
    );
    let receiver = receiver_or_sender(deps.api, receiver, &info.sender)?;
    let assets = redeem_shares(deps.storage, &info.sender, shares)?;

    Ok(response_with_data(
        "execute-redeem",
        CONTRACT_NAME,
        [
            attr("owner", info.sender.as_str()),
            attr("receiver", receiver.as_str()),
            attr("shares", shares),
            attr_coin("assets", assets, &config.asset_denom),
        ],
        &assets,
    )?
    .add_message(BankMsg::Send {
        to_address: receiver.into_string(),
        amount: coins(assets.u128(), config.asset_denom),
    }))
}

fn execute_withdraw(
    deps: DepsMut,
    info: MessageInfo,
    assets: Uint128,
    receiver: Option<String>,
) -> ContractResult<Response> {
    let config = CONFIG.load(deps.storage)?;
    ensure!(
        !config.cooldown_enabled(),
        ContractError::OperationNotAllowed {}
    );
    let receiver = receiver_or_sender(deps.api, receiver, &info.sender)?;
    let shares = withdraw_assets(deps.storage, &info.sender, assets)?;

    Ok(response_with_data(
        "execute-withdraw",
        CONTRACT_NAME,
        [
            attr("owner", info.sender.as_str()),
            attr("receiver", receiver.as_str()),
            attr("shares", shares),
            attr_coin("assets", assets, &config.asset_denom),
        ],
        &shares,
    )?
    .add_message(BankMsg::Send {
        to_address: receiver.into_string(),
        amount: coins(assets.u128(), config.asset_denom),
    }))
}

fn execute_transfer(
    deps: DepsMut,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
) -> ContractResult<Response> {
    ensure!(!amount.is_zero(), ContractError::InvalidZeroAmount {});
    let recipient = deps.api.addr_validate(&recipient)?;

    let balance = balance_of(deps.storage, &info.sender)?;
    ensure!(
        amount <= balance,
        ContractError::ExcessiveRedeemAmount {
            requested: amount,
            available: balance,
        }
    );
    save_balance(deps.storage, &info.sender, balance - amount)?;
    let recipient_balance = balance_of(deps.storage, &recipient)?;
    save_balance(deps.storage, &recipient, recipient_balance.checked_add(amount)?)?;

    Ok(response(
        "execute-transfer",
        CONTRACT_NAME,
        [
            attr("from", info.sender),
            attr("to", recipient),
            attr("amount", amount),
        ],
    ))
}

/// Burns `shares` of the sender and opens or extends the cooldown of `redeemer`.
/// Self-service callers pass themselves as `redeemer`.
fn execute_cooldown_shares(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    shares: Uint128,
    redeemer: String,
) -> ContractResult<Response> {
    let config = CONFIG.load(deps.storage)?;
    ensure!(
        config.cooldown_enabled(),
        ContractError::OperationNotAllowed {}
    );
    let assets = redeem_shares(deps.storage, &info.sender, shares)?;
    let entry = open_cooldown(deps.storage, &env, &config, &redeemer, assets)?;

    Ok(response_with_data(
        "execute-cooldown-shares",
        CONTRACT_NAME,
        cooldown_attrs(&info.sender, &redeemer, shares, assets, &entry),
        &assets,
    )?)
}

fn execute_cooldown_assets(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    assets: Uint128,
    redeemer: String,
) -> ContractResult<Response> {
    let config = CONFIG.load(deps.storage)?;
    ensure!(
        config.cooldown_enabled(),
        ContractError::OperationNotAllowed {}
    );
    let shares = withdraw_assets(deps.storage, &info.sender, assets)?;
    let entry = open_cooldown(deps.storage, &env, &config, &redeemer, assets)?;

    Ok(response_with_data(
        "execute-cooldown-assets",
        CONTRACT_NAME,
        cooldown_attrs(&info.sender, &redeemer, shares, assets, &entry),
        &shares,
    )?)
}

fn cooldown_attrs(
    owner: &Addr,
    redeemer: &str,
    shares: Uint128,
    assets: Uint128,
    entry: &CooldownEntry,
) -> Vec<Attribute> {
    vec![
        attr("owner", owner.as_str()),
        attr("redeemer", redeemer),
        attr("shares", shares),
        attr("assets", assets),
        attr("cooldown_end", entry.cooldown_end.to_string()),
        attr("underlying_amount", entry.underlying_amount),
    ]
}

fn execute_unstake(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    receiver: Option<String>,
) -> ContractResult<Response> {
    let config = CONFIG.load(deps.storage)?;
    let receiver = receiver_or_sender(deps.api, receiver, &info.sender)?;
    let assets = claim_cooldown(deps.storage, &env, info.sender.as_str())?;

    Ok(response_with_data(
        "execute-unstake",
        CONTRACT_NAME,
        [
            attr("redeemer", info.sender.as_str()),
            attr("receiver", receiver.as_str()),
            attr_coin("assets", assets, &config.asset_denom),
        ],
        &assets,
    )?
    .add_message(BankMsg::Send {
        to_address: receiver.into_string(),
        amount: coins(assets.u128(), config.asset_denom),
    }))
}

fn execute_unstake_through_composer(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    redeemer: String,
) -> ContractResult<Response> {
    assert_composer(deps.storage, &info.sender)?;
    let config = CONFIG.load(deps.storage)?;
    ensure!(!redeemer.is_empty(), ContractError::InvalidZeroAddress {});
    let assets = claim_cooldown(deps.storage, &env, &redeemer)?;

    Ok(response_with_data(
        "execute-unstake-through-composer",
        CONTRACT_NAME,
        [
            attr("composer", info.sender.as_str()),
            attr("redeemer", redeemer),
            attr_coin("assets", assets, &config.asset_denom),
        ],
        &assets,
    )?
    .add_message(BankMsg::Send {
        to_address: info.sender.into_string(),
        amount: coins(assets.u128(), config.asset_denom),
    }))
}

fn execute_fast_redeem(
    deps: DepsMut,
    info: MessageInfo,
    shares: Uint128,
    receiver: Option<String>,
) -> ContractResult<Response> {
    let config = CONFIG.load(deps.storage)?;
    ensure!(
        config.fast_redeem_enabled,
        ContractError::FastRedeemDisabled {}
    );
    let receiver = receiver_or_sender(deps.api, receiver, &info.sender)?;
    let gross = redeem_shares(deps.storage, &info.sender, shares)?;
    let (fee, net) = split_fast_redeem_fee(&config, gross)?;

    let attrs = fast_exit_attrs(&config, &info.sender, receiver.as_str(), shares, gross, fee);
    Ok(
        response_with_data("execute-fast-redeem", CONTRACT_NAME, attrs, &net)?
            .add_messages(fast_exit_msgs(&config, &receiver, fee, net)),
    )
}

fn execute_fast_withdraw(
    deps: DepsMut,
    info: MessageInfo,
    assets: Uint128,
    receiver: Option<String>,
) -> ContractResult<Response> {
    let config = CONFIG.load(deps.storage)?;
    ensure!(
        config.fast_redeem_enabled,
        ContractError::FastRedeemDisabled {}
    );
    let receiver = receiver_or_sender(deps.api, receiver, &info.sender)?;
    let shares = withdraw_assets(deps.storage, &info.sender, assets)?;
    let (fee, net) = split_fast_redeem_fee(&config, assets)?;

    let attrs = fast_exit_attrs(&config, &info.sender, receiver.as_str(), shares, assets, fee);
    Ok(
        response_with_data("execute-fast-withdraw", CONTRACT_NAME, attrs, &shares)?
            .add_messages(fast_exit_msgs(&config, &receiver, fee, net)),
    )
}

fn execute_fast_redeem_through_composer(
    deps: DepsMut,
    info: MessageInfo,
    shares: Uint128,
    crosschain_receiver: String,
    owner: String,
) -> ContractResult<Response> {
    assert_composer(deps.storage, &info.sender)?;
    let config = CONFIG.load(deps.storage)?;
    ensure!(
        config.fast_redeem_enabled,
        ContractError::FastRedeemDisabled {}
    );
    ensure!(
        !crosschain_receiver.is_empty() && !owner.is_empty(),
        ContractError::InvalidZeroAddress {}
    );
    let gross = redeem_shares(deps.storage, &info.sender, shares)?;
    let (fee, net) = split_fast_redeem_fee(&config, gross)?;

    let mut attrs =
        fast_exit_attrs(&config, &info.sender, &crosschain_receiver, shares, gross, fee);
    attrs.push(attr("owner", owner));
    Ok(response_with_data(
        "execute-fast-redeem-through-composer",
        CONTRACT_NAME,
        attrs,
        &net,
    )?
    .add_messages(fast_exit_msgs(&config, &info.sender, fee, net)))
}

fn execute_fast_withdraw_through_composer(
    deps: DepsMut,
    info: MessageInfo,
    assets: Uint128,
    crosschain_receiver: String,
    owner: String,
) -> ContractResult<Response> {
    assert_composer(deps.storage, &info.sender)?;
    let config = CONFIG.load(deps.storage)?;
    ensure!(
        config.fast_redeem_enabled,
        ContractError::FastRedeemDisabled {}
    );
    ensure!(
        !crosschain_receiver.is_empty() && !owner.is_empty(),
        ContractError::InvalidZeroAddress {}
    );
    let shares = withdraw_assets(deps.storage, &info.sender, assets)?;
    let (fee, net) = split_fast_redeem_fee(&config, assets)?;

    let mut attrs =
        fast_exit_attrs(&config, &info.sender, &crosschain_receiver, shares, assets, fee);
    attrs.push(attr("owner", owner));
    Ok(response_with_data(
        "execute-fast-withdraw-through-composer",
        CONTRACT_NAME,
        attrs,
        &shares,
    )?
    .add_messages(fast_exit_msgs(&config, &info.sender, fee, net)))
}

fn fast_exit_attrs(
    config: &Config,
    owner: &Addr,
    receiver: &str,
    shares: Uint128,
    gross: Uint128,
    fee: Uint128,
) -> Vec<Attribute> {
    vec![
        attr("caller", owner.as_str()),
        attr("receiver", receiver),
        attr("shares", shares),
        attr_coin("gross_assets", gross, &config.asset_denom),
        attr_coin("fee", fee, &config.asset_denom),
        attr_coin("net_assets", gross - fee, &config.asset_denom),
    ]
}

fn fast_exit_msgs(config: &Config, receiver: &Addr, fee: Uint128, net: Uint128) -> Vec<BankMsg> {
    let mut msgs = vec![BankMsg::Send {
        to_address: config.treasury.to_string(),
        amount: coins(fee.u128(), &config.asset_denom),
    }];
    if !net.is_zero() {
        msgs.push(BankMsg::Send {
            to_address: receiver.to_string(),
            amount: coins(net.u128(), &config.asset_denom),
        });
    }
    msgs
}

fn execute_add_rewards(deps: DepsMut, info: MessageInfo) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    let config = CONFIG.load(deps.storage)?;
    let amount = cw_utils::must_pay(&info, &config.asset_denom)?;
    let total_assets = TOTAL_ASSETS.update(deps.storage, |total| -> StdResult<_> {
        Ok(total.checked_add(amount)?)
    })?;

    Ok(response(
        "execute-add-rewards",
        CONTRACT_NAME,
        [
            attr_coin("amount", amount, &config.asset_denom),
            attr("total_assets", total_assets),
        ],
    ))
}

fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    new_config: ConfigOptional,
) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    let mut config = CONFIG.load(deps.storage)?;
    let mut attrs: Vec<Attribute> = vec![];

    if let Some(treasury) = new_config.treasury {
        config.treasury = deps.api.addr_validate(&treasury)?;
        attrs.push(attr("treasury", treasury));
    }
    if let Some(cooldown_duration) = new_config.cooldown_duration {
        config.cooldown_duration = cooldown_duration;
        attrs.push(attr("cooldown_duration", cooldown_duration.to_string()));
    }
    if let Some(fast_redeem_enabled) = new_config.fast_redeem_enabled {
        config.fast_redeem_enabled = fast_redeem_enabled;
        attrs.push(attr("fast_redeem_enabled", fast_redeem_enabled.to_string()));
    }
    if let Some(fast_redeem_fee_bps) = new_config.fast_redeem_fee_bps {
        config.fast_redeem_fee_bps = fast_redeem_fee_bps;
        attrs.push(attr("fast_redeem_fee_bps", fast_redeem_fee_bps.to_string()));
    }
    validate_config(&config)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(response("execute-update-config", CONTRACT_NAME, attrs))
}

fn execute_grant_composer(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    let address = deps.api.addr_validate(&address)?;
    COMPOSERS.save(deps.storage, &address, &true)?;

    Ok(response(
        "execute-grant-composer",
        CONTRACT_NAME,
        [attr("composer", address)],
    ))
}

fn execute_revoke_composer(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> ContractResult<Response> {
    cw_ownable::assert_owner(deps.storage, &info.sender)?;
    let address = deps.api.addr_validate(&address)?;
    COMPOSERS.remove(deps.storage, &address);

    Ok(response(
        "execute-revoke-composer",
        CONTRACT_NAME,
        [attr("composer", address)],
    ))
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

fn validate_config(config: &Config) -> ContractResult<()> {
    ensure!(
        config.cooldown_duration <= MAX_COOLDOWN_DURATION,
        ContractError::InvalidCooldownDuration {
            max: MAX_COOLDOWN_DURATION
        }
    );
    ensure!(
        (MIN_FAST_REDEEM_FEE_BPS..=MAX_FAST_REDEEM_FEE_BPS).contains(&config.fast_redeem_fee_bps),
        ContractError::InvalidFastRedeemFee {
            min: MIN_FAST_REDEEM_FEE_BPS,
            max: MAX_FAST_REDEEM_FEE_BPS,
        }
    );
    Ok(())
}

pub fn is_composer(storage: &dyn Storage, address: &Addr) -> StdResult<bool> {
    Ok(COMPOSERS.may_load(storage, address)?.unwrap_or(false))
}

fn assert_composer(storage: &dyn Storage, sender: &Addr) -> ContractResult<()> {
    ensure!(
        is_composer(storage, sender)?,
        ContractError::MissingComposerRole {}
    );
    Ok(())
}

fn validate_account(api: &dyn Api, account: &str) -> ContractResult<Addr> {
    ensure!(!account.is_empty(), ContractError::InvalidZeroAddress {});
    Ok(api.addr_validate(account)?)
}

fn receiver_or_sender(
    api: &dyn Api,
    receiver: Option<String>,
    sender: &Addr,
) -> ContractResult<Addr> {
    match receiver {
        Some(receiver) => validate_account(api, &receiver),
        None => Ok(sender.clone()),
    }
}

fn convert_to_shares(
    storage: &dyn Storage,
    assets: Uint128,
    rounding: Rounding,
) -> StdResult<Uint128> {
    let total_assets = TOTAL_ASSETS.load(storage)?;
    let total_shares = TOTAL_SHARES.load(storage)?;
    mul_div(
        assets,
        total_shares + Uint128::one(),
        total_assets + Uint128::one(),
        rounding,
    )
}

fn convert_to_assets(
    storage: &dyn Storage,
    shares: Uint128,
    rounding: Rounding,
) -> StdResult<Uint128> {
    let total_assets = TOTAL_ASSETS.load(storage)?;
    let total_shares = TOTAL_SHARES.load(storage)?;
    mul_div(
        shares,
        total_assets + Uint128::one(),
        total_shares + Uint128::one(),
        rounding,
    )
}

fn balance_of(storage: &dyn Storage, address: &Addr) -> StdResult<Uint128> {
    Ok(BALANCES.may_load(storage, address)?.unwrap_or_default())
}

fn save_balance(storage: &mut dyn Storage, address: &Addr, amount: Uint128) -> StdResult<()> {
    if amount.is_zero() {
        BALANCES.remove(storage, address);
        Ok(())
    } else {
        BALANCES.save(storage, address, &amount)
    }
}

fn mint_shares(storage: &mut dyn Storage, to: &Addr, shares: Uint128) -> ContractResult<()> {
    let balance = balance_of(storage, to)?;
    save_balance(storage, to, balance.checked_add(shares)?)?;
    TOTAL_SHARES.update(storage, |total| -> StdResult<_> {
        Ok(total.checked_add(shares)?)
    })?;
    Ok(())
}

fn burn_shares(storage: &mut dyn Storage, from: &Addr, shares: Uint128) -> ContractResult<()> {
    let balance = balance_of(storage, from)?;
    ensure!(
        shares <= balance,
        ContractError::ExcessiveRedeemAmount {
            requested: shares,
            available: balance,
        }
    );
    save_balance(storage, from, balance - shares)?;
    TOTAL_SHARES.update(storage, |total| -> StdResult<_> {
        Ok(total.checked_sub(shares)?)
    })?;
    Ok(())
}

/// Burns `shares` of `owner` and takes their asset value out of the backing assets.
fn redeem_shares(
    storage: &mut dyn Storage,
    owner: &Addr,
    shares: Uint128,
) -> ContractResult<Uint128> {
    ensure!(!shares.is_zero(), ContractError::InvalidZeroAmount {});
    let assets = convert_to_assets(storage, shares, Rounding::Floor)?;
    ensure!(!assets.is_zero(), ContractError::InvalidZeroAmount {});
    burn_shares(storage, owner, shares)?;
    TOTAL_ASSETS.update(storage, |total| -> StdResult<_> {
        Ok(total.checked_sub(assets)?)
    })?;
    Ok(assets)
}

/// Burns the shares worth `assets` of `owner`, rounding the burnt shares up.
fn withdraw_assets(
    storage: &mut dyn Storage,
    owner: &Addr,
    assets: Uint128,
) -> ContractResult<Uint128> {
    ensure!(!assets.is_zero(), ContractError::InvalidZeroAmount {});
    let available = convert_to_assets(storage, balance_of(storage, owner)?, Rounding::Floor)?;
    ensure!(
        assets <= available,
        ContractError::ExcessiveWithdrawAmount {
            requested: assets,
            available,
        }
    );
    let shares = convert_to_shares(storage, assets, Rounding::Ceil)?;
    burn_shares(storage, owner, shares)?;
    TOTAL_ASSETS.update(storage, |total| -> StdResult<_> {
        Ok(total.checked_sub(assets)?)
    })?;
    Ok(shares)
}

/// Moves `assets` into the cooldown reserve and credits them to `redeemer`. The maturity is
/// reset to a full cooldown from now, the amount accumulates.
fn open_cooldown(
    storage: &mut dyn Storage,
    env: &Env,
    config: &Config,
    redeemer: &str,
    assets: Uint128,
) -> ContractResult<CooldownEntry> {
    COOLDOWN_ASSETS.update(storage, |total| -> StdResult<_> {
        Ok(total.checked_add(assets)?)
    })?;
    let mut entry = COOLDOWNS.may_load(storage, redeemer)?.unwrap_or_default();
    entry.cooldown_end = env.block.time.seconds() + config.cooldown_duration;
    entry.underlying_amount = entry.underlying_amount.checked_add(assets)?;
    COOLDOWNS.save(storage, redeemer, &entry)?;
    Ok(entry)
}

fn claim_cooldown(storage: &mut dyn Storage, env: &Env, redeemer: &str) -> ContractResult<Uint128> {
    let entry = COOLDOWNS.may_load(storage, redeemer)?.unwrap_or_default();
    ensure!(entry.is_open(), ContractError::NoCooldown {});
    ensure!(
        entry.is_mature(env.block.time.seconds()),
        ContractError::CooldownNotElapsed {
            cooldown_end: entry.cooldown_end
        }
    );
    COOLDOWNS.remove(storage, redeemer);
    COOLDOWN_ASSETS.update(storage, |total| -> StdResult<_> {
        Ok(total.checked_sub(entry.underlying_amount)?)
    })?;
    Ok(entry.underlying_amount)
}

fn fast_redeem_fee(config: &Config, gross: Uint128) -> Uint128 {
    gross.multiply_ratio(config.fast_redeem_fee_bps as u128, BPS_DENOMINATOR)
}

/// Splits `gross` into (fee, net). A fee rounding down to zero is refused.
fn split_fast_redeem_fee(config: &Config, gross: Uint128) -> ContractResult<(Uint128, Uint128)> {
    let fee = fast_redeem_fee(config, gross);
    ensure!(!fee.is_zero(), ContractError::ZeroFee {});
    Ok((fee, gross - fee))
}

fn preview_fast_exit(config: &Config, shares: Uint128, gross: Uint128) -> FastRedeemPreview {
    let fee = fast_redeem_fee(config, gross);
    FastRedeemPreview {
        shares,
        gross_assets: gross,
        fee_assets: fee,
        net_assets: gross - fee,
    }
}
