use crate::contract::{execute, instantiate, query, reply, CONTRACT_NAME};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    coin, coins, from_json,
    testing::{mock_env, mock_info},
    to_json_binary, Addr, BankMsg, Binary, Coin, ContractResult as CwContractResult, Deps, DepsMut,
    Empty, Env, MessageInfo, Reply, Response, StdError, StdResult, SubMsgResponse, SubMsgResult,
    Uint128,
};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};
use cw_storage_plus::Item;
use hubstake_base::{
    codec::{ExecutorOptions, HubMessage, UnstakeMessage, MSG_TYPE_UNSTAKE},
    error::unstake_messenger::ContractError,
    msg::{
        transport::{EndpointExecuteMsg, EndpointQueryMsg, MessagingFee, MessagingReceipt},
        unstake_messenger::{ExecuteMsg, InstantiateMsg, QueryMsg},
    },
    state::unstake_messenger::{Config, PendingUnstake, PENDING_UNSTAKE, UNSTAKE_REPLY_ID},
};
use hubstake_helpers::testing::mock_dependencies;

const OWNER: &str = "owner";
const USER: &str = "user";
const NATIVE: &str = "unative";
const HUB_CHAIN: u32 = 1;
const HUB_COMPOSER: &str = "hub_composer";
const BASE_FEE: u128 = 1000;

#[cw_serde]
struct SentMessage {
    dst_chain: u32,
    receiver: String,
    payload: Binary,
    options: Binary,
    funds: Vec<Coin>,
}

const SENT: Item<Vec<SentMessage>> = Item::new("sent");

/// Fee of the mock endpoint: a flat base plus whatever native drop the options request.
fn endpoint_fee(options: &Binary) -> StdResult<Uint128> {
    let options =
        ExecutorOptions::decode(options).map_err(|err| StdError::generic_err(err.to_string()))?;
    Ok(Uint128::new(BASE_FEE) + options.native_drop)
}

fn endpoint_instantiate(_: DepsMut, _: Env, _: MessageInfo, _: Empty) -> StdResult<Response> {
    Ok(Response::new())
}

fn endpoint_execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: EndpointExecuteMsg,
) -> StdResult<Response> {
    match msg {
        EndpointExecuteMsg::Send {
            dst_chain,
            receiver,
            payload,
            options,
            refund_address,
        } => {
            let fee = endpoint_fee(&options)?;
            let paid = info
                .funds
                .iter()
                .find(|c| c.denom == NATIVE)
                .map(|c| c.amount)
                .unwrap_or_default();
            if paid < fee {
                return Err(StdError::generic_err("insufficient fee"));
            }
            let mut sent = SENT.may_load(deps.storage)?.unwrap_or_default();
            sent.push(SentMessage {
                dst_chain,
                receiver,
                payload,
                options,
                funds: info.funds.clone(),
            });
            SENT.save(deps.storage, &sent)?;

            let nonce = sent.len() as u64;
            let receipt = MessagingReceipt {
                message_id: format!("guid-{}", nonce),
                nonce,
                fee: MessagingFee {
                    native_fee: fee,
                    alt_fee: Uint128::zero(),
                },
            };
            let mut res = Response::new().set_data(to_json_binary(&receipt)?);
            if paid > fee {
                res = res.add_message(BankMsg::Send {
                    to_address: refund_address,
                    amount: coins((paid - fee).u128(), NATIVE),
                });
            }
            Ok(res)
        }
    }
}

#[cw_serde]
enum MockEndpointQueryMsg {
    Quote {
        dst_chain: u32,
        receiver: String,
        payload: Binary,
        options: Binary,
        pay_in_alt_token: bool,
    },
    Sent {},
}

fn endpoint_query(deps: Deps, _env: Env, msg: MockEndpointQueryMsg) -> StdResult<Binary> {
    match msg {
        MockEndpointQueryMsg::Quote { options, .. } => to_json_binary(&MessagingFee {
            native_fee: endpoint_fee(&options)?,
            alt_fee: Uint128::zero(),
        }),
        MockEndpointQueryMsg::Sent {} => {
            to_json_binary(&SENT.may_load(deps.storage)?.unwrap_or_default())
        }
    }
}

fn endpoint_contract() -> Box<dyn Contract<Empty>> {
    Box::new(ContractWrapper::new(
        endpoint_execute,
        endpoint_instantiate,
        endpoint_query,
    ))
}

fn messenger_contract() -> Box<dyn Contract<Empty>> {
    Box::new(ContractWrapper::new(execute, instantiate, query).with_reply(reply))
}

struct Suite {
    app: App,
    endpoint: Addr,
    messenger: Addr,
}

impl Suite {
    fn new(with_peer: bool) -> Self {
        let mut app = App::new(|router, _, storage| {
            router
                .bank
                .init_balance(storage, &Addr::unchecked(USER), coins(100_000, NATIVE))
                .unwrap();
        });
        let owner = Addr::unchecked(OWNER);

        let endpoint_code = app.store_code(endpoint_contract());
        let endpoint = app
            .instantiate_contract(endpoint_code, owner.clone(), &Empty {}, &[], "endpoint", None)
            .unwrap();

        let messenger_code = app.store_code(messenger_contract());
        let messenger = app
            .instantiate_contract(
                messenger_code,
                owner.clone(),
                &InstantiateMsg {
                    owner: None,
                    endpoint: endpoint.to_string(),
                    hub_chain: HUB_CHAIN,
                    native_denom: NATIVE.to_string(),
                    fee_buffer_bps: None,
                    receive_gas: None,
                },
                &[],
                "unstake messenger",
                None,
            )
            .unwrap();

        if with_peer {
            app.execute_contract(
                owner,
                messenger.clone(),
                &ExecuteMsg::SetPeer {
                    chain_id: HUB_CHAIN,
                    peer: HUB_COMPOSER.to_string(),
                },
                &[],
            )
            .unwrap();
        }

        Suite {
            app,
            endpoint,
            messenger,
        }
    }

    fn quote(&self, return_value: u128) -> MessagingFee {
        self.app
            .wrap()
            .query_wasm_smart(
                &self.messenger,
                &QueryMsg::QuoteUnstakeWithReturnValue {
                    user: USER.to_string(),
                    return_value: Uint128::new(return_value),
                },
            )
            .unwrap()
    }

    fn unstake(&mut self, return_value: u128, paid: u128) -> Result<AppResponse, String> {
        self.app
            .execute_contract(
                Addr::unchecked(USER),
                self.messenger.clone(),
                &ExecuteMsg::Unstake {
                    return_trip_allocation: Uint128::new(return_value),
                },
                &coins(paid, NATIVE),
            )
            .map_err(|err| err.root_cause().to_string())
    }

    fn sent(&self) -> Vec<SentMessage> {
        self.app
            .wrap()
            .query_wasm_smart(&self.endpoint, &MockEndpointQueryMsg::Sent {})
            .unwrap()
    }

    fn user_balance(&self) -> Uint128 {
        self.app.wrap().query_balance(USER, NATIVE).unwrap().amount
    }

    fn set_enforced_options(
        &mut self,
        receive_gas: u64,
        native_drop: u128,
    ) -> Result<AppResponse, String> {
        self.app
            .execute_contract(
                Addr::unchecked(OWNER),
                self.messenger.clone(),
                &ExecuteMsg::SetEnforcedOptions {
                    msg_type: MSG_TYPE_UNSTAKE,
                    options: ExecutorOptions {
                        receive_gas,
                        native_drop: Uint128::new(native_drop),
                    },
                },
                &[],
            )
            .map_err(|err| err.root_cause().to_string())
    }
}

fn event_attr(res: &AppResponse, ty: &str, key: &str) -> Option<String> {
    let expected = format!("wasm-{}-{}", CONTRACT_NAME, ty);
    res.events
        .iter()
        .filter(|e| e.ty == expected)
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == key)
        .map(|a| a.value.clone())
}

#[test]
fn unstake_paying_exact_quote_has_no_refund() {
    let mut suite = Suite::new(true);
    let quote = suite.quote(2000);
    assert_eq!(quote.native_fee, Uint128::new(BASE_FEE + 2000));

    let res = suite.unstake(2000, quote.native_fee.u128()).unwrap();
    assert_eq!(res.data, Some(to_json_binary("guid-1").unwrap()));
    assert_eq!(
        event_attr(&res, "reply-unstake-sent", "refund"),
        Some("0".to_string())
    );
    assert_eq!(suite.user_balance(), Uint128::new(100_000 - 3000));

    let sent = suite.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].dst_chain, HUB_CHAIN);
    assert_eq!(sent[0].receiver, HUB_COMPOSER);
    assert_eq!(sent[0].funds, coins(3000, NATIVE));
    assert_eq!(
        HubMessage::decode(&sent[0].payload).unwrap(),
        HubMessage::Unstake(UnstakeMessage {
            user: USER.to_string(),
            extra_options: Binary::default(),
        })
    );
    assert_eq!(
        ExecutorOptions::decode(&sent[0].options).unwrap(),
        ExecutorOptions {
            receive_gas: 350_000,
            native_drop: Uint128::new(2000),
        }
    );
}

#[test]
fn unstake_overpayment_is_refunded() {
    let mut suite = Suite::new(true);

    let res = suite.unstake(2000, 3500).unwrap();
    assert_eq!(
        event_attr(&res, "reply-unstake-sent", "refund"),
        Some("500".to_string())
    );
    assert_eq!(suite.user_balance(), Uint128::new(100_000 - 3000));
    assert_eq!(
        suite.app.wrap().query_balance(&suite.messenger, NATIVE).unwrap().amount,
        Uint128::zero()
    );
}

#[test]
fn unstake_rejects_underpayment() {
    let mut suite = Suite::new(true);

    let err = suite.unstake(2000, 2999).unwrap_err();
    assert_eq!(
        err,
        ContractError::InsufficientFee {
            required: Uint128::new(3000),
            provided: Uint128::new(2999),
        }
        .to_string()
    );
    assert!(suite.sent().is_empty());
    assert_eq!(suite.user_balance(), Uint128::new(100_000));
}

#[test]
fn unstake_requires_peer_and_allocation() {
    let mut suite = Suite::new(false);
    let err = suite.unstake(2000, 3000).unwrap_err();
    assert_eq!(err, ContractError::HubNotConfigured {}.to_string());

    let mut suite = Suite::new(true);
    let err = suite.unstake(0, 3000).unwrap_err();
    assert_eq!(
        err,
        ContractError::InvalidReturnTripAllocation {}.to_string()
    );
}

#[test]
fn enforced_gas_is_added_and_return_value_forwarded_exactly() {
    let mut suite = Suite::new(true);
    suite.set_enforced_options(50_000, 0).unwrap();

    let quote = suite.quote(2000);
    assert_eq!(quote.native_fee, Uint128::new(BASE_FEE + 2000));
    suite.unstake(2000, quote.native_fee.u128()).unwrap();
    assert_eq!(
        ExecutorOptions::decode(&suite.sent()[0].options).unwrap(),
        ExecutorOptions {
            receive_gas: 400_000,
            native_drop: Uint128::new(2000),
        }
    );
}

#[test]
fn enforced_native_drop_is_rejected_for_unstake() {
    let mut suite = Suite::new(true);

    let err = suite.set_enforced_options(0, 100).unwrap_err();
    assert_eq!(err, ContractError::EnforcedNativeDrop {}.to_string());

    let quote = suite.quote(2000);
    assert_eq!(quote.native_fee, Uint128::new(BASE_FEE + 2000));
    suite.unstake(2000, quote.native_fee.u128()).unwrap();
    let options = ExecutorOptions::decode(&suite.sent()[0].options).unwrap();
    assert_eq!(options.native_drop, Uint128::new(2000));
}

#[test]
fn quote_with_buffer_adds_fee_buffer() {
    let suite = Suite::new(true);

    let buffered: MessagingFee = suite
        .app
        .wrap()
        .query_wasm_smart(
            &suite.messenger,
            &QueryMsg::QuoteUnstakeWithBuffer {
                user: USER.to_string(),
                return_value: Uint128::new(2000),
            },
        )
        .unwrap();
    assert_eq!(buffered.native_fee, Uint128::new(3300));
}

fn instantiate_messenger(deps: DepsMut) {
    instantiate(
        deps,
        mock_env(),
        mock_info(OWNER, &[]),
        InstantiateMsg {
            owner: None,
            endpoint: "endpoint".to_string(),
            hub_chain: HUB_CHAIN,
            native_denom: NATIVE.to_string(),
            fee_buffer_bps: Some(2000),
            receive_gas: Some(200_000),
        },
    )
    .unwrap();
}

#[test]
fn instantiate_stores_config() {
    let mut deps = mock_dependencies(&[]);
    instantiate_messenger(deps.as_mut());

    let config: Config =
        from_json(query(deps.as_ref(), mock_env(), QueryMsg::Config {}).unwrap()).unwrap();
    assert_eq!(
        config,
        Config {
            endpoint: Addr::unchecked("endpoint"),
            hub_chain: HUB_CHAIN,
            native_denom: NATIVE.to_string(),
            fee_buffer_bps: 2000,
            receive_gas: 200_000,
        }
    );

    let err = instantiate(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        InstantiateMsg {
            owner: None,
            endpoint: "endpoint".to_string(),
            hub_chain: HUB_CHAIN,
            native_denom: NATIVE.to_string(),
            fee_buffer_bps: Some(400),
            receive_gas: None,
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::InvalidFeeBuffer {
            min: 500,
            max: 5000
        }
    );
}

#[test]
fn set_peer_only_for_hub_chain() {
    let mut deps = mock_dependencies(&[]);
    instantiate_messenger(deps.as_mut());

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::SetPeer {
            chain_id: 7,
            peer: HUB_COMPOSER.to_string(),
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::InvalidChain {
            chain_id: 7,
            hub_chain: HUB_CHAIN
        }
    );

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::SetPeer {
            chain_id: HUB_CHAIN,
            peer: "".to_string(),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::InvalidPeer {});

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(USER, &[]),
        ExecuteMsg::SetPeer {
            chain_id: HUB_CHAIN,
            peer: HUB_COMPOSER.to_string(),
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::OwnershipError(cw_ownable::OwnershipError::NotOwner)
    );

    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::SetPeer {
            chain_id: HUB_CHAIN,
            peer: HUB_COMPOSER.to_string(),
        },
    )
    .unwrap();
    let peer: Option<String> =
        from_json(query(deps.as_ref(), mock_env(), QueryMsg::Peer {}).unwrap()).unwrap();
    assert_eq!(peer, Some(HUB_COMPOSER.to_string()));
}

#[test]
fn fee_buffer_is_bounded() {
    let mut deps = mock_dependencies(&[]);
    instantiate_messenger(deps.as_mut());

    for bps in [499u16, 5001] {
        let err = execute(
            deps.as_mut(),
            mock_env(),
            mock_info(OWNER, &[]),
            ExecuteMsg::SetFeeBuffer { bps },
        )
        .unwrap_err();
        assert_eq!(
            err,
            ContractError::InvalidFeeBuffer {
                min: 500,
                max: 5000
            }
        );
    }
    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::SetFeeBuffer { bps: 5000 },
    )
    .unwrap();
}

#[test]
fn quote_uses_endpoint_and_buffer() {
    let mut deps = mock_dependencies(&[]);
    instantiate_messenger(deps.as_mut());
    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::SetPeer {
            chain_id: HUB_CHAIN,
            peer: HUB_COMPOSER.to_string(),
        },
    )
    .unwrap();
    deps.querier.add_wasm_query_response("endpoint", |msg| {
        let EndpointQueryMsg::Quote {
            dst_chain,
            receiver,
            payload,
            options,
            ..
        } = from_json(msg).unwrap();
        assert_eq!(dst_chain, HUB_CHAIN);
        assert_eq!(receiver, HUB_COMPOSER);
        assert_eq!(
            HubMessage::decode(&payload).unwrap(),
            HubMessage::Unstake(UnstakeMessage {
                user: "quoted_user".to_string(),
                extra_options: Binary::default(),
            })
        );
        let native_drop = ExecutorOptions::decode(&options).unwrap().native_drop;
        CwContractResult::Ok(
            to_json_binary(&MessagingFee {
                native_fee: Uint128::new(500) + native_drop,
                alt_fee: Uint128::zero(),
            })
            .unwrap(),
        )
    });

    let buffered: MessagingFee = from_json(
        query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::QuoteUnstakeWithBuffer {
                user: "quoted_user".to_string(),
                return_value: Uint128::new(1500),
            },
        )
        .unwrap(),
    )
    .unwrap();
    // (500 + 1500) * 1.2
    assert_eq!(buffered.native_fee, Uint128::new(2400));
}

#[test]
fn nested_unstake_is_rejected() {
    let mut deps = mock_dependencies(&[]);
    instantiate_messenger(deps.as_mut());
    PENDING_UNSTAKE
        .save(
            deps.as_mut().storage,
            &PendingUnstake {
                user: Addr::unchecked(USER),
                paid: Uint128::new(3000),
                native_fee: Uint128::new(3000),
                return_trip_allocation: Uint128::new(2000),
            },
        )
        .unwrap();

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(USER, &[coin(3000, NATIVE)]),
        ExecuteMsg::Unstake {
            return_trip_allocation: Uint128::new(2000),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::ReentrantCall {});
}

#[test]
fn reply_without_receipt_fails() {
    let mut deps = mock_dependencies(&[]);
    instantiate_messenger(deps.as_mut());

    let err = reply(
        deps.as_mut(),
        mock_env(),
        Reply {
            id: 42,
            result: SubMsgResult::Ok(SubMsgResponse {
                events: vec![],
                data: None,
            }),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::UnknownReplyId { id: 42 });

    PENDING_UNSTAKE
        .save(
            deps.as_mut().storage,
            &PendingUnstake {
                user: Addr::unchecked(USER),
                paid: Uint128::new(3000),
                native_fee: Uint128::new(3000),
                return_trip_allocation: Uint128::new(2000),
            },
        )
        .unwrap();
    let err = reply(
        deps.as_mut(),
        mock_env(),
        Reply {
            id: UNSTAKE_REPLY_ID,
            result: SubMsgResult::Ok(SubMsgResponse {
                events: vec![],
                data: None,
            }),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::ParseReplyError(_)));
}
