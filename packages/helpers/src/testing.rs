#![cfg(not(target_arch = "wasm32"))]

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;

use cosmwasm_std::testing::{MockApi, MockQuerier, MockStorage};
use cosmwasm_std::{
    from_json, Binary, Coin, ContractResult, Empty, OwnedDeps, Querier, QuerierResult,
    QueryRequest, SystemError, SystemResult,
};

pub const MOCK_CONTRACT_ADDR: &str = "cosmos2contract";

type WasmFn = dyn Fn(&Binary) -> ContractResult<Binary>;

pub struct WasmMockQuerier {
    base: MockQuerier<Empty>,
    wasm_query_responses: RefCell<HashMap<String, Vec<Box<WasmFn>>>>,
}

impl Querier for WasmMockQuerier {
    fn raw_query(&self, bin_request: &[u8]) -> QuerierResult {
        let request: QueryRequest<Empty> = match from_json(bin_request) {
            Ok(v) => v,
            Err(e) => {
                return QuerierResult::Err(SystemError::InvalidRequest {
                    error: format!("Parsing query request: {}", e),
                    request: bin_request.into(),
                });
            }
        };
        self.handle_query(&request)
    }
}

impl WasmMockQuerier {
    pub fn new(base: MockQuerier<Empty>) -> Self {
        WasmMockQuerier {
            base,
            wasm_query_responses: HashMap::new().into(),
        }
    }

    pub fn handle_query(&self, request: &QueryRequest<Empty>) -> QuerierResult {
        match &request {
            QueryRequest::Wasm(cosmwasm_std::WasmQuery::Smart { contract_addr, msg }) => {
                let mut wasm_query_responses = self.wasm_query_responses.borrow_mut();
                let responses = match wasm_query_responses.get_mut(contract_addr) {
                    Some(responses) if !responses.is_empty() => responses,
                    _ => {
                        return SystemResult::Err(SystemError::UnsupportedRequest {
                            kind: format!(
                                "Wasm contract {} query is not mocked. Query {}",
                                contract_addr,
                                String::from_utf8_lossy(msg.as_slice())
                            ),
                        })
                    }
                };
                // a single registered responder keeps answering, a queue is consumed in order
                if responses.len() == 1 {
                    return SystemResult::Ok(responses[0](msg));
                }
                let response = responses.remove(0);
                SystemResult::Ok(response(msg))
            }
            _ => self.base.handle_query(request),
        }
    }

    pub fn add_wasm_query_response<F>(&mut self, contract_address: &str, response_func: F)
    where
        F: 'static + Fn(&Binary) -> ContractResult<Binary>,
    {
        let mut wasm_responses = self.wasm_query_responses.borrow_mut();
        let response_funcs = wasm_responses
            .entry(contract_address.to_string())
            .or_default();

        response_funcs.push(Box::new(response_func));
    }
}

pub fn mock_dependencies(
    contract_balance: &[Coin],
) -> OwnedDeps<MockStorage, MockApi, WasmMockQuerier, Empty> {
    let custom_querier: WasmMockQuerier =
        WasmMockQuerier::new(MockQuerier::new(&[(MOCK_CONTRACT_ADDR, contract_balance)]));

    OwnedDeps {
        storage: MockStorage::default(),
        api: MockApi::default(),
        querier: custom_querier,
        custom_query_type: PhantomData,
    }
}
