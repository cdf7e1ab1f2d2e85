use cosmwasm_std::{attr, to_json_binary, Attribute, Event, Response, StdResult};
use serde::Serialize;

pub fn response<A: Into<Attribute>, T>(
    ty: &str,
    contract_name: &str,
    attrs: impl IntoIterator<Item = A>,
) -> Response<T> {
    Response::<T>::new()
        .add_event(Event::new(format!("{}-{}", contract_name, ty)).add_attributes(attrs))
}

/// Same event layout as [`response`], with `data` carrying the JSON encoded
/// result of the operation for callers that dispatch it as a submessage.
pub fn response_with_data<A: Into<Attribute>, T, D: Serialize>(
    ty: &str,
    contract_name: &str,
    attrs: impl IntoIterator<Item = A>,
    data: &D,
) -> StdResult<Response<T>> {
    Ok(response(ty, contract_name, attrs).set_data(to_json_binary(data)?))
}

pub fn attr_coin(
    key: impl Into<String>,
    amount: impl std::fmt::Display,
    denom: impl std::fmt::Display,
) -> Attribute {
    attr(key, format!("{}{}", amount, denom))
}
