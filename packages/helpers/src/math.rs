use cosmwasm_std::{StdError, StdResult, Uint128, Uint256};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
}

/// Computes `a * b / d` in 256-bit precision.
pub fn mul_div(a: Uint128, b: Uint128, d: Uint128, rounding: Rounding) -> StdResult<Uint128> {
    if d.is_zero() {
        return Err(StdError::generic_err("mul_div: division by zero"));
    }
    let product = a.full_mul(b);
    let divisor = Uint256::from(d);
    // ceil(p / d) = (p + d - 1) / d
    let bump = match rounding {
        Rounding::Floor => Uint256::zero(),
        Rounding::Ceil => divisor - Uint256::one(),
    };
    let result = product.checked_add(bump)?.checked_div(divisor)?;
    Uint128::try_from(result)
        .map_err(|_| StdError::generic_err("mul_div: result overflows Uint128"))
}

#[test]
fn test_mul_div_rounding() {
    let seven = Uint128::new(7);
    let two = Uint128::new(2);
    let one = Uint128::one();
    assert_eq!(
        mul_div(seven, one, two, Rounding::Floor).unwrap(),
        Uint128::new(3)
    );
    assert_eq!(
        mul_div(seven, one, two, Rounding::Ceil).unwrap(),
        Uint128::new(4)
    );
    assert_eq!(
        mul_div(Uint128::new(8), one, two, Rounding::Ceil).unwrap(),
        Uint128::new(4)
    );
    assert!(mul_div(seven, one, Uint128::zero(), Rounding::Floor).is_err());
    assert_eq!(
        mul_div(Uint128::MAX, Uint128::MAX, Uint128::MAX, Rounding::Floor).unwrap(),
        Uint128::MAX
    );
}
