use overlay_core::{Coin, DispatchResult, EncodedMsg, GasConfig, GasPolicy, SigningClient, TxFee};

/// Produce a concrete fee for a submission from its gas policy.
///
/// `auto` simulates and scales the estimate by the adjustment factor;
/// `fixed` takes the limit as given; `zero` produces a zero-gas, empty-fee
/// transaction and never simulates. The fee amount is `gas × gas_price` in
/// the base denomination.
///
/// A simulate failure caused by sequence drift arrives here already typed
/// as `IncorrectAccountSequence` (with the signing client's cache cleared)
/// and is propagated unchanged for the dispatcher to retry.
pub async fn estimate_fee(
    client: &dyn SigningClient,
    gas: &GasConfig,
    msgs: &[EncodedMsg],
    memo: &str,
) -> DispatchResult<TxFee> {
    let gas_limit = match gas.policy {
        GasPolicy::Zero => {
            return Ok(TxFee {
                gas_limit: 0,
                amount: vec![],
            })
        }
        GasPolicy::Fixed(gas_limit) => gas_limit,
        GasPolicy::Auto { adjustment } => {
            let simulated = client.simulate(msgs, memo).await?;
            (simulated as f64 * adjustment).ceil() as u64
        }
    };

    let fee_amount = u128::from(gas_limit).saturating_mul(gas.gas_price);
    Ok(TxFee {
        gas_limit,
        amount: vec![Coin::new(gas.denom.clone(), fee_amount)],
    })
}
