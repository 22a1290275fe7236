//! Asset custody collaborator and the settling facade
//!
//! The engine only keeps books. Moving the underlying assets is the job of an
//! [`AssetTransfer`] implementation that the caller drives around each engine
//! call. [`SettledExchange`] is that caller: it pulls inputs, runs the engine
//! operation and pays outputs, returning pulled inputs if the engine rejects.

use crate::engine::Exchange;
use crate::error::{AmmError, AmmResult};
use crate::fixed_point::{checked_add, checked_sub};
use crate::liquidity::{
    AddLiquidityParams, AddLiquidityReceipt, RemoveLiquidityParams, RemoveLiquidityReceipt,
};
use crate::swap::{validate_path, SwapParams, SwapReceipt};
use crate::types::{AssetId, OwnerId};
use dashmap::DashMap;
use ethers_core::types::U256;
use std::sync::Arc;
use tracing::{error, warn};

/// Moves assets between holders and the exchange's vault
pub trait AssetTransfer: Send + Sync {
    /// Pull `amount` of `asset` from `from` into the vault
    fn transfer_in(&self, asset: AssetId, from: OwnerId, amount: U256) -> AmmResult<()>;

    /// Pay `amount` of `asset` from the vault to `to`
    fn transfer_out(&self, asset: AssetId, to: OwnerId, amount: U256) -> AmmResult<()>;

    /// Balance of `asset` held by `holder`
    fn balance_of(&self, asset: AssetId, holder: OwnerId) -> U256;
}

/// In-process balance book, one entry per `(asset, holder)`
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    balances: DashMap<(AssetId, OwnerId), U256>,
    vault: DashMap<AssetId, U256>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `holder` with freshly issued `amount` of `asset`
    pub fn mint(&self, asset: AssetId, holder: OwnerId, amount: U256) -> AmmResult<()> {
        let mut balance = self.balances.entry((asset, holder)).or_default();
        *balance = checked_add(*balance, amount)?;
        Ok(())
    }

    /// Amount of `asset` held by the vault
    pub fn vault_balance(&self, asset: AssetId) -> U256 {
        self.vault.get(&asset).map(|v| *v).unwrap_or_default()
    }
}

impl AssetTransfer for InMemoryCustody {
    fn transfer_in(&self, asset: AssetId, from: OwnerId, amount: U256) -> AmmResult<()> {
        {
            let mut balance = self.balances.entry((asset, from)).or_default();
            if *balance < amount {
                return Err(AmmError::CustodyRejected(format!(
                    "{:?} holds {} of {:?}, needs {}",
                    from, *balance, asset, amount
                )));
            }
            *balance = checked_sub(*balance, amount)?;
        }
        let mut vault = self.vault.entry(asset).or_default();
        *vault = checked_add(*vault, amount)?;
        Ok(())
    }

    fn transfer_out(&self, asset: AssetId, to: OwnerId, amount: U256) -> AmmResult<()> {
        {
            let mut vault = self.vault.entry(asset).or_default();
            if *vault < amount {
                return Err(AmmError::CustodyRejected(format!(
                    "vault holds {} of {:?}, needs {}",
                    *vault, asset, amount
                )));
            }
            *vault = checked_sub(*vault, amount)?;
        }
        let mut balance = self.balances.entry((asset, to)).or_default();
        *balance = checked_add(*balance, amount)?;
        Ok(())
    }

    fn balance_of(&self, asset: AssetId, holder: OwnerId) -> U256 {
        self.balances
            .get(&(asset, holder))
            .map(|b| *b)
            .unwrap_or_default()
    }
}

/// Exchange whose operations also settle assets through a custody backend
pub struct SettledExchange<C: AssetTransfer> {
    exchange: Arc<Exchange>,
    custody: C,
}

impl<C: AssetTransfer> SettledExchange<C> {
    pub fn new(exchange: Arc<Exchange>, custody: C) -> Self {
        Self { exchange, custody }
    }

    pub fn exchange(&self) -> &Arc<Exchange> {
        &self.exchange
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    /// Pull the desired amounts from `payer`, deposit, and return the unused remainder.
    ///
    /// The deposit is committed before the remainder goes back, so a failed
    /// remainder payout is returned as an error even though liquidity was minted.
    /// Refunds after a rejected deposit are best-effort and only logged.
    pub fn add_liquidity(
        &self,
        payer: OwnerId,
        params: &AddLiquidityParams,
    ) -> AmmResult<AddLiquidityReceipt> {
        self.custody
            .transfer_in(params.asset_a, payer, params.amount_a_desired)?;
        if let Err(e) = self
            .custody
            .transfer_in(params.asset_b, payer, params.amount_b_desired)
        {
            self.refund(params.asset_a, payer, params.amount_a_desired);
            return Err(e);
        }

        match self.exchange.add_liquidity(params) {
            Ok(receipt) => {
                self.pay(
                    params.asset_a,
                    payer,
                    params.amount_a_desired.saturating_sub(receipt.amount_a),
                )?;
                self.pay(
                    params.asset_b,
                    payer,
                    params.amount_b_desired.saturating_sub(receipt.amount_b),
                )?;
                Ok(receipt)
            }
            Err(e) => {
                warn!(payer = ?payer, error = %e, "Deposit rejected, returning funds");
                self.refund(params.asset_a, payer, params.amount_a_desired);
                self.refund(params.asset_b, payer, params.amount_b_desired);
                Err(e)
            }
        }
    }

    /// Burn liquidity and pay both assets to the recipient
    pub fn remove_liquidity(
        &self,
        params: &RemoveLiquidityParams,
    ) -> AmmResult<RemoveLiquidityReceipt> {
        let receipt = self.exchange.remove_liquidity(params)?;
        self.pay(params.asset_a, params.recipient, receipt.amount_a)?;
        self.pay(params.asset_b, params.recipient, receipt.amount_b)?;
        Ok(receipt)
    }

    /// Pull `amount_in` from `trader`, swap, and pay the output to the recipient
    pub fn swap_exact_tokens_for_tokens(
        &self,
        trader: OwnerId,
        params: &SwapParams,
    ) -> AmmResult<SwapReceipt> {
        let (asset_in, asset_out) = validate_path(&params.path)?;
        self.custody.transfer_in(asset_in, trader, params.amount_in)?;

        match self.exchange.swap_exact_tokens_for_tokens(params) {
            Ok(receipt) => {
                self.pay(asset_out, params.recipient, receipt.amount_out)?;
                Ok(receipt)
            }
            Err(e) => {
                warn!(trader = ?trader, error = %e, "Swap rejected, returning input");
                self.refund(asset_in, trader, params.amount_in);
                Err(e)
            }
        }
    }

    fn pay(&self, asset: AssetId, to: OwnerId, amount: U256) -> AmmResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.custody.transfer_out(asset, to, amount).map_err(|e| {
            // Books are already committed; the vault no longer matches reserves
            error!(asset = ?asset, to = ?to, amount = %amount, error = %e, "Payout failed");
            e
        })
    }

    fn refund(&self, asset: AssetId, to: OwnerId, amount: U256) {
        if amount.is_zero() {
            return;
        }
        if let Err(e) = self.custody.transfer_out(asset, to, amount) {
            error!(asset = ?asset, to = ?to, amount = %amount, error = %e, "Refund failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::fixed_point::units;
    use ethers_core::types::Address;
    use pairswap_config::EngineSettings;

    fn asset(n: u64) -> AssetId {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn test_transfer_in_requires_balance() {
        let custody = InMemoryCustody::new();
        let alice = asset(100);
        custody.mint(asset(1), alice, U256::from(50)).unwrap();

        assert!(matches!(
            custody.transfer_in(asset(1), alice, U256::from(51)),
            Err(AmmError::CustodyRejected(_))
        ));
        assert_eq!(custody.balance_of(asset(1), alice), U256::from(50));

        custody.transfer_in(asset(1), alice, U256::from(20)).unwrap();
        assert_eq!(custody.balance_of(asset(1), alice), U256::from(30));
        assert_eq!(custody.vault_balance(asset(1)), U256::from(20));
    }

    #[test]
    fn test_transfer_out_limited_by_vault() {
        let custody = InMemoryCustody::new();
        let bob = asset(101);
        assert!(custody.transfer_out(asset(1), bob, U256::one()).is_err());

        custody.mint(asset(1), asset(100), U256::from(10)).unwrap();
        custody.transfer_in(asset(1), asset(100), U256::from(10)).unwrap();
        custody.transfer_out(asset(1), bob, U256::from(4)).unwrap();
        assert_eq!(custody.balance_of(asset(1), bob), U256::from(4));
        assert_eq!(custody.vault_balance(asset(1)), U256::from(6));
    }

    /// Custody that accepts deposits but refuses every payout
    struct NoPayouts(InMemoryCustody);

    impl AssetTransfer for NoPayouts {
        fn transfer_in(&self, asset: AssetId, from: OwnerId, amount: U256) -> AmmResult<()> {
            self.0.transfer_in(asset, from, amount)
        }

        fn transfer_out(&self, _asset: AssetId, _to: OwnerId, _amount: U256) -> AmmResult<()> {
            Err(AmmError::CustodyRejected("payouts disabled".to_string()))
        }

        fn balance_of(&self, asset: AssetId, holder: OwnerId) -> U256 {
            self.0.balance_of(asset, holder)
        }
    }

    #[test]
    fn test_failed_remainder_payout_is_reported() {
        let exchange = Arc::new(
            Exchange::with_clock(EngineSettings::default(), Arc::new(ManualClock::new(0)))
                .unwrap(),
        );
        let (a, b, alice) = (asset(1), asset(2), asset(100));
        let deposit = |amount_a: u64, amount_b: u64| AddLiquidityParams {
            asset_a: a,
            asset_b: b,
            amount_a_desired: units(amount_a),
            amount_b_desired: units(amount_b),
            amount_a_min: U256::zero(),
            amount_b_min: U256::zero(),
            recipient: alice,
            deadline: 60,
        };
        // Seed the 1:1 pool directly so the settled deposit is the second one
        exchange.add_liquidity(&deposit(1000, 1000)).unwrap();

        let custody = InMemoryCustody::new();
        custody.mint(a, alice, units(100)).unwrap();
        custody.mint(b, alice, units(300)).unwrap();
        let settled = SettledExchange::new(Arc::clone(&exchange), NoPayouts(custody));

        // Only 100 of the 300 B fit the ratio; the 200 B remainder cannot be paid back
        let err = settled.add_liquidity(alice, &deposit(100, 300)).unwrap_err();
        assert!(matches!(err, AmmError::CustodyRejected(_)));
        assert_eq!(exchange.get_reserves(a, b).unwrap(), (units(1100), units(1100)));
    }

    #[test]
    fn test_exact_deposit_needs_no_payout() {
        let exchange = Arc::new(
            Exchange::with_clock(EngineSettings::default(), Arc::new(ManualClock::new(0)))
                .unwrap(),
        );
        let alice = asset(100);
        let custody = InMemoryCustody::new();
        custody.mint(asset(1), alice, units(10)).unwrap();
        custody.mint(asset(2), alice, units(10)).unwrap();
        let settled = SettledExchange::new(exchange, NoPayouts(custody));

        let receipt = settled
            .add_liquidity(
                alice,
                &AddLiquidityParams {
                    asset_a: asset(1),
                    asset_b: asset(2),
                    amount_a_desired: units(10),
                    amount_b_desired: units(10),
                    amount_a_min: U256::zero(),
                    amount_b_min: U256::zero(),
                    recipient: alice,
                    deadline: 60,
                },
            )
            .unwrap();
        assert_eq!(receipt.amount_b, units(10));
    }
}
