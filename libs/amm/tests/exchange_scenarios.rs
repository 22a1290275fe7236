//! End-to-end exchange scenarios
//!
//! Drives the public API the way a submission layer would: deposits,
//! withdrawals and swaps settled through in-memory custody, deadline
//! enforcement, and concurrent traders sharing one exchange.

use pairswap_amm::fixed_point::{product, units};
use pairswap_amm::{
    AddLiquidityParams, Address, AmmError, AssetId, AssetTransfer, Exchange, InMemoryCustody,
    ManualClock, RemoveLiquidityParams, SettledExchange, SwapParams, U256,
    LOCKED_LIQUIDITY_OWNER,
};
use pairswap_config::EngineSettings;
use std::sync::Arc;

const NOW: u64 = 1_700_000_000;

fn asset(n: u64) -> AssetId {
    Address::from_low_u64_be(n)
}

fn exchange() -> (Exchange, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(NOW));
    let exchange = Exchange::with_clock(EngineSettings::default(), clock.clone()).unwrap();
    (exchange, clock)
}

fn deposit(
    a: AssetId,
    b: AssetId,
    amount_a: U256,
    amount_b: U256,
    to: Address,
) -> AddLiquidityParams {
    AddLiquidityParams {
        asset_a: a,
        asset_b: b,
        amount_a_desired: amount_a,
        amount_b_desired: amount_b,
        amount_a_min: U256::zero(),
        amount_b_min: U256::zero(),
        recipient: to,
        deadline: NOW + 60,
    }
}

#[test]
fn first_deposit_sets_reserves() {
    let (exchange, _) = exchange();
    let receipt = exchange
        .add_liquidity(&deposit(asset(1), asset(2), units(1000), units(1000), asset(100)))
        .unwrap();

    assert_eq!(receipt.amount_a, units(1000));
    assert_eq!(receipt.amount_b, units(1000));
    assert_eq!(
        exchange.get_reserves(asset(1), asset(2)).unwrap(),
        (units(1000), units(1000))
    );
    assert_eq!(exchange.total_liquidity(asset(1), asset(2)).unwrap(), units(1000));
    assert_eq!(
        exchange
            .liquidity_of(asset(1), asset(2), LOCKED_LIQUIDITY_OWNER)
            .unwrap(),
        U256::from(1_000)
    );
}

#[test]
fn price_follows_reserve_ratio() {
    let (exchange, _) = exchange();
    exchange
        .add_liquidity(&deposit(asset(1), asset(2), units(1000), units(2000), asset(100)))
        .unwrap();

    assert_eq!(exchange.get_price(asset(1), asset(2)).unwrap(), units(2));
    assert!(!exchange
        .quote_amount_out(units(10), asset(1), asset(2))
        .unwrap()
        .is_zero());
}

#[test]
fn price_without_pool_fails() {
    let (exchange, _) = exchange();
    assert_eq!(
        exchange.get_price(asset(1), asset(2)),
        Err(AmmError::InsufficientLiquidity)
    );
}

#[test]
fn settled_deposits_then_swap_pays_recipient() {
    let (exchange, _) = exchange();
    let settled = SettledExchange::new(Arc::new(exchange), InMemoryCustody::new());
    let (a, b) = (asset(1), asset(2));
    let (alice, bob) = (asset(100), asset(101));

    for token in [a, b] {
        settled.custody().mint(token, alice, units(10_000)).unwrap();
    }
    settled.custody().mint(a, bob, units(100)).unwrap();

    settled
        .add_liquidity(alice, &deposit(a, b, units(1000), units(1000), alice))
        .unwrap();
    let second = AddLiquidityParams {
        amount_a_min: units(900),
        amount_b_min: units(900),
        ..deposit(a, b, units(1000), units(1000), alice)
    };
    settled.add_liquidity(alice, &second).unwrap();

    let bob_b_before = settled.custody().balance_of(b, bob);
    let receipt = settled
        .swap_exact_tokens_for_tokens(
            bob,
            &SwapParams {
                amount_in: units(100),
                amount_out_min: units(80),
                path: vec![a, b],
                recipient: bob,
                deadline: NOW + 60,
            },
        )
        .unwrap();

    assert!(receipt.amount_out >= units(80));
    assert!(settled.custody().balance_of(b, bob) > bob_b_before);
    assert_eq!(settled.custody().balance_of(a, bob), U256::zero());

    // Vault holds exactly what the books say the pool holds
    let (reserve_a, reserve_b) = settled.exchange().get_reserves(a, b).unwrap();
    assert_eq!(settled.custody().vault_balance(a), reserve_a);
    assert_eq!(settled.custody().vault_balance(b), reserve_b);
}

#[test]
fn swap_without_funds_is_rejected_by_custody() {
    let (exchange, _) = exchange();
    let settled = SettledExchange::new(Arc::new(exchange), InMemoryCustody::new());
    let (a, b, alice, carol) = (asset(1), asset(2), asset(100), asset(102));
    for token in [a, b] {
        settled.custody().mint(token, alice, units(1000)).unwrap();
    }
    settled
        .add_liquidity(alice, &deposit(a, b, units(1000), units(1000), alice))
        .unwrap();
    let before = settled.exchange().pool_snapshot(a, b).unwrap();

    let err = settled
        .swap_exact_tokens_for_tokens(
            carol,
            &SwapParams {
                amount_in: units(5),
                amount_out_min: U256::zero(),
                path: vec![a, b],
                recipient: carol,
                deadline: NOW + 60,
            },
        )
        .unwrap_err();

    assert!(matches!(err, AmmError::CustodyRejected(_)));
    assert_eq!(settled.exchange().pool_snapshot(a, b).unwrap(), before);
}

#[test]
fn rejected_swap_returns_pulled_input() {
    let (exchange, _) = exchange();
    let settled = SettledExchange::new(Arc::new(exchange), InMemoryCustody::new());
    let (a, b, alice, bob) = (asset(1), asset(2), asset(100), asset(101));
    for token in [a, b] {
        settled.custody().mint(token, alice, units(1000)).unwrap();
    }
    settled.custody().mint(a, bob, units(10)).unwrap();
    settled
        .add_liquidity(alice, &deposit(a, b, units(1000), units(1000), alice))
        .unwrap();

    let err = settled
        .swap_exact_tokens_for_tokens(
            bob,
            &SwapParams {
                amount_in: units(10),
                amount_out_min: units(10),
                path: vec![a, b],
                recipient: bob,
                deadline: NOW + 60,
            },
        )
        .unwrap_err();

    assert!(matches!(err, AmmError::InsufficientOutputAmount { .. }));
    assert_eq!(settled.custody().balance_of(a, bob), units(10));
    assert_eq!(settled.custody().vault_balance(a), units(1000));
}

#[test]
fn expired_operations_change_nothing() {
    let (exchange, clock) = exchange();
    exchange
        .add_liquidity(&deposit(asset(1), asset(2), units(1000), units(1000), asset(100)))
        .unwrap();
    let before = exchange.pool_snapshot(asset(1), asset(2)).unwrap();

    clock.advance(61);
    let late_swap = SwapParams {
        amount_in: units(1),
        amount_out_min: U256::zero(),
        path: vec![asset(1), asset(2)],
        recipient: asset(100),
        deadline: NOW + 60,
    };
    assert_eq!(
        exchange.swap_exact_tokens_for_tokens(&late_swap),
        Err(AmmError::Expired {
            deadline: NOW + 60,
            now: NOW + 61,
        })
    );
    assert!(matches!(
        exchange.add_liquidity(&deposit(asset(1), asset(2), units(1), units(1), asset(100))),
        Err(AmmError::Expired { .. })
    ));
    let late_withdrawal = RemoveLiquidityParams {
        owner: asset(100),
        asset_a: asset(1),
        asset_b: asset(2),
        liquidity: units(10),
        amount_a_min: U256::zero(),
        amount_b_min: U256::zero(),
        recipient: asset(100),
        deadline: NOW + 60,
    };
    assert_eq!(
        exchange.remove_liquidity(&late_withdrawal),
        Err(AmmError::Expired {
            deadline: NOW + 60,
            now: NOW + 61,
        })
    );
    assert_eq!(exchange.pool_snapshot(asset(1), asset(2)).unwrap(), before);
}

#[test]
fn deadline_equal_to_now_is_accepted() {
    let (exchange, _) = exchange();
    let params = AddLiquidityParams {
        deadline: NOW,
        ..deposit(asset(1), asset(2), units(10), units(10), asset(100))
    };
    assert!(exchange.add_liquidity(&params).is_ok());
}

#[test]
fn deposit_then_full_withdrawal_returns_share() {
    let (exchange, _) = exchange();
    let (a, b, alice, bob) = (asset(1), asset(2), asset(100), asset(101));
    exchange
        .add_liquidity(&deposit(a, b, units(1000), units(1000), alice))
        .unwrap();

    let minted = exchange
        .add_liquidity(&deposit(a, b, units(500), units(500), bob))
        .unwrap()
        .liquidity_minted;
    assert_eq!(minted, units(500));

    let receipt = exchange
        .remove_liquidity(&RemoveLiquidityParams {
            owner: bob,
            asset_a: a,
            asset_b: b,
            liquidity: minted,
            amount_a_min: units(500),
            amount_b_min: units(500),
            recipient: bob,
            deadline: NOW + 60,
        })
        .unwrap();
    assert_eq!((receipt.amount_a, receipt.amount_b), (units(500), units(500)));
    assert_eq!(exchange.liquidity_of(a, b, bob).unwrap(), U256::zero());

    // The first provider can leave too; only the locked units stay behind
    let alice_units = exchange.liquidity_of(a, b, alice).unwrap();
    exchange
        .remove_liquidity(&RemoveLiquidityParams {
            owner: alice,
            asset_a: b,
            asset_b: a,
            liquidity: alice_units,
            amount_a_min: U256::zero(),
            amount_b_min: U256::zero(),
            recipient: alice,
            deadline: NOW + 60,
        })
        .unwrap();
    assert_eq!(exchange.total_liquidity(a, b).unwrap(), U256::from(1_000));
    assert_eq!(
        exchange.get_reserves(a, b).unwrap(),
        (U256::from(1_000), U256::from(1_000))
    );
}

#[test]
fn concurrent_swaps_keep_pool_consistent() {
    let (exchange, _) = exchange();
    let exchange = Arc::new(exchange);
    let (a, b) = (asset(1), asset(2));
    exchange
        .add_liquidity(&deposit(a, b, units(1_000_000), units(1_000_000), asset(100)))
        .unwrap();
    let k_initial = {
        let (reserve_a, reserve_b) = exchange.get_reserves(a, b).unwrap();
        product(reserve_a, reserve_b)
    };

    std::thread::scope(|scope| {
        for trader in 0..8u64 {
            let exchange = Arc::clone(&exchange);
            scope.spawn(move || {
                for i in 0..50u64 {
                    let path = if (trader + i) % 2 == 0 { vec![a, b] } else { vec![b, a] };
                    exchange
                        .swap_exact_tokens_for_tokens(&SwapParams {
                            amount_in: units(1 + i),
                            amount_out_min: U256::zero(),
                            path,
                            recipient: asset(200 + trader),
                            deadline: NOW + 60,
                        })
                        .unwrap();
                    assert!(exchange.get_price(a, b).is_ok());
                }
            });
        }
    });

    let stats = exchange.stats();
    assert_eq!(stats.swaps, 400);
    assert_eq!(stats.rejected, 0);

    let pool = exchange.pool_snapshot(a, b).unwrap().unwrap();
    let (reserve_a, reserve_b) = exchange.get_reserves(a, b).unwrap();
    assert!(product(reserve_a, reserve_b) >= k_initial);
    assert_eq!(pool.liquidity_sum().unwrap(), pool.total_liquidity());
}
