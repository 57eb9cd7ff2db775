use balance_engine::application::engine::BalanceEngine;
use balance_engine::config::EngineConfig;
use balance_engine::domain::account::{AccountId, Balance};
use balance_engine::domain::mutation::Mutation;
use balance_engine::error::LedgerError;
use balance_engine::infrastructure::in_memory::InMemoryAccountStore;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

fn engine() -> Arc<BalanceEngine> {
    let config = EngineConfig {
        max_attempts: 10_000,
        initial_backoff: Duration::from_micros(50),
        max_backoff: Duration::from_millis(2),
    };
    Arc::new(BalanceEngine::new(
        Box::new(InMemoryAccountStore::new()),
        config,
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_account_lifecycle_scenario() {
    let engine = engine();
    let u1 = AccountId::new("u1").unwrap();

    let balance = engine
        .apply(Mutation::deposit(u1.clone(), dec!(100)))
        .await
        .unwrap();
    assert_eq!(balance, Balance::new(dec!(100)));

    let balance = engine
        .apply(Mutation::withdraw(u1.clone(), dec!(30)))
        .await
        .unwrap();
    assert_eq!(balance, Balance::new(dec!(70)));

    let rejected = engine
        .apply(Mutation::withdraw(u1.clone(), dec!(1000)))
        .await;
    assert!(matches!(
        rejected,
        Err(LedgerError::InsufficientFunds { .. })
    ));
    assert_eq!(engine.get_balance(&u1).await.unwrap(), Balance::new(dec!(70)));

    let ten = tokio::spawn({
        let engine = engine.clone();
        let u1 = u1.clone();
        async move { engine.apply(Mutation::deposit(u1, dec!(10))).await }
    });
    let twenty = tokio::spawn({
        let engine = engine.clone();
        let u1 = u1.clone();
        async move { engine.apply(Mutation::deposit(u1, dec!(20))).await }
    });
    ten.await.unwrap().unwrap();
    twenty.await.unwrap().unwrap();

    assert_eq!(
        engine.get_balance(&u1).await.unwrap(),
        Balance::new(dec!(100))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_random_concurrent_mutations_are_serializable() {
    let engine = engine();
    let account = AccountId::new("shared").unwrap();

    let mut rng = rand::thread_rng();
    let mutations: Vec<Mutation> = (0..400)
        .map(|_| {
            let amount = Decimal::from(rng.gen_range(1..=50i64));
            if rng.gen_range(0..3) == 0 {
                Mutation::withdraw(account.clone(), amount)
            } else {
                Mutation::deposit(account.clone(), amount)
            }
        })
        .collect();

    let mut handles = Vec::new();
    for mutation in mutations {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let delta = match &mutation {
                Mutation::Deposit { amount, .. } => *amount,
                Mutation::Withdraw { amount, .. } => -*amount,
            };
            engine.apply(mutation).await.map(|balance| (delta, balance))
        }));
    }

    let mut expected = Decimal::ZERO;
    for handle in handles {
        match handle.await.unwrap() {
            Ok((delta, balance)) => {
                assert!(balance >= Balance::ZERO);
                expected += delta;
            }
            Err(LedgerError::InsufficientFunds { .. } | LedgerError::AccountNotFound(_)) => {}
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }

    assert_eq!(
        engine.get_balance(&account).await.unwrap(),
        Balance::new(expected)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_never_overdraw() {
    let engine = engine();
    let account = AccountId::new("u1").unwrap();
    engine
        .apply(Mutation::deposit(account.clone(), dec!(100)))
        .await
        .unwrap();

    // 50 withdrawals of 10 against a balance of 100: exactly 10 can succeed.
    let mut handles = Vec::new();
    for _ in 0..50 {
        let engine = engine.clone();
        let account = account.clone();
        handles.push(tokio::spawn(async move {
            engine.apply(Mutation::withdraw(account, dec!(10))).await
        }));
    }

    let mut committed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(LedgerError::InsufficientFunds { .. }) => {}
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }

    assert_eq!(committed, 10);
    assert_eq!(engine.get_balance(&account).await.unwrap(), Balance::ZERO);
}
