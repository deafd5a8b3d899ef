//! Property-based tests for the pool invariants.
//!
//! Random sequences of deposits, withdrawals, rewards and rejected calls are
//! replayed against a fresh ledger. After every step:
//!
//! - the sum of all balances never exceeds `total_value`
//! - value flows balance against the pool aggregates
//! - a rejected call leaves the state digest unchanged

use proptest::prelude::*;
use sharepool_ledger::{EventJournal, InMemoryCustody, ShareLedger, SingleOperator, ValueCustody};
use sharepool_types::{AccountId, PoolConfig, SharePoolError, Value};

type Pool = ShareLedger<SingleOperator, InMemoryCustody, EventJournal>;

const PARTICIPANTS: usize = 5;

#[derive(Debug, Clone)]
enum Op {
    Deposit { who: usize, amount: Value },
    Withdraw { who: usize },
    Reward { amount: Value },
    /// A reward attempted by a participant instead of the operator.
    RogueReward { who: usize, amount: Value },
    ZeroDeposit { who: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..PARTICIPANTS, 1..1_000_000_000u128)
            .prop_map(|(who, amount)| Op::Deposit { who, amount }),
        2 => (0..PARTICIPANTS).prop_map(|who| Op::Withdraw { who }),
        2 => (1..1_000_000_000u128).prop_map(|amount| Op::Reward { amount }),
        1 => (0..PARTICIPANTS, 1..1_000u128)
            .prop_map(|(who, amount)| Op::RogueReward { who, amount }),
        1 => (0..PARTICIPANTS).prop_map(|who| Op::ZeroDeposit { who }),
    ]
}

fn accounts() -> Vec<AccountId> {
    (0..PARTICIPANTS)
        .map(|i| AccountId::from_bytes([u8::try_from(i + 1).unwrap(); 20]))
        .collect()
}

/// Apply `op`, returning whether the ledger accepted it.
fn apply(pool: &mut Pool, team: AccountId, people: &[AccountId], op: &Op) -> bool {
    match *op {
        Op::Deposit { who, amount } => {
            let account = people[who];
            pool.custody_mut().debit_on_receipt(account, amount).unwrap();
            match pool.deposit(account, amount) {
                Ok(_) => true,
                Err(SharePoolError::DepositTooSmall { .. }) => {
                    // Boundary layer hands the value back.
                    pool.custody_mut().credit(account, amount).unwrap();
                    false
                }
                Err(e) => panic!("unexpected deposit error: {e}"),
            }
        }
        Op::Withdraw { who } => pool.withdraw(people[who]).is_ok(),
        Op::Reward { amount } => {
            pool.custody_mut().debit_on_receipt(team, amount).unwrap();
            if pool.deposit_reward(team, amount).is_ok() {
                true
            } else {
                pool.custody_mut().credit(team, amount).unwrap();
                false
            }
        }
        Op::RogueReward { who, amount } => pool.deposit_reward(people[who], amount).is_ok(),
        Op::ZeroDeposit { who } => pool.deposit(people[who], 0).is_ok(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: Σ balance_of ≤ total_value after every operation, and the
    /// flow totals always match the pool.
    #[test]
    fn balances_never_exceed_pool_value(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let team = AccountId::from_bytes([0xEE; 20]);
        let people = accounts();
        let mut pool: Pool = ShareLedger::from_config(
            &PoolConfig::new(team),
            InMemoryCustody::new(),
            EventJournal::default(),
        );

        for op in &ops {
            let before = pool.state_digest();
            let accepted = apply(&mut pool, team, &people, op);
            if !accepted {
                prop_assert_eq!(pool.state_digest(), before, "rejected {:?} mutated state", op);
            }

            let claimed: Value = people.iter().map(|p| pool.balance_of(p)).sum();
            prop_assert!(claimed <= pool.total_value());
            prop_assert!(pool.verify_conservation().is_ok());
            prop_assert_eq!(pool.custody().held(), pool.total_value());
        }
    }

    /// Property: without rewards, every participant gets back exactly what
    /// they put in.
    #[test]
    fn no_rewards_means_exact_refunds(
        deposits in prop::collection::vec((0..PARTICIPANTS, 1..u128::from(u64::MAX)), 1..20),
    ) {
        let team = AccountId::from_bytes([0xEE; 20]);
        let people = accounts();
        let mut pool: Pool = ShareLedger::from_config(
            &PoolConfig::new(team),
            InMemoryCustody::new(),
            EventJournal::default(),
        );
        let mut put_in = [0u128; PARTICIPANTS];

        for &(who, amount) in &deposits {
            pool.custody_mut().debit_on_receipt(people[who], amount).unwrap();
            pool.deposit(people[who], amount).unwrap();
            put_in[who] += amount;
        }
        for (who, account) in people.iter().enumerate() {
            prop_assert_eq!(pool.balance_of(account), put_in[who]);
            if put_in[who] > 0 {
                prop_assert_eq!(pool.withdraw(*account).unwrap().amount_paid, put_in[who]);
            }
        }
        prop_assert!(pool.snapshot().is_empty());
    }

    /// Property: when the reward divides evenly over total shares, balances
    /// sum to total_value exactly (no dust).
    #[test]
    fn even_rewards_leave_no_dust(
        units in prop::collection::vec(1..1_000u128, 1..PARTICIPANTS),
        per_share in 1..1_000u128,
    ) {
        let team = AccountId::from_bytes([0xEE; 20]);
        let people = accounts();
        let mut pool: Pool = ShareLedger::from_config(
            &PoolConfig::new(team),
            InMemoryCustody::new(),
            EventJournal::default(),
        );

        for (i, &amount) in units.iter().enumerate() {
            pool.custody_mut().debit_on_receipt(people[i], amount).unwrap();
            pool.deposit(people[i], amount).unwrap();
        }
        let reward = pool.total_shares() * per_share;
        pool.custody_mut().debit_on_receipt(team, reward).unwrap();
        pool.deposit_reward(team, reward).unwrap();

        let claimed: Value = people.iter().map(|p| pool.balance_of(p)).sum();
        prop_assert_eq!(claimed, pool.total_value());
        for (i, &amount) in units.iter().enumerate() {
            prop_assert_eq!(pool.balance_of(&people[i]), amount * (per_share + 1));
        }
    }
}
