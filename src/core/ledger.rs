//! Balance ledger
//!
//! Replays a selected chain, genesis first, into per-key balances. Each
//! reward credits one coin; each spend moves one coin from the previous
//! recipient to the new one.

use crate::core::block::Block;
use crate::crypto::{Hash256, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Ledger replay errors
#[derive(Error, Debug, PartialEq)]
pub enum LedgerError {
    #[error("Block at height {height} spends unknown transaction {input}")]
    UnknownInput { height: u32, input: Hash256 },
}

/// One row of the balance report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub pubkey_x: String,
    pub pubkey_y: String,
    pub balance: i64,
}

/// Balances keyed by public key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceTable {
    balances: HashMap<PublicKey, i64>,
}

impl BalanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay a chain given in ascending height order.
    ///
    /// The transaction index is filled as blocks are applied, so a spend
    /// can only resolve to a transaction at or below its own block.
    pub fn replay<'a, I>(chain: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = &'a Block>,
    {
        let mut table = Self::new();
        let mut recipients: HashMap<Hash256, PublicKey> = HashMap::new();

        for block in chain {
            let reward = &block.reward_tx;
            table.add(&reward.dest_pubkey, 1);
            recipients.insert(reward.hash(), reward.dest_pubkey);

            let spend = &block.normal_tx;
            if spend.has_input() {
                let input = spend.prev_transaction_hash;
                let from = recipients
                    .get(&input)
                    .copied()
                    .ok_or(LedgerError::UnknownInput {
                        height: block.height,
                        input,
                    })?;
                table.add(&spend.dest_pubkey, 1);
                table.add(&from, -1);
                recipients.insert(spend.hash(), spend.dest_pubkey);
            }
        }

        Ok(table)
    }

    /// Add (or subtract) an amount for a key
    pub fn add(&mut self, pubkey: &PublicKey, amount: i64) {
        *self.balances.entry(*pubkey).or_insert(0) += amount;
    }

    pub fn get(&self, pubkey: &PublicKey) -> Option<i64> {
        self.balances.get(pubkey).copied()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// All balances sorted by key
    pub fn entries(&self) -> Vec<(PublicKey, i64)> {
        let mut entries: Vec<(PublicKey, i64)> =
            self.balances.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|entry| entry.0);
        entries
    }

    /// Sorted rows for serialisation
    pub fn report(&self) -> Vec<BalanceEntry> {
        self.entries()
            .into_iter()
            .map(|(key, balance)| BalanceEntry {
                pubkey_x: key.x_hex(),
                pubkey_y: key.y_hex(),
                balance,
            })
            .collect()
    }

    /// Total coins in circulation, one per block
    pub fn total(&self) -> i64 {
        self.balances.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::test_utils::TestChain;

    #[test]
    fn test_empty_chain() {
        let table = BalanceTable::replay(std::iter::empty::<&Block>()).unwrap();
        assert!(table.is_empty());
        assert!(table.entries().is_empty());
    }

    #[test]
    fn test_rewards_credit_one_coin() {
        let chain = TestChain::new();
        let g = chain.genesis();
        let k = KeyPair::generate();
        let b1 = chain.block_at(&g, 1, &k, None);
        let b2 = chain.block_at(&b1, 2, &k, None);

        let table = BalanceTable::replay([&g, &b1, &b2]).unwrap();
        assert_eq!(table.get(&k.public_key()), Some(2));
        assert_eq!(table.get(&chain.genesis_key.public_key()), Some(1));
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn test_spend_moves_coin() {
        let chain = TestChain::new();
        let g = chain.genesis();
        let k1 = KeyPair::generate();
        let k3 = KeyPair::generate();
        let b1 = chain.block_at(&g, 1, &k1, None);
        let spend = chain.spend_tx(2, &b1.reward_tx, &k1, k3.public_key());
        let b2 = chain.block_at(&b1, 2, &KeyPair::generate(), Some(spend));

        let table = BalanceTable::replay([&g, &b1, &b2]).unwrap();
        assert_eq!(table.get(&k1.public_key()), Some(0));
        assert_eq!(table.get(&k3.public_key()), Some(1));
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn test_spent_output_can_be_spent_onwards() {
        let chain = TestChain::new();
        let g = chain.genesis();
        let k1 = KeyPair::generate();
        let k2 = KeyPair::generate();
        let k3 = KeyPair::generate();
        let b1 = chain.block_at(&g, 1, &k1, None);
        let first = chain.spend_tx(2, &b1.reward_tx, &k1, k2.public_key());
        let b2 = chain.block_at(&b1, 2, &KeyPair::generate(), Some(first));
        let second = chain.spend_tx(3, &b2.normal_tx, &k2, k3.public_key());
        let b3 = chain.block_at(&b2, 3, &KeyPair::generate(), Some(second));

        let table = BalanceTable::replay([&g, &b1, &b2, &b3]).unwrap();
        assert_eq!(table.get(&k1.public_key()), Some(0));
        assert_eq!(table.get(&k2.public_key()), Some(0));
        assert_eq!(table.get(&k3.public_key()), Some(1));
    }

    #[test]
    fn test_unknown_input_is_an_error() {
        let chain = TestChain::new();
        let g = chain.genesis();
        let k1 = KeyPair::generate();
        let b1 = chain.block_at(&g, 1, &k1, None);
        let spend = chain.spend_tx(2, &b1.reward_tx, &k1, k1.public_key());
        let b2 = chain.block_at(&b1, 2, &KeyPair::generate(), Some(spend));

        // b1 left out of the replay
        let err = BalanceTable::replay([&g, &b2]).unwrap_err();
        assert_eq!(
            err,
            LedgerError::UnknownInput {
                height: 2,
                input: b1.reward_tx.hash()
            }
        );
    }

    #[test]
    fn test_entries_are_sorted_by_key() {
        let mut table = BalanceTable::new();
        let keys: Vec<PublicKey> = (0..5).map(|_| KeyPair::generate().public_key()).collect();
        for key in &keys {
            table.add(key, 1);
        }

        let entries = table.entries();
        assert_eq!(entries.len(), 5);
        assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));

        let report = table.report();
        assert_eq!(report[0].pubkey_x, entries[0].0.x_hex());
        assert_eq!(report[0].balance, 1);
    }
}
