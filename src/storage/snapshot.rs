use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::config::EngineConfig;
use crate::core::state::{AccountState, FinalSettlement, PerpetualState};
use crate::error::{Error, Result};
use crate::liquidation::{Deleveraging, Liquidation};
use crate::matching::{OrderStatus, Orders};
use crate::storage::layout::{decode_account, decode_index, encode_account, encode_index};
use crate::types::ids::{AccountId, OrderHash};
use crate::types::index::FundingRate;
use crate::types::price::Price;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Point-in-time copy of the engine, with balances and indexes in their
/// packed record form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    /// Sequence the next committed event will take.
    pub sequence: u64,
    pub timestamp: u64,
    pub global_index: Vec<u8>,
    pub funding_rate: Option<Vec<u8>>,
    pub accounts: Vec<(AccountId, Vec<u8>)>,
    pub min_collateral: BigUint,
    pub vault_balance: BigUint,
    pub global_operators: Vec<AccountId>,
    pub local_operators: Vec<(AccountId, AccountId)>,
    pub order_statuses: Vec<(OrderHash, OrderStatus)>,
    pub filled_amounts: Vec<(OrderHash, BigUint)>,
    pub deleveraging_marks: Vec<(AccountId, u64)>,
    pub final_settlement: Option<(Price, Vec<u8>)>,
    pub checksum: String,
}

impl Snapshot {
    pub fn capture(
        state: &PerpetualState,
        funding_rate: Option<&FundingRate>,
        sequence: u64,
        timestamp: u64,
    ) -> Result<Self> {
        let mut accounts = state
            .accounts
            .iter()
            .map(|(id, account)| Ok((*id, encode_account(&account.local_index, &account.balance)?.to_vec())))
            .collect::<Result<Vec<_>>>()?;
        accounts.sort_by(|a, b| a.0.cmp(&b.0));

        let mut global_operators: Vec<_> = state.global_operators.iter().copied().collect();
        global_operators.sort();
        let mut local_operators: Vec<_> = state.local_operators.iter().copied().collect();
        local_operators.sort();
        let mut order_statuses: Vec<_> = state.orders.statuses().map(|(h, s)| (*h, *s)).collect();
        order_statuses.sort_by(|a, b| a.0.cmp(&b.0));
        let mut filled_amounts: Vec<_> = state.orders.filled_amounts().map(|(h, f)| (*h, f.clone())).collect();
        filled_amounts.sort_by(|a, b| a.0.cmp(&b.0));
        let mut deleveraging_marks: Vec<_> = state.deleveraging.marks().map(|(a, t)| (*a, *t)).collect();
        deleveraging_marks.sort();

        let final_settlement = match &state.final_settlement {
            Some(fs) => Some((fs.price.clone(), encode_index(&fs.index)?.to_vec())),
            None => None,
        };

        let mut snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            sequence,
            timestamp,
            global_index: encode_index(&state.global_index)?.to_vec(),
            funding_rate: funding_rate.map(encode_index).transpose()?.map(|r| r.to_vec()),
            accounts,
            min_collateral: state.min_collateral.clone(),
            vault_balance: state.vault_balance.clone(),
            global_operators,
            local_operators,
            order_statuses,
            filled_amounts,
            deleveraging_marks,
            final_settlement,
            checksum: String::new(),
        };
        snapshot.checksum = snapshot.calculate_checksum()?;
        Ok(snapshot)
    }

    fn calculate_checksum(&self) -> Result<String> {
        let mut unsealed = self.clone();
        unsealed.checksum = String::new();
        let payload = bincode::serialize(&unsealed)
            .map_err(|e| Error::SerializationError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&payload);
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn verify_checksum(&self) -> bool {
        self.calculate_checksum()
            .map(|calculated| calculated == self.checksum)
            .unwrap_or(false)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Decode and verify version and checksum.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = bincode::deserialize(bytes)
            .map_err(|e| Error::SerializationError(e.to_string()))?;
        snapshot.verify()?;
        Ok(snapshot)
    }

    pub fn verify(&self) -> Result<()> {
        if self.version > SNAPSHOT_VERSION {
            return Err(Error::UnsupportedSnapshotVersion {
                version: self.version,
                max_supported: SNAPSHOT_VERSION,
            });
        }
        if !self.verify_checksum() {
            return Err(Error::InvalidChecksum);
        }
        Ok(())
    }

    pub fn funding_rate(&self) -> Result<Option<FundingRate>> {
        self.funding_rate.as_deref().map(decode_index).transpose()
    }

    /// Rebuild engine state. Trader configuration comes from `config`;
    /// everything else from the snapshot.
    pub fn restore(&self, config: &EngineConfig) -> Result<PerpetualState> {
        self.verify()?;

        let mut state = PerpetualState::new(config, 0);
        state.global_index = decode_index(&self.global_index)?;
        state.min_collateral = self.min_collateral.clone();
        state.vault_balance = self.vault_balance.clone();
        for (id, record) in &self.accounts {
            let record = decode_account(record)?;
            state.accounts.insert(*id, AccountState {
                balance: record.balance,
                local_index: record.local_index,
            });
        }
        state.global_operators = self.global_operators.iter().copied().collect();
        state.local_operators = self.local_operators.iter().copied().collect();
        state.orders = Orders::from_parts(self.order_statuses.iter().copied(), self.filled_amounts.iter().cloned());
        state.liquidation = Liquidation;
        state.deleveraging = Deleveraging::with_marks(config.deleveraging.clone(), self.deleveraging_marks.iter().copied());
        state.final_settlement = match &self.final_settlement {
            Some((price, index)) => Some(FinalSettlement {
                price: price.clone(),
                index: decode_index(index)?,
            }),
            None => None,
        };
        Ok(state)
    }
}
