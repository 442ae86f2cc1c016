use crate::core::state::PerpetualState;
use crate::error::{Error, InvariantViolation, Result};
use crate::types::signed::SignedValue;

pub struct InvariantChecks;

impl InvariantChecks {
    /// Every long is matched by a short. Final settlement withdrawals close
    /// positions one side at a time, so the check is skipped once enabled.
    pub fn check_positions_net_zero(state: &PerpetualState) -> Result<()> {
        if state.final_settlement.is_some() {
            return Ok(());
        }

        let net = state
            .accounts
            .values()
            .fold(SignedValue::zero(), |acc, account| acc.signed_add(&account.balance.position));

        if !net.is_zero() {
            return Err(Error::InvariantViolation(InvariantViolation {
                invariant: "positions_net_zero",
                details: format!("Open positions sum to {}", net),
            }));
        }
        Ok(())
    }

    /// No account can have been settled past the global index.
    pub fn check_local_indexes_not_ahead(state: &PerpetualState) -> Result<()> {
        for (account, entry) in state.accounts.iter() {
            if entry.local_index.timestamp > state.global_index.timestamp {
                return Err(Error::InvariantViolation(InvariantViolation {
                    invariant: "local_index_not_ahead",
                    details: format!(
                        "Account {} settled at {} but global index is at {}",
                        account, entry.local_index.timestamp, state.global_index.timestamp
                    ),
                }));
            }
        }
        Ok(())
    }

    pub fn check_index_not_in_future(state: &PerpetualState, now: u64) -> Result<()> {
        if state.global_index.timestamp > now {
            return Err(Error::InvariantViolation(InvariantViolation {
                invariant: "index_not_in_future",
                details: format!(
                    "Global index at {} is ahead of the clock at {}",
                    state.global_index.timestamp, now
                ),
            }));
        }
        Ok(())
    }

    pub fn check_all(state: &PerpetualState, now: u64) -> Result<()> {
        Self::check_positions_net_zero(state)?;
        Self::check_local_indexes_not_ahead(state)?;
        Self::check_index_not_in_future(state, now)?;
        Ok(())
    }
}
