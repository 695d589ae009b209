// Fairdraw Raffle Program - State
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp, program_error::ProgramError, program_pack::IsInitialized, pubkey::Pubkey,
};

use crate::error::RaffleError;

/// Seed for the raffle PDA
pub const RAFFLE_SEED: &[u8] = b"raffle";

/// Hard capacity of the entrant ledger for one round. The raffle account is
/// allocated once, so the ledger cannot grow past this.
pub const MAX_ENTRANTS: usize = 256;

// Space calculation:
// 1 (is_initialized) +
// 8 (entrance_fee) +
// 8 (interval) +
// 32 (coordinator) +
// 32 (oracle_authority) +
// 32 (key_hash) +
// 8 (subscription_id) +
// 4 (callback_gas_limit) +
// 1 (state) +
// 8 (last_timestamp) +
// 8 (pool_lamports) +
// 4 + 32 * MAX_ENTRANTS (entrants) +
// 9 (pending_request: Option<u64>) +
// 33 (recent_winner: Option<Pubkey>) =
// 8380 total bytes
pub const RAFFLE_ACCOUNT_SIZE: usize =
    1 + 8 + 8 + 32 + 32 + 32 + 8 + 4 + 1 + 8 + 8 + 4 + 32 * MAX_ENTRANTS + 9 + 33;

/// Lifecycle of a raffle round
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Accepting entries
    Open,
    /// Randomness request in flight, entries blocked
    Calculating,
}

/// Snapshot returned by an upkeep check. `eligible` is the conjunction of the
/// four condition bits; the remaining fields are the diagnostic payload.
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpkeepCheck {
    pub eligible: bool,
    pub interval_elapsed: bool,
    pub pool_lamports: u64,
    pub entrant_count: u64,
    pub state: RaffleState,
}

/// Raffle account data
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Fixed entrance fee in lamports
    pub entrance_fee: u64,
    /// Round length in seconds (immutable configuration)
    pub interval: i64,
    /// Randomness coordinator program this raffle requests words from
    pub coordinator: Pubkey,
    /// Authority trusted to deliver fulfillments on the coordinator's behalf
    pub oracle_authority: Pubkey,
    /// Gas-lane identifier forwarded with every randomness request
    pub key_hash: [u8; 32],
    /// Coordinator subscription funding the requests
    pub subscription_id: u64,
    /// Gas limit forwarded for the fulfillment callback
    pub callback_gas_limit: u32,
    /// Lifecycle state of the current round
    pub state: RaffleState,
    /// Timestamp of the last round reset
    pub last_timestamp: UnixTimestamp,
    /// Sum of entrance fees received since the last reset
    pub pool_lamports: u64,
    /// Entrants of the current round, in entry order; duplicates allowed,
    /// each entry is one selection slot
    pub entrants: Vec<Pubkey>,
    /// Outstanding randomness request id, at most one at a time
    pub pending_request: Option<u64>,
    /// Last winner paid out, kept for observability only
    pub recent_winner: Option<Pubkey>,
}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Raffle {
    /// Create a fresh raffle: open, empty ledger, clock set to `now`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entrance_fee: u64,
        interval: i64,
        coordinator: Pubkey,
        oracle_authority: Pubkey,
        key_hash: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
        now: UnixTimestamp,
    ) -> Self {
        Self {
            is_initialized: true,
            entrance_fee,
            interval,
            coordinator,
            oracle_authority,
            key_hash,
            subscription_id,
            callback_gas_limit,
            state: RaffleState::Open,
            last_timestamp: now,
            pool_lamports: 0,
            entrants: Vec::new(),
            pending_request: None,
            recent_winner: None,
        }
    }

    /// Has the configured interval elapsed since the last reset
    pub fn interval_elapsed(&self, now: UnixTimestamp) -> bool {
        now - self.last_timestamp >= self.interval
    }

    /// Evaluate upkeep eligibility. Pure read, no state mutation; safe to
    /// call at any time from any caller.
    pub fn check_upkeep(&self, now: UnixTimestamp) -> UpkeepCheck {
        let interval_elapsed = self.interval_elapsed(now);
        let eligible = self.state == RaffleState::Open
            && interval_elapsed
            && !self.entrants.is_empty()
            && self.pool_lamports > 0;
        UpkeepCheck {
            eligible,
            interval_elapsed,
            pool_lamports: self.pool_lamports,
            entrant_count: self.entrants.len() as u64,
            state: self.state,
        }
    }

    /// Record the outstanding request id. Overwrites any previous value;
    /// entry and upkeep are blocked while Calculating, so at most one
    /// request is ever in flight.
    pub fn record_request(&mut self, request_id: u64) {
        self.pending_request = Some(request_id);
    }

    /// Clear the outstanding id only if `request_id` matches it. On a
    /// mismatch the stored id is left untouched.
    pub fn validate_and_clear_request(&mut self, request_id: u64) -> bool {
        if self.pending_request == Some(request_id) {
            self.pending_request = None;
            true
        } else {
            false
        }
    }

    /// Winner slot for a delivered random word: a single modulo reduction
    /// over the entrant count. None if the ledger is empty.
    pub fn winner_index(&self, random_word: u64) -> Option<usize> {
        if self.entrants.is_empty() {
            return None;
        }
        Some((random_word % self.entrants.len() as u64) as usize)
    }

    /// Reset for the next round: clear the ledger, zero the pool, restart
    /// the clock, reopen. Only called after a successful payout.
    pub fn reset_round(&mut self, now: UnixTimestamp) {
        self.entrants.clear();
        self.pool_lamports = 0;
        self.last_timestamp = now;
        self.state = RaffleState::Open;
    }

    /// Deserialize a raffle from account data. The account is allocated at
    /// `RAFFLE_ACCOUNT_SIZE`, so trailing bytes past the serialized ledger
    /// are expected and ignored.
    pub fn load(data: &[u8]) -> Result<Self, ProgramError> {
        Self::deserialize(&mut &data[..]).map_err(|_| ProgramError::InvalidAccountData)
    }

    /// Serialize the raffle back into account data
    pub fn store(&self, data: &mut [u8]) -> Result<(), ProgramError> {
        self.serialize(&mut &mut data[..])
            .map_err(|_| ProgramError::AccountDataTooSmall)
    }
}

/// Find the program derived address of the raffle account
pub fn find_raffle_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[RAFFLE_SEED], program_id)
}

/// Map an account-level initialization check to the raffle error space
pub fn check_initialized(raffle: &Raffle) -> Result<(), ProgramError> {
    if !raffle.is_initialized() {
        return Err(RaffleError::NotInitialized.into());
    }
    Ok(())
}
