// Fairdraw Raffle Program - Errors
use solana_program::{decode_error::DecodeError, program_error::ProgramError};
use thiserror::Error;

/// Errors that may be returned by the raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstruction,

    /// Raffle account already holds an initialized raffle
    #[error("Raffle account is already initialized")]
    AlreadyInitialized,

    /// Raffle account has not been initialized
    #[error("Raffle account is not initialized")]
    NotInitialized,

    /// Entry paid less than the entrance fee
    #[error("Payment is below the entrance fee")]
    NotEnoughFunds,

    /// Entry attempted while a draw is in flight
    #[error("Raffle is not open")]
    RaffleNotOpen,

    /// Ledger capacity for the current round is exhausted
    #[error("Raffle is full for this round")]
    RaffleFull,

    /// Upkeep triggered before the eligibility conditions hold
    #[error("Upkeep is not needed")]
    UpkeepNotNeeded,

    /// Fulfillment carries a stale or unmatched request id
    #[error("Unknown randomness request")]
    UnknownRequest,

    /// Fulfillment was not signed by the configured oracle authority
    #[error("Caller is not the oracle authority")]
    OracleAuthorityMismatch,

    /// Fulfillment did not supply the winning entrant's account
    #[error("Winner account was not supplied")]
    WinnerAccountMissing,

    /// Prize transfer could not complete
    #[error("Prize transfer failed")]
    TransferFailed,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}
