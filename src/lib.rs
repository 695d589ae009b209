//! Fairdraw: an autonomous, verifiably-fair raffle.
//!
//! Participants pay a fixed entrance fee into a pooled account while the
//! raffle is open. Once the configured interval has elapsed and the round has
//! entrants, an off-chain automation trigger performs upkeep: entries close
//! and a random word is requested from an external coordinator. The
//! coordinator later delivers the word in a separate transaction, the winner
//! is picked by a single modulo reduction, the whole pool is paid out, and
//! the raffle resets for the next round.

pub mod error;
pub mod instruction;
pub mod oracle;
pub mod processor;
pub mod state;

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;

use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey,
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process(program_id, accounts, instruction_data)
}
