// Fairdraw Raffle Program - Randomness coordinator interface
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    instruction::{AccountMeta, Instruction},
    msg,
    program::{get_return_data, invoke},
    program_error::ProgramError,
};

/// Confirmations the coordinator waits for before delivering
pub const REQUEST_CONFIRMATIONS: u16 = 3;

/// Words requested per draw; the winner is taken from the first
pub const NUM_WORDS: u32 = 1;

/// Wire format of a randomness request, borsh-encoded into the coordinator
/// instruction data. The coordinator assigns a request id and publishes it
/// as return data.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RandomnessRequest {
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

/// Request random words from the coordinator program.
///
/// Issues the request CPI and reads back the id the coordinator assigned.
/// Returns immediately; delivery arrives later as a separate
/// fulfill_random_words call gated on this id.
pub fn request_random_words<'a>(
    coordinator_info: &AccountInfo<'a>,
    requester_info: &AccountInfo<'a>,
    key_hash: &[u8; 32],
    subscription_id: u64,
    callback_gas_limit: u32,
) -> Result<u64, ProgramError> {
    let request = RandomnessRequest {
        key_hash: *key_hash,
        subscription_id,
        request_confirmations: REQUEST_CONFIRMATIONS,
        callback_gas_limit,
        num_words: NUM_WORDS,
    };
    let data = borsh::to_vec(&request).map_err(|_| ProgramError::InvalidInstructionData)?;

    let instruction = Instruction {
        program_id: *coordinator_info.key,
        accounts: vec![AccountMeta::new_readonly(*requester_info.key, false)],
        data,
    };

    invoke(
        &instruction,
        &[coordinator_info.clone(), requester_info.clone()],
    )?;

    // The id assigned by the coordinator comes back as return data
    let (returning_program, return_data) = get_return_data().ok_or_else(|| {
        msg!("Coordinator did not return a request id");
        ProgramError::InvalidAccountData
    })?;
    if returning_program != *coordinator_info.key {
        msg!("Request id returned by unexpected program {}", returning_program);
        return Err(ProgramError::InvalidAccountData);
    }
    let id_bytes: [u8; 8] = return_data.as_slice().try_into().map_err(|_| {
        msg!("Coordinator returned a malformed request id");
        ProgramError::InvalidAccountData
    })?;

    Ok(u64::from_le_bytes(id_bytes))
}
