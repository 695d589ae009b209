// Fairdraw Raffle Program - Instructions
use arrayref::array_ref;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::error::RaffleError;

#[derive(Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Initialize the raffle
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The payer funding the raffle account
    /// 1. `[writable]` The raffle account (PDA, seed `"raffle"`)
    /// 2. `[]` The randomness coordinator program
    /// 3. `[]` The oracle authority trusted to deliver fulfillments
    /// 4. `[]` The system program
    Initialize {
        /// Fixed entrance fee in lamports
        entrance_fee: u64,
        /// Round length in seconds
        interval: i64,
        /// Gas-lane identifier forwarded to the coordinator
        key_hash: [u8; 32],
        /// Coordinator subscription funding the requests
        subscription_id: u64,
        /// Gas limit forwarded for the fulfillment callback
        callback_gas_limit: u32,
    },

    /// Enter the current round by paying at least the entrance fee
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The entrant paying the fee
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    EnterRaffle {
        /// Lamports paid into the pool
        amount: u64,
    },

    /// Evaluate upkeep eligibility without mutating anything
    ///
    /// The eligibility snapshot is published as program return data so an
    /// off-chain automation service can poll it with a simulated call.
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep,

    /// Trigger the draw: close entries and request randomness
    ///
    /// Accounts expected:
    /// 0. `[writable]` The raffle account
    /// 1. `[]` The randomness coordinator program
    PerformUpkeep {
        /// Opaque data from the automation trigger, ignored by this program
        trigger_data: Vec<u8>,
    },

    /// Deliver the random words for an outstanding request
    ///
    /// Accounts expected:
    /// 0. `[signer]` The oracle authority
    /// 1. `[writable]` The raffle account
    /// 2. ... `[writable]` Entrant accounts of the round; the winner must be
    ///    among them
    FulfillRandomWords {
        /// Request id assigned by the coordinator
        request_id: u64,
        /// Delivered random words; only the first is consumed
        random_words: Vec<u64>,
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(RaffleError::InvalidInstruction)?;

        Ok(match tag {
            0 => {
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (interval, rest) = Self::unpack_i64(rest)?;
                let (key_hash, rest) = Self::unpack_bytes32(rest)?;
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (callback_gas_limit, _) = Self::unpack_u32(rest)?;
                Self::Initialize {
                    entrance_fee,
                    interval,
                    key_hash,
                    subscription_id,
                    callback_gas_limit,
                }
            }
            1 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::EnterRaffle { amount }
            }
            2 => Self::CheckUpkeep,
            3 => Self::PerformUpkeep {
                trigger_data: rest.to_vec(),
            },
            4 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (count, mut rest) = Self::unpack_u32(rest)?;
                let mut random_words = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let (word, remaining) = Self::unpack_u64(rest)?;
                    random_words.push(word);
                    rest = remaining;
                }
                Self::FulfillRandomWords {
                    request_id,
                    random_words,
                }
            }
            _ => return Err(RaffleError::InvalidInstruction.into()),
        })
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Self::Initialize {
                entrance_fee,
                interval,
                key_hash,
                subscription_id,
                callback_gas_limit,
            } => {
                buf.push(0);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
                buf.extend_from_slice(key_hash);
                buf.extend_from_slice(&subscription_id.to_le_bytes());
                buf.extend_from_slice(&callback_gas_limit.to_le_bytes());
            }
            Self::EnterRaffle { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep => buf.push(2),
            Self::PerformUpkeep { trigger_data } => {
                buf.push(3);
                buf.extend_from_slice(trigger_data);
            }
            Self::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                buf.push(4);
                buf.extend_from_slice(&request_id.to_le_bytes());
                buf.extend_from_slice(&(random_words.len() as u32).to_le_bytes());
                for word in random_words {
                    buf.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        buf
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        if input.len() < 8 {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (bytes, rest) = input.split_at(8);
        Ok((u64::from_le_bytes(*array_ref![bytes, 0, 8]), rest))
    }

    fn unpack_i64(input: &[u8]) -> Result<(i64, &[u8]), ProgramError> {
        if input.len() < 8 {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (bytes, rest) = input.split_at(8);
        Ok((i64::from_le_bytes(*array_ref![bytes, 0, 8]), rest))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        if input.len() < 4 {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (bytes, rest) = input.split_at(4);
        Ok((u32::from_le_bytes(*array_ref![bytes, 0, 4]), rest))
    }

    fn unpack_bytes32(input: &[u8]) -> Result<([u8; 32], &[u8]), ProgramError> {
        if input.len() < 32 {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (bytes, rest) = input.split_at(32);
        Ok((*array_ref![bytes, 0, 32], rest))
    }
}

/// Create an initialize instruction
#[allow(clippy::too_many_arguments)]
pub fn initialize(
    program_id: &Pubkey,
    payer: &Pubkey,
    raffle_account: &Pubkey,
    coordinator: &Pubkey,
    oracle_authority: &Pubkey,
    entrance_fee: u64,
    interval: i64,
    key_hash: [u8; 32],
    subscription_id: u64,
    callback_gas_limit: u32,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::Initialize {
        entrance_fee,
        interval,
        key_hash,
        subscription_id,
        callback_gas_limit,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new_readonly(*coordinator, false),
        AccountMeta::new_readonly(*oracle_authority, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create an enter_raffle instruction
pub fn enter_raffle(
    program_id: &Pubkey,
    entrant: &Pubkey,
    raffle_account: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::EnterRaffle { amount }.pack();

    let accounts = vec![
        AccountMeta::new(*entrant, true),
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create a check_upkeep instruction
pub fn check_upkeep(
    program_id: &Pubkey,
    raffle_account: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::CheckUpkeep.pack();

    let accounts = vec![AccountMeta::new_readonly(*raffle_account, false)];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create a perform_upkeep instruction
pub fn perform_upkeep(
    program_id: &Pubkey,
    raffle_account: &Pubkey,
    coordinator: &Pubkey,
    trigger_data: &[u8],
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::PerformUpkeep {
        trigger_data: trigger_data.to_vec(),
    }
    .pack();

    let accounts = vec![
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new_readonly(*coordinator, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create a fulfill_random_words instruction
pub fn fulfill_random_words(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    raffle_account: &Pubkey,
    entrants: &[Pubkey],
    request_id: u64,
    random_words: &[u64],
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::FulfillRandomWords {
        request_id,
        random_words: random_words.to_vec(),
    }
    .pack();

    let mut accounts = vec![
        AccountMeta::new_readonly(*oracle_authority, true),
        AccountMeta::new(*raffle_account, false),
    ];
    for entrant in entrants {
        accounts.push(AccountMeta::new(*entrant, false));
    }

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trips_fulfillment() {
        let original = RaffleInstruction::FulfillRandomWords {
            request_id: 9,
            random_words: vec![3, u64::MAX],
        };
        let unpacked = RaffleInstruction::unpack(&original.pack()).unwrap();
        assert_eq!(unpacked, original);
    }

    #[test]
    fn perform_upkeep_carries_opaque_trigger_data() {
        let original = RaffleInstruction::PerformUpkeep {
            trigger_data: b"cron-tick-17".to_vec(),
        };
        let unpacked = RaffleInstruction::unpack(&original.pack()).unwrap();
        assert_eq!(unpacked, original);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(
            RaffleInstruction::unpack(&[9]),
            Err(RaffleError::InvalidInstruction.into())
        );
        assert_eq!(
            RaffleInstruction::unpack(&[]),
            Err(RaffleError::InvalidInstruction.into())
        );
    }

    #[test]
    fn truncated_fields_are_rejected() {
        // EnterRaffle with a short amount
        assert_eq!(
            RaffleInstruction::unpack(&[1, 0, 0, 0]),
            Err(RaffleError::InvalidInstruction.into())
        );
    }
}
