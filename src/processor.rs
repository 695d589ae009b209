// Fairdraw Raffle Program - Instruction Processor
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::{
    error::RaffleError,
    instruction::RaffleInstruction,
    oracle,
    state::{check_initialized, find_raffle_address, Raffle, RaffleState, MAX_ENTRANTS,
        RAFFLE_ACCOUNT_SIZE, RAFFLE_SEED},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::Initialize {
                entrance_fee,
                interval,
                key_hash,
                subscription_id,
                callback_gas_limit,
            } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(
                    accounts,
                    entrance_fee,
                    interval,
                    key_hash,
                    subscription_id,
                    callback_gas_limit,
                    program_id,
                )
            }
            RaffleInstruction::EnterRaffle { amount } => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(accounts, amount, program_id)
            }
            RaffleInstruction::CheckUpkeep => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, program_id)
            }
            RaffleInstruction::PerformUpkeep { trigger_data } => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, &trigger_data, program_id)
            }
            RaffleInstruction::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(accounts, request_id, &random_words, program_id)
            }
        }
    }

    /// Create and initialize the raffle account. Configuration is fixed
    /// here for the lifetime of the raffle.
    fn process_initialize(
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: i64,
        key_hash: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            msg!("Payer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let (expected_raffle_pubkey, bump_seed) = find_raffle_address(program_id);
        if *raffle_info.key != expected_raffle_pubkey {
            msg!("Invalid raffle account address");
            return Err(ProgramError::InvalidArgument);
        }

        if entrance_fee == 0 {
            msg!("Entrance fee must be greater than zero");
            return Err(ProgramError::InvalidArgument);
        }
        if interval <= 0 {
            msg!("Interval must be greater than zero");
            return Err(ProgramError::InvalidArgument);
        }

        if raffle_info.owner != program_id {
            let rent = Rent::get()?;
            let rent_lamports = rent.minimum_balance(RAFFLE_ACCOUNT_SIZE);

            invoke_signed(
                &system_instruction::create_account(
                    payer_info.key,
                    raffle_info.key,
                    rent_lamports,
                    RAFFLE_ACCOUNT_SIZE as u64,
                    program_id,
                ),
                &[
                    payer_info.clone(),
                    raffle_info.clone(),
                    system_program_info.clone(),
                ],
                &[&[RAFFLE_SEED, &[bump_seed]]],
            )?;
        } else if let Ok(existing) = Raffle::load(&raffle_info.data.borrow()) {
            if existing.is_initialized() {
                msg!("Raffle account is already initialized");
                return Err(RaffleError::AlreadyInitialized.into());
            }
        }

        let clock = Clock::get()?;
        let raffle = Raffle::new(
            entrance_fee,
            interval,
            *coordinator_info.key,
            *oracle_authority_info.key,
            key_hash,
            subscription_id,
            callback_gas_limit,
            clock.unix_timestamp,
        );
        raffle.store(&mut raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: fee={} lamports, interval={}s, coordinator={}",
            entrance_fee,
            interval,
            coordinator_info.key
        );
        Ok(())
    }

    /// Record an entry and move the fee into the pool
    fn process_enter_raffle(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let entrant_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !entrant_info.is_signer {
            msg!("Entrant must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::load(&raffle_info.data.borrow())?;
        check_initialized(&raffle)?;

        if amount < raffle.entrance_fee {
            msg!(
                "Entry of {} lamports is below the {} lamport entrance fee",
                amount,
                raffle.entrance_fee
            );
            return Err(RaffleError::NotEnoughFunds.into());
        }
        if raffle.state != RaffleState::Open {
            msg!("A draw is in flight, entries are closed");
            return Err(RaffleError::RaffleNotOpen.into());
        }
        if raffle.entrants.len() >= MAX_ENTRANTS {
            msg!("Entrant ledger is full for this round");
            return Err(RaffleError::RaffleFull.into());
        }

        invoke(
            &system_instruction::transfer(entrant_info.key, raffle_info.key, amount),
            &[
                entrant_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.entrants.push(*entrant_info.key);
        raffle.pool_lamports = raffle
            .pool_lamports
            .checked_add(amount)
            .ok_or(ProgramError::InvalidArgument)?;
        raffle.store(&mut raffle_info.data.borrow_mut())?;

        msg!("EnteredRaffle: {}", entrant_info.key);
        Ok(())
    }

    /// Evaluate upkeep eligibility. Read-only; the snapshot is logged and
    /// published as return data for off-chain pollers.
    fn process_check_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let raffle = Raffle::load(&raffle_info.data.borrow())?;
        check_initialized(&raffle)?;

        let clock = Clock::get()?;
        let check = raffle.check_upkeep(clock.unix_timestamp);

        msg!(
            "CheckUpkeep: eligible={} interval_elapsed={} balance={} entrants={} state={:?}",
            check.eligible,
            check.interval_elapsed,
            check.pool_lamports,
            check.entrant_count,
            check.state
        );
        let payload =
            borsh::to_vec(&check).map_err(|_| ProgramError::InvalidAccountData)?;
        set_return_data(&payload);
        Ok(())
    }

    /// Close entries and request randomness. Eligibility is re-derived here
    /// at call time; a stale off-chain check is never trusted.
    fn process_perform_upkeep(
        accounts: &[AccountInfo],
        _trigger_data: &[u8],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::load(&raffle_info.data.borrow())?;
        check_initialized(&raffle)?;

        if *coordinator_info.key != raffle.coordinator {
            msg!("Coordinator account does not match the configured coordinator");
            return Err(ProgramError::IncorrectProgramId);
        }

        let clock = Clock::get()?;
        let check = raffle.check_upkeep(clock.unix_timestamp);
        if !check.eligible {
            msg!(
                "UpkeepNotNeeded: balance={} entrants={} state={:?}",
                check.pool_lamports,
                check.entrant_count,
                check.state
            );
            return Err(RaffleError::UpkeepNotNeeded.into());
        }

        raffle.state = RaffleState::Calculating;

        let request_id = oracle::request_random_words(
            coordinator_info,
            raffle_info,
            &raffle.key_hash,
            raffle.subscription_id,
            raffle.callback_gas_limit,
        )?;
        raffle.record_request(request_id);
        raffle.store(&mut raffle_info.data.borrow_mut())?;

        msg!("RequestedRaffleWinner: {}", request_id);
        Ok(())
    }

    /// Consume a delivered random word: pick the winner, pay the pool out,
    /// reset for the next round.
    fn process_fulfill_random_words(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[u64],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        if !oracle_authority_info.is_signer {
            msg!("Oracle authority must sign the fulfillment");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::load(&raffle_info.data.borrow())?;
        check_initialized(&raffle)?;

        if *oracle_authority_info.key != raffle.oracle_authority {
            msg!("Fulfillment not signed by the configured oracle authority");
            return Err(RaffleError::OracleAuthorityMismatch.into());
        }
        if raffle.state != RaffleState::Calculating {
            msg!("No draw is in flight");
            return Err(RaffleError::UnknownRequest.into());
        }
        if !raffle.validate_and_clear_request(request_id) {
            msg!("Request {} does not match the outstanding request", request_id);
            return Err(RaffleError::UnknownRequest.into());
        }

        let word = random_words.first().ok_or(RaffleError::InvalidInstruction)?;
        let winner_index = raffle
            .winner_index(*word)
            .ok_or(ProgramError::InvalidAccountData)?;
        let winner = raffle.entrants[winner_index];

        let winner_info = match account_info_iter.find(|info| *info.key == winner) {
            Some(info) => info,
            None => {
                msg!("Winner {} was not supplied with the fulfillment", winner);
                return Err(RaffleError::WinnerAccountMissing.into());
            }
        };

        Self::pay(raffle_info, winner_info, raffle.pool_lamports)?;

        let clock = Clock::get()?;
        raffle.recent_winner = Some(winner);
        raffle.reset_round(clock.unix_timestamp);
        raffle.store(&mut raffle_info.data.borrow_mut())?;

        msg!("WinnerPicked: {}", winner);
        Ok(())
    }

    /// Move the full pool to the winner. The raffle account keeps its
    /// rent-exempt reserve; only the pool on top of it moves. Reports
    /// failure without touching either balance.
    fn pay(from: &AccountInfo, to: &AccountInfo, amount: u64) -> ProgramResult {
        let debited = from.lamports().checked_sub(amount);
        let credited = to.lamports().checked_add(amount);
        match (debited, credited) {
            (Some(debited), Some(credited)) => {
                **from.lamports.borrow_mut() = debited;
                **to.lamports.borrow_mut() = credited;
                Ok(())
            }
            _ => {
                msg!("Could not transfer {} lamports to the winner", amount);
                Err(RaffleError::TransferFailed.into())
            }
        }
    }
}
