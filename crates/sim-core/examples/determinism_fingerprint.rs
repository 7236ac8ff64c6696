//! Deterministic history fingerprint for cross-host comparison.
//!
//! Runs a fixed multiply-and-store loop for a fixed number of ticks and prints
//! an FNV-1a hash over every recorded snapshot. Two hosts that print the same
//! fingerprint produced identical histories.

use ticksim_core::{
    Address, AluOp, Command, Condition, History, Instruction, Processor, Register, UnaryOp,
};

const TICKS: usize = 64;

fn program() -> Vec<Command> {
    let instructions = [
        Instruction::Load {
            rd: Register::R0,
            value: 6,
        },
        Instruction::Load {
            rd: Register::R1,
            value: 3,
        },
        Instruction::Alu {
            op: AluOp::Mul,
            rd: Register::R1,
            rs: Register::R1,
        },
        Instruction::StoreMem {
            rs: Register::R1,
            addr: Address::Indirect(Register::R0),
        },
        Instruction::Unary {
            op: UnaryOp::Dec,
            rd: Register::R0,
        },
        Instruction::Jump {
            cond: Condition::NotZero,
            target: 2,
        },
        Instruction::Halt,
    ];

    instructions
        .into_iter()
        .enumerate()
        .map(|(idx, instruction)| Command::new(idx + 1, instruction))
        .collect()
}

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> Result<String, Box<dyn std::error::Error>> {
    let mut processor = Processor::with_program(program())?;
    let mut history = History::start(&processor)?;
    for _ in 0..TICKS {
        processor.clk()?;
        history.record(&processor)?;
    }

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for state in history.as_slice() {
        hash_bytes(&mut hash, &state.clk().to_le_bytes());
        hash_bytes(&mut hash, &(state.pc() as u64).to_le_bytes());
        for word in state.registers().iter().chain(state.memory()) {
            hash_bytes(&mut hash, &word.to_le_bytes());
        }
        hash_bytes(&mut hash, &[state.flags().bits()]);
    }

    Ok(format!("{hash:016x}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", fingerprint()?);
    Ok(())
}
