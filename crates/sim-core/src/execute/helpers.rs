//! Operand helpers shared by the execution stages.

use crate::command::Address;
use crate::fault::FaultCode;
use crate::state::{ArchitecturalState, DATA_MEMORY_WORDS};

/// Resolves a data memory operand to a word index.
///
/// # Errors
///
/// Returns [`FaultCode::AddressOutOfRange`] when the address lies outside
/// data memory.
pub fn resolve_address(addr: Address, state: &ArchitecturalState) -> Result<usize, FaultCode> {
    let raw = match addr {
        Address::Absolute(word) => u16::from(word),
        Address::Indirect(reg) => state.gpr(reg),
    };
    let index = usize::from(raw);
    if index < DATA_MEMORY_WORDS {
        Ok(index)
    } else {
        Err(FaultCode::AddressOutOfRange(raw))
    }
}

/// Wrapping add returning `(result, carry, overflow)`.
#[must_use]
pub const fn add_with_carry(a: u16, b: u16) -> (u16, bool, bool) {
    let (result, carry) = a.overflowing_add(b);
    let overflow = (!(a ^ b) & (a ^ result) & 0x8000) != 0;
    (result, carry, overflow)
}

/// Wrapping subtract returning `(result, borrow, overflow)`.
#[must_use]
pub const fn sub_with_borrow(a: u16, b: u16) -> (u16, bool, bool) {
    let (result, borrow) = a.overflowing_sub(b);
    let overflow = ((a ^ b) & (a ^ result) & 0x8000) != 0;
    (result, borrow, overflow)
}

#[cfg(test)]
mod tests {
    use super::{add_with_carry, resolve_address, sub_with_borrow};
    use crate::command::Address;
    use crate::fault::FaultCode;
    use crate::state::{ArchitecturalState, Register};

    #[test]
    fn add_reports_unsigned_carry_and_signed_overflow() {
        assert_eq!(add_with_carry(1, 2), (3, false, false));
        assert_eq!(add_with_carry(0xFFFF, 1), (0, true, false));
        assert_eq!(add_with_carry(0x7FFF, 1), (0x8000, false, true));
        assert_eq!(add_with_carry(0x8000, 0x8000), (0, true, true));
    }

    #[test]
    fn sub_reports_borrow_and_signed_overflow() {
        assert_eq!(sub_with_borrow(5, 3), (2, false, false));
        assert_eq!(sub_with_borrow(0, 1), (0xFFFF, true, false));
        assert_eq!(sub_with_borrow(0x8000, 1), (0x7FFF, false, true));
    }

    #[test]
    fn indirect_addresses_are_range_checked() {
        let mut state = ArchitecturalState::default();
        state.set_gpr(Register::R1, 15);
        state.set_gpr(Register::R2, 16);

        assert_eq!(resolve_address(Address::Absolute(4), &state), Ok(4));
        assert_eq!(resolve_address(Address::Indirect(Register::R1), &state), Ok(15));
        assert_eq!(
            resolve_address(Address::Indirect(Register::R2), &state),
            Err(FaultCode::AddressOutOfRange(16))
        );
    }
}
