//! Status flags produced by each executed instruction.

use std::fmt;

const FLAG_Z: u8 = 1 << 0;
const FLAG_N: u8 = 1 << 1;
const FLAG_C: u8 = 1 << 2;
const FLAG_V: u8 = 1 << 3;
const FLAGS_ACTIVE_MASK: u8 = FLAG_Z | FLAG_N | FLAG_C | FLAG_V;

/// One named status flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    /// Result was zero.
    Zero,
    /// Result had its sign bit set.
    Negative,
    /// Unsigned carry out, or borrow for subtraction.
    Carry,
    /// Signed overflow.
    Overflow,
}

impl Flag {
    /// Every flag in rendering order.
    pub const ALL: [Self; 4] = [Self::Zero, Self::Negative, Self::Carry, Self::Overflow];

    const fn bit(self) -> u8 {
        match self {
            Self::Zero => FLAG_Z,
            Self::Negative => FLAG_N,
            Self::Carry => FLAG_C,
            Self::Overflow => FLAG_V,
        }
    }

    /// Long lower-case name (`zero`, `negative`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Negative => "negative",
            Self::Carry => "carry",
            Self::Overflow => "overflow",
        }
    }

    /// Single-letter mnemonic (`Z`, `N`, `C`, `V`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Zero => 'Z',
            Self::Negative => 'N',
            Self::Carry => 'C',
            Self::Overflow => 'V',
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable set of status flags. All flags are clear by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u8);

impl Flags {
    /// Flags with every bit clear.
    pub const CLEAR: Self = Self(0);

    /// Builds flags from an explicit per-flag list.
    #[must_use]
    pub const fn new(zero: bool, negative: bool, carry: bool, overflow: bool) -> Self {
        Self::CLEAR
            .with(Flag::Zero, zero)
            .with(Flag::Negative, negative)
            .with(Flag::Carry, carry)
            .with(Flag::Overflow, overflow)
    }

    /// Flags describing a 16-bit result: `Z` and `N` come from `value`.
    #[must_use]
    pub const fn from_result(value: u16, carry: bool, overflow: bool) -> Self {
        Self::new(value == 0, (value & 0x8000) != 0, carry, overflow)
    }

    /// Returns `true` when `flag` is set.
    #[must_use]
    pub const fn is_set(self, flag: Flag) -> bool {
        (self.0 & flag.bit()) != 0
    }

    /// Returns a copy with `flag` set or cleared.
    #[must_use]
    pub const fn with(self, flag: Flag, enabled: bool) -> Self {
        if enabled {
            Self((self.0 | flag.bit()) & FLAGS_ACTIVE_MASK)
        } else {
            Self(self.0 & !flag.bit())
        }
    }

    /// Raw bit pattern (`Z=bit0`, `N=bit1`, `C=bit2`, `V=bit3`).
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Iterates every flag with its value, in [`Flag::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = (Flag, bool)> {
        Flag::ALL.into_iter().map(move |flag| (flag, self.is_set(flag)))
    }

    /// Flags whose value differs from `reference`.
    pub fn changed_from(self, reference: Self) -> impl Iterator<Item = Flag> {
        let diff = self.0 ^ reference.0;
        Flag::ALL
            .into_iter()
            .filter(move |flag| (diff & flag.bit()) != 0)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (flag, set)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", flag.letter(), u8::from(set))?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Flags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(Flag::ALL.len()))?;
        for (flag, set) in self.iter() {
            map.serialize_entry(flag.name(), &set)?;
        }
        map.end()
    }
}
