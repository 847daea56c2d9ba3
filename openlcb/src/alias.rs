use core::convert::TryFrom;
use rand_core::RngCore;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AliasError {
    Zero,
    OutOfRange,
    MissingDestination,
}

pub type Result<T> = core::result::Result<T, AliasError>;

/// 12-bit node alias, valid for one allocation cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Alias(u16);

impl Alias {
    pub const MAX: u16 = 0xfff;

    pub fn new(alias: u16) -> Result<Self> {
        match alias {
            0 => Err(AliasError::Zero),
            a if a > Self::MAX => Err(AliasError::OutOfRange),
            a => Ok(Alias(a)),
        }
    }

    /// Draws an alias uniformly from 1..=0xfff.
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        loop {
            let candidate = (rng.next_u32() & Self::MAX as u32) as u16;
            if candidate != 0 {
                return Alias(candidate);
            }
        }
    }

    /// Two-byte destination prefix carried at the head of addressed message payloads.
    pub fn to_prefix(&self) -> [u8; 2] {
        [(self.0 >> 8) as u8 & 0x0f, self.0 as u8]
    }

    /// Reads the destination from an addressed message payload; the upper nibble
    /// of the first byte holds framing flags and is ignored.
    pub fn from_prefix(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(AliasError::MissingDestination);
        }
        Alias::new((((data[0] & 0x0f) as u16) << 8) | data[1] as u16)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Alias {
    type Error = AliasError;

    fn try_from(val: u16) -> Result<Alias> {
        Alias::new(val)
    }
}

impl core::fmt::Display for Alias {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:03X}", self.0)
    }
}
