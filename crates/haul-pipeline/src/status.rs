//! Exit status bits

use bitflags::bitflags;

bitflags! {
    /// Bitmask describing what went wrong during a run
    ///
    /// Job results are OR-ed together, so the final value tells which kinds
    /// of failure happened at least once. Bits without a name are kept as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExitStatus: u32 {
        /// Unspecified error
        const GENERAL = 1;
        /// HTTP or transport error
        const HTTP = 4;
        /// Remote resource does not exist
        const NOT_FOUND = 8;
        /// No handler accepted the target
        const NO_HANDLER = 64;

        const _ = !0;
    }
}

impl ExitStatus {
    /// Successful run
    pub const SUCCESS: Self = Self::empty();

    /// Status from a raw code returned by a job
    pub fn from_code(code: u32) -> Self {
        Self::from_bits_retain(code)
    }

    /// Process exit code (the low byte of the mask)
    pub fn code(self) -> i32 {
        (self.bits() & 0xff) as i32
    }

    /// Whether no failure bits are set
    pub fn is_success(self) -> bool {
        self.is_empty()
    }
}
