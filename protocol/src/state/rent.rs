use serde::{Deserialize, Serialize};

use crate::config::{
    ACCOUNT_STORAGE_OVERHEAD, DEFAULT_EXEMPTION_THRESHOLD, DEFAULT_LAMPORTS_PER_BYTE_YEAR,
};

/// Rent parameters. An account holding at least
/// [`Rent::minimum_balance`] lamports is never charged rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rent {
    pub lamports_per_byte_year: u64,
    pub exemption_threshold: u64,
}

impl Default for Rent {
    fn default() -> Self {
        Self {
            lamports_per_byte_year: DEFAULT_LAMPORTS_PER_BYTE_YEAR,
            exemption_threshold: DEFAULT_EXEMPTION_THRESHOLD,
        }
    }
}

impl Rent {
    /// Lamports needed for an account of `space` data bytes to be exempt.
    pub fn minimum_balance(&self, space: usize) -> u64 {
        (ACCOUNT_STORAGE_OVERHEAD.saturating_add(space as u64))
            .saturating_mul(self.lamports_per_byte_year)
            .saturating_mul(self.exemption_threshold)
    }

    pub fn is_exempt(&self, lamports: u64, space: usize) -> bool {
        lamports >= self.minimum_balance(space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_allocation_minimum() {
        // (128 + 114) * 3480 * 2
        assert_eq!(Rent::default().minimum_balance(114), 1_684_320);
    }

    #[test]
    fn empty_account_still_pays_overhead() {
        assert_eq!(Rent::default().minimum_balance(0), 890_880);
    }

    #[test]
    fn exemption_boundary() {
        let rent = Rent::default();
        let min = rent.minimum_balance(49);
        assert!(rent.is_exempt(min, 49));
        assert!(!rent.is_exempt(min - 1, 49));
    }

    #[test]
    fn huge_space_saturates() {
        assert_eq!(Rent::default().minimum_balance(usize::MAX), u64::MAX);
    }
}
