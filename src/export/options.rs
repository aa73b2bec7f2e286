//! Export option flags

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Independent boolean switches for an export.
///
/// Flags combine with `|`. The set is read once when an export starts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExportOptions(u32);

impl ExportOptions {
    /// No flags set
    pub const NONE: Self = Self(0);

    /// Write a header line with the field names before the first row
    pub const INCLUDE_HEADERS: Self = Self(1);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check whether every flag in `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Insert or remove `other` depending on `enabled`
    pub fn set(&mut self, other: Self, enabled: bool) {
        if enabled {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl BitOr for ExportOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ExportOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::INCLUDE_HEADERS) {
            names.push("INCLUDE_HEADERS");
        }
        if names.is_empty() {
            names.push("NONE");
        }
        write!(f, "ExportOptions({})", names.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_operations() {
        let mut options = ExportOptions::NONE;
        assert!(options.is_empty());
        assert!(!options.contains(ExportOptions::INCLUDE_HEADERS));

        options |= ExportOptions::INCLUDE_HEADERS;
        assert!(options.contains(ExportOptions::INCLUDE_HEADERS));
        assert_eq!(options.bits(), 1);

        options.set(ExportOptions::INCLUDE_HEADERS, false);
        assert!(options.is_empty());
    }

    #[test]
    fn test_every_set_contains_none() {
        assert!(ExportOptions::INCLUDE_HEADERS.contains(ExportOptions::NONE));
        assert_eq!(ExportOptions::default(), ExportOptions::NONE);
    }

    #[test]
    fn test_debug_lists_flags() {
        assert_eq!(
            format!("{:?}", ExportOptions::INCLUDE_HEADERS),
            "ExportOptions(INCLUDE_HEADERS)"
        );
        assert_eq!(format!("{:?}", ExportOptions::NONE), "ExportOptions(NONE)");
    }
}
