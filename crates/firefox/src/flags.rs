//! Build variant flags and their index-key serialization.

use std::fmt;

/// Debug or optimized build. Exactly one is active; optimized is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BuildVariant {
    /// Debug build (`-debug` suffix).
    Debug,
    /// Optimized build (no suffix).
    #[default]
    Optimized,
}

/// Requested build variants.
///
/// Serializes to the dash-joined token list used verbatim in index keys, in the
/// fixed order coverage, fuzzing, asan, tsan, valgrind, debug.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BuildFlags {
    /// Code coverage instrumentation (`ccov`).
    pub coverage: bool,
    /// `--enable-fuzzing` builds.
    pub fuzzing: bool,
    /// AddressSanitizer.
    pub asan: bool,
    /// ThreadSanitizer.
    pub tsan: bool,
    /// Valgrind-compatible builds.
    pub valgrind: bool,
    /// Debug or optimized.
    pub variant: BuildVariant,
}

impl BuildFlags {
    /// An optimized build with no instrumentation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set coverage.
    #[must_use]
    pub const fn with_coverage(mut self, enabled: bool) -> Self {
        self.coverage = enabled;
        self
    }

    /// Set fuzzing.
    #[must_use]
    pub const fn with_fuzzing(mut self, enabled: bool) -> Self {
        self.fuzzing = enabled;
        self
    }

    /// Set AddressSanitizer.
    #[must_use]
    pub const fn with_asan(mut self, enabled: bool) -> Self {
        self.asan = enabled;
        self
    }

    /// Set ThreadSanitizer.
    #[must_use]
    pub const fn with_tsan(mut self, enabled: bool) -> Self {
        self.tsan = enabled;
        self
    }

    /// Set Valgrind.
    #[must_use]
    pub const fn with_valgrind(mut self, enabled: bool) -> Self {
        self.valgrind = enabled;
        self
    }

    /// Set the debug/optimized variant.
    #[must_use]
    pub const fn with_variant(mut self, variant: BuildVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Tokens of the enabled flags, in canonical order.
    #[must_use]
    pub fn tokens(&self) -> Vec<&'static str> {
        [
            (self.coverage, "ccov"),
            (self.fuzzing, "fuzzing"),
            (self.asan, "asan"),
            (self.tsan, "tsan"),
            (self.valgrind, "valgrind"),
            (self.variant == BuildVariant::Debug, "debug"),
        ]
        .into_iter()
        .filter_map(|(enabled, token)| enabled.then_some(token))
        .collect()
    }

    /// The index-key suffix, e.g. `-asan-debug`; empty for a plain optimized build.
    #[must_use]
    pub fn suffix(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BuildFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.tokens() {
            write!(f, "-{token}")?;
        }
        Ok(())
    }
}
