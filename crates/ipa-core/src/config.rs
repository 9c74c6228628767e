//! Protocol configuration

use serde::{Deserialize, Serialize};

/// Default number of terms above which per-pair work is spread over rayon.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// Default Fiat-Shamir domain label.
pub const DEFAULT_TRANSCRIPT_LABEL: &[u8] = b"ipa-opening";

/// How the verifier recomputes the final generator from the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeneratorFolding {
    /// Fold the key round by round, exactly as the prover does
    #[default]
    Iterative,
    /// Expand the challenges into per-generator weights and take one
    /// multi-scalar sum
    Msm,
}

/// Tunables shared by prover and verifier.
///
/// `parallel_threshold` and `generator_folding` never change a proof:
/// sequential and parallel paths produce identical group elements, and both
/// folding strategies yield the same final generator. `transcript_label` does:
/// it domain-separates every transcript-derived challenge, so prover and
/// verifier must agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Vector length at or above which folds and sums run in parallel
    pub parallel_threshold: usize,
    /// Verifier strategy for the final generator
    pub generator_folding: GeneratorFolding,
    /// Domain separator for transcript-based challenges
    pub transcript_label: &'static [u8],
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            generator_folding: GeneratorFolding::default(),
            transcript_label: DEFAULT_TRANSCRIPT_LABEL,
        }
    }
}

impl ProtocolConfig {
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_generator_folding(mut self, strategy: GeneratorFolding) -> Self {
        self.generator_folding = strategy;
        self
    }

    pub fn with_transcript_label(mut self, label: &'static [u8]) -> Self {
        self.transcript_label = label;
        self
    }

    /// Force every computation onto the sequential path
    pub fn sequential() -> Self {
        Self::default().with_parallel_threshold(usize::MAX)
    }

    /// Whether a vector of `len` terms should be processed in parallel
    pub fn use_parallel(&self, len: usize) -> bool {
        len >= self.parallel_threshold
    }
}
