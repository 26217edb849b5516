//! Verification domain types for detached CMS signatures.
//!
//! Aggregates per-signer results and applies the outcome policy. The
//! cryptographic checks themselves live in the verifier service; this keeps
//! the policy decision free of crypto dependencies and easy to test.

use std::fmt;
use std::str::FromStr;

use crate::infra::error::VerificationFailure;

/// How per-signer results combine into one verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationPolicy {
    /// At least one signer, and every signer has a matching certificate and validates.
    #[default]
    AllSigners,
    /// At least one signer validates.
    AnySigner,
}

impl VerificationPolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationPolicy::AllSigners => "all",
            VerificationPolicy::AnySigner => "any",
        }
    }
}

impl fmt::Display for VerificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "all-signers" => Ok(VerificationPolicy::AllSigners),
            "any" | "any-signer" => Ok(VerificationPolicy::AnySigner),
            other => Err(format!("unknown verification policy: {other}")),
        }
    }
}

/// Result of checking one `SignerInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerOutcome {
    /// Position of the `SignerInfo` in the blob.
    pub index: usize,
    /// Subject of the matched certificate, when one was found.
    pub subject: Option<String>,
    /// `Ok` when the signer validated.
    pub result: Result<(), VerificationFailure>,
}

impl SignerOutcome {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-signer results of one verification run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerificationReport {
    pub signers: Vec<SignerOutcome>,
}

impl VerificationReport {
    #[must_use]
    pub fn new(signers: Vec<SignerOutcome>) -> Self {
        Self { signers }
    }

    /// Apply `policy`; on rejection returns the failure to report.
    pub fn evaluate(&self, policy: VerificationPolicy) -> Result<(), VerificationFailure> {
        if self.signers.is_empty() {
            return Err(VerificationFailure::NoSigners);
        }

        match policy {
            VerificationPolicy::AllSigners => self
                .signers
                .iter()
                .find_map(|outcome| outcome.result.clone().err())
                .map_or(Ok(()), Err),
            VerificationPolicy::AnySigner => {
                if self.signers.iter().any(SignerOutcome::is_valid) {
                    Ok(())
                } else {
                    Err(self.signers[0]
                        .result
                        .clone()
                        .err()
                        .unwrap_or(VerificationFailure::SignatureInvalid))
                }
            }
        }
    }

    /// Overall success indicator under `policy`.
    #[must_use]
    pub fn success(&self, policy: VerificationPolicy) -> bool {
        self.evaluate(policy).is_ok()
    }
}
