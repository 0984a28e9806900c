//! Core types for Holdline

/// Declares a closed vocabulary: serde text, `as_str`, `FromStr` and `Display`
/// all come from the same table, and declaration order is the total order.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every member, in order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical text form
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::error::ValidationError::InvalidEnum {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Caller-supplied text inside a canonical string, length-prefixed so that
/// separators in the value cannot shift field boundaries
pub(crate) fn canon_field(value: &str) -> String {
    format!("{}:{}", value.len(), value)
}

/// A list of caller-supplied values, each length-prefixed
pub(crate) fn canon_list<S: AsRef<str>>(values: &[S]) -> String {
    let fields: Vec<String> = values.iter().map(|v| canon_field(v.as_ref())).collect();
    format!("{}#{}", fields.len(), fields.join(","))
}

mod buckets;
mod signal;
mod pressure;
mod envelope;
mod delegation;
mod reason;
mod page;

pub use buckets::{Source, CircleType, HorizonKind, Magnitude, SignalReason, EvidenceKind, DurationBucket};
pub use signal::{
    CalendarInput, InboxInput, DeviceInput, TimeWindowInputs, EnvelopeSummary,
    TimeWindowSignal, TimeWindowStatus, TimeWindowBuildResult,
};
pub use pressure::{PressureCircleType, PressureHorizon, TrustStatus, PressureDecisionInput};
pub use envelope::{EnvelopeKind, EnvelopeReason, EnvelopeState, AttentionEnvelope};
pub use delegation::{
    DelegationScope, DelegationAction, ContractState, DelegatedHoldingContract,
    HoldingResult, HoldingDecision, CircleKind, CircleCategory, CircleDescriptor,
    CreateContractInput, RevokeContractInput, DelegationInputs,
    RevocationRecord, HoldingProofRecord,
};
pub use reason::{EligibilityReason, EligibilityDecision};
pub use page::{DelegatePage, ProofPage};
