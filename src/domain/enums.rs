//! Closed vocabularies used by questionnaires and follow-ups.
//!
//! Every enumeration persists as its display label (for example
//! `"Work in Progress"`), so stored snapshots stay readable. Parsing from user
//! input is forgiving about case and separators: `work-in-progress`,
//! `WORK_IN_PROGRESS` and `Work in Progress` all resolve to the same value.
//! Anything else is rejected rather than carried through.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Error returned when a string names no value of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownVariantError {
    kind: &'static str,
    value: String,
    expected: String,
}

fn normalise(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The display label, which is also the persisted form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariantError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalise(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| normalise(value.as_str()) == wanted)
                    .ok_or_else(|| UnknownVariantError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|value| value.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

closed_enum! {
    /// Workflow status of a questionnaire.
    ///
    /// ```text
    /// Draft → Published → Work in Progress → Submit for Review
    ///       → Need Revision → Under Review → Completed → Sent to OECD
    /// ```
    ///
    /// The order is informational; any transition is permitted.
    QuestionnaireStatus ("questionnaire status") {
        /// Not yet distributed.
        #[default]
        Draft => "Draft",
        /// Distributed to respondents.
        Published => "Published",
        /// Answers are being drafted.
        WorkInProgress => "Work in Progress",
        /// Answers are complete and awaiting review.
        SubmitForReview => "Submit for Review",
        /// Reviewers sent the answers back.
        NeedRevision => "Need Revision",
        /// Reviewers are working through the answers.
        UnderReview => "Under Review",
        /// Review finished.
        Completed => "Completed",
        /// Delivered to the OECD.
        SentToOecd => "Sent to OECD",
    }
}

impl QuestionnaireStatus {
    /// Whether deadline tracking has stopped for this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::SentToOecd)
    }
}

closed_enum! {
    /// Status of a follow-up request.
    FollowUpStatus ("follow-up status") {
        /// Newly received.
        #[default]
        Open => "Open",
        /// Being worked on.
        InProgress => "In Progress",
        /// A response was sent.
        Answered => "Answered",
        /// Finalised.
        Closed => "Closed",
    }
}

impl FollowUpStatus {
    /// Whether deadline tracking has stopped for this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Answered | Self::Closed)
    }
}

closed_enum! {
    /// The nature of a follow-up request.
    FollowUpType ("follow-up type") {
        /// A request to clarify an existing answer.
        #[default]
        Clarification => "Clarification",
        /// A question that was not part of the questionnaire.
        AdditionalQuestion => "Additional Question",
        /// A request for supporting data.
        DataRequest => "Data Request",
    }
}

closed_enum! {
    /// Which side of the exchange a follow-up link belongs to.
    LinkCategory ("link category") {
        /// The request as received.
        #[default]
        OecdRequest => "OECD Request",
        /// The section answer sent back.
        SectionAnswer => "Section Answer",
    }
}

closed_enum! {
    /// Top-level category used to group questionnaires for progress reporting.
    Section ("section") {
        /// Environment.
        #[default]
        Environment => "Environment",
        /// Trade.
        Trade => "Trade",
        /// Finance.
        Finance => "Finance",
        /// Education.
        Education => "Education",
        /// Health.
        Health => "Health",
        /// Employment.
        Employment => "Employment",
    }
}
