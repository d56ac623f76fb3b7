//! Interview phases.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Sub-questions asked, in order, about an unlisted complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DetailStep {
    What,
    Why,
    Urgency,
    Adl,
    Guardian,
}

impl DetailStep {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::What => Some(Self::Why),
            Self::Why => Some(Self::Urgency),
            Self::Urgency => Some(Self::Adl),
            Self::Adl => Some(Self::Guardian),
            Self::Guardian => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::What => "불편사항",
            Self::Why => "원인",
            Self::Urgency => "긴급성",
            Self::Adl => "일상생활 영향",
            Self::Guardian => "보호자 여부",
        }
    }
}

/// Answers collected so far for one unlisted complaint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailDraft {
    #[serde(default)]
    pub answers: Vec<(DetailStep, String)>,
}

impl DetailDraft {
    /// Starts a draft whose first answer is the complaint itself.
    pub fn starting_with(complaint: impl Into<String>) -> Self {
        Self {
            answers: vec![(DetailStep::What, complaint.into())],
        }
    }

    pub fn record(&mut self, step: DetailStep, answer: impl Into<String>) {
        self.answers.push((step, answer.into()));
    }

    /// Text handed to the scored judgment.
    pub fn aggregate(&self) -> String {
        self.answers
            .iter()
            .map(|(step, answer)| format!("{}: {}", step.label(), answer))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Where the controller stands in the interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(tag = "phase", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Greeting,
    AskItem {
        index: usize,
    },
    /// Offering a human follow-up. `next_item` is the known item to resume
    /// at; `None` resumes at the additional-complaints question.
    OfferHelp {
        next_item: Option<usize>,
    },
    AskAdditional,
    AskAdditionalDetail {
        step: DetailStep,
        draft: DetailDraft,
    },
    ConfirmEnd,
    Terminated,
    ExceptionTerminated {
        fail_code: u32,
    },
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::ExceptionTerminated { .. })
    }

    /// Phases from which an exception may end the call.
    pub fn is_asking(&self) -> bool {
        matches!(
            self,
            Self::AskItem { .. }
                | Self::OfferHelp { .. }
                | Self::AskAdditional
                | Self::AskAdditionalDetail { .. }
                | Self::ConfirmEnd
        )
    }
}
