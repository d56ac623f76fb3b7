//! Callbot application layer.
//!
//! Use cases on top of the core domain: answer classification, the interview
//! flow controller, report assembly, case-file intake and the telephony
//! webhook surface.

pub mod classifier;
pub mod flow;
pub mod intake;
pub mod locks;
pub mod prompt;
pub mod report_builder;
pub mod twiml;
pub mod voice;

pub use classifier::AnswerClassifier;
pub use flow::{FlowController, FlowSettings};
pub use intake::{IntakeReceipt, IntakeRequest, IntakeService};
pub use locks::CallLocks;
pub use prompt::{Directive, Prompt};
pub use report_builder::ReportBuilder;
pub use twiml::TwimlRenderer;
pub use voice::{CallStatusWebhook, VoiceService, VoiceWebhook};
