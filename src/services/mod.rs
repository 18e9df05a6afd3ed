pub mod categorizer;
pub mod decision;
pub mod evaluator_grouper;
pub mod moderator_assigner;
pub mod output_service;
pub mod record_filter;
pub mod sampler;
pub mod validation;
pub mod workbook_writer;

pub use decision::{
    decision_channel, ChannelDecisionSource, Decision, DecisionRequest, DecisionSource,
    FixedDecision, ScriptedDecisions, SingleEvaluatorPrompt,
};
pub use moderator_assigner::{assign, AssignmentOutcome, ModeratorMapping};
pub use output_service::{OutputReport, OutputService};
pub use sampler::PickPercentages;
