// Moderation subsystem — the pipeline around the scorer.
//
// gate: the synchronous checkpoint at content creation/edit time.
// state: the legal lifecycle transitions.
// appeal: owner-initiated reconsideration of a rejection.
// decide: the moderator verdict on held items.
// query: read side (review queue, stats, audit trails).

pub mod appeal;
pub mod decide;
pub mod gate;
pub mod query;
pub mod state;

pub use appeal::AppealWorkflow;
pub use decide::{DecisionAction, ModeratorDecision};
pub use gate::{GateDecision, GateOutcome, GatePolicy, ModerationGate};
pub use query::ModerationQueryService;
