//! Entity structs for the chat thread and backend research snapshots.
//!
//! Snapshot types mirror the backend's `GET /research/{id}` document and are
//! lenient: every field defaults when absent so partial documents still load.

mod customization;
mod finding;
mod message;
mod plan;
mod quality;
mod state;

pub use customization::Customization;
pub use finding::Finding;
pub use message::ChatMessage;
pub use plan::ResearchPlan;
pub use quality::QualityReport;
pub use state::ResearchState;
