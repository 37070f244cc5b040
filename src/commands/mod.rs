// Export submodules
pub mod ooto;
pub mod review;

pub use ooto::{OotoWorkflow, SubmitOutcome};
pub use review::{AcceptBody, BodyDecision, BodyEditor, ConsoleReviewer, ReplaceBody};
