pub mod entities;
pub mod requests;

pub use entities::{Proposal, ProposalState};
pub use requests::{ProposalRequest, ReviewProposalRequest};
