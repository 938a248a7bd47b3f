// Domain Layer - Pure business logic and entities

pub mod competition;
pub mod eligibility;
pub mod error;
pub mod standings;
pub mod user;

// Re-exports
pub use competition::{Competition, CompetitionId, CompetitionPhase, NewCompetition};
pub use error::DomainError;
pub use standings::{RankedParticipant, Standings};
pub use user::{User, UserId};
