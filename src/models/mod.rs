// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AttendanceRecord, AttendanceStats, AttendanceStatus, CategoryInterest, EventCandidate,
    EventDocument, Interaction, InteractionType, InterestProfile, ModelError, ScoredEvent,
    ScoringWeights, SkillLevel,
};
pub use requests::{AttendanceQuery, RecommendRequest, RecordInteractionRequest, UpdateInterestsRequest};
pub use responses::{
    AttendanceResponse, ErrorResponse, HealthResponse, RecommendResponse,
    RecordInteractionResponse,
};
