// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Commonalities, CommonalityField, Group, GroupMembership, GroupRole, MatchRecord, MatchStatus,
    Profile, ScoredMatch, ScoringWeights, User,
};
pub use requests::{CreateGroupRequest, CreateProfileRequest, GroupSearchQuery};
pub use responses::{
    AcceptedMatch, CreateGroupResponse, CreateProfileResponse, DiscoverResponse, ErrorResponse,
    GroupDetail, GroupMemberView, GroupResponse, GroupSummary, GroupsResponse, HealthResponse,
    LikeResponse, MatchCounterparty, MatchesResponse, MeResponse, MessageResponse, MyGroup,
    ProfileResponse,
};
