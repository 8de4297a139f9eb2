pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{MemberRole, Team, TeamMember, TeamStatus};
pub use requests::TeamExportRequest;
pub use responses::{
    MentorTeamListResponse, MentorTeamSummary, StudentTeamResponse, TeamOverview,
    TeamOverviewListResponse, TeamProgress, TeamShell, TeamStats, UserBrief,
};
