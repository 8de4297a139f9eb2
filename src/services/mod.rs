pub(crate) mod access;
pub mod admin;
pub mod evaluations;
pub mod files;
pub mod mentor;
pub mod proposals;
pub mod student;

pub use admin::AdminService;
pub use evaluations::EvaluationService;
pub use files::FileService;
pub use mentor::MentorService;
pub use proposals::ProposalService;
pub use student::StudentService;
