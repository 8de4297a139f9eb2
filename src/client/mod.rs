//! 客户端库：附件上传、提交前检查与评分表单状态

pub mod api;
pub mod form_state;
pub mod gate;
pub mod member_scores;
pub mod uploader;

pub use api::{ClientError, PortalClient, ProposalApi, ProposalDraft, ProposalSubmitter};
pub use form_state::{DraftPreview, EvaluationDraft, FormState, MemberPreview};
pub use gate::{FileCategory, GateError, SubmissionGate};
pub use member_scores::{MemberScore, MemberScores, clamp_on_blur};
pub use uploader::{
    AttemptOutcome, AttemptRecord, LocalFile, ObjectStore, StoredFile, TransferError,
    UploadCoordinator, UploadError, UploadReceipt,
};
