//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod activity_repo;
pub mod announcement_repo;
pub mod channel_repo;
pub mod completion_repo;
pub mod course_repo;
pub mod feedback_repo;
pub mod income_rate_repo;
pub mod order_repo;
pub mod question_repo;
pub mod report_repo;
pub mod role_repo;
pub mod session_repo;
pub mod sub_activity_repo;
pub mod telegram_link_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use announcement_repo::AnnouncementRepo;
pub use channel_repo::ChannelRepo;
pub use completion_repo::CompletionRepo;
pub use course_repo::CourseRepo;
pub use feedback_repo::FeedbackRepo;
pub use income_rate_repo::IncomeRateRepo;
pub use order_repo::OrderRepo;
pub use question_repo::QuestionRepo;
pub use report_repo::ReportRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use sub_activity_repo::SubActivityRepo;
pub use telegram_link_repo::TelegramLinkRepo;
pub use user_repo::UserRepo;
