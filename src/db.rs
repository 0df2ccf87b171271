pub mod tenancy_repo;
pub use tenancy_repo::{PgTenantRepository, TenantRepository};
pub mod user_repo;
pub use user_repo::{PgUserRepository, UserRepository};
pub mod magic_link_repo;
pub use magic_link_repo::{MagicLinkRepository, PgMagicLinkRepository};
pub mod message_repo;
pub use message_repo::{MessageRepository, PgMessageRepository};
pub mod milestone_repo;
pub use milestone_repo::{MilestoneRepository, PgMilestoneRepository};
pub mod client_file_repo;
pub use client_file_repo::{ClientFileRepository, PgClientFileRepository};
pub mod settings_repo;
pub use settings_repo::{PgSettingsRepository, SettingsRepository};
