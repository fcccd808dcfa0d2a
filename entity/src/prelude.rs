pub use super::ai_integration::Entity as AiIntegration;
pub use super::ai_recommendation_cache::Entity as AiRecommendationCache;
pub use super::alert::Entity as Alert;
pub use super::alert_rule::Entity as AlertRule;
pub use super::api_key::Entity as ApiKey;
pub use super::domain::Entity as Domain;
pub use super::forensic_report::Entity as ForensicReport;
pub use super::gmail_account::Entity as GmailAccount;
pub use super::invitation::Entity as Invitation;
pub use super::known_sender::Entity as KnownSender;
pub use super::org_member::Entity as OrgMember;
pub use super::organization::Entity as Organization;
pub use super::record::Entity as Record;
pub use super::report::Entity as Report;
pub use super::scheduled_report::Entity as ScheduledReport;
pub use super::source::Entity as Source;
pub use super::user::Entity as User;
