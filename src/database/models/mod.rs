pub mod category;
pub mod petition;
pub mod support_tier;
pub mod supporter;
pub mod user;

pub use category::Category;
pub use petition::{PetitionDetail, PetitionSummary};
pub use support_tier::SupportTier;
pub use supporter::Supporter;
pub use user::User;
