pub mod db;
pub mod error;
pub mod identity;
pub mod resolver;
pub mod types;

pub use error::UserError;
pub use resolver::{merge_key_fields, ApiKeyFields, UserStore};
pub use types::{AnalysisRecord, AppText, LetterRecord, Paging, User};
