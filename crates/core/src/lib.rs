pub mod money;
pub mod transaction;

pub use money::Rupiah;
pub use transaction::{DraftError, TransactionDraft, TransactionKind};
