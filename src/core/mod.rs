pub mod cooldown;
pub mod document;
pub mod ledger;
pub mod lifecycle;
pub mod normalizer;
pub mod session;
pub mod transfer_id;

pub use crate::domain::model::{Code, LineItem, Transfer, TransferPayload};
pub use crate::domain::ports::{Clock, ConfigProvider, Storage, SubmissionSink};
pub use crate::utils::error::Result;
