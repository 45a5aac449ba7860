//! Shared domain types.

mod id;

pub use id::{
    AccountId, CostCenterId, EntryId, JournalId, PaymentTermId, ProductId, ThirdPartyId, UserId,
};
