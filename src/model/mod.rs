// Ledger data model - land-asset records and their pending entries

pub mod entry;
pub mod identity;
pub mod normalize;
pub mod payload;
pub mod record;

pub use entry::{
    Beneficiary, Category, DeedDetails, EntryDetails, EntryLists, IncumbranceDetails,
    LedgerEntry, OwnerInfo, OwnerRef, Resolution,
};
pub use identity::Caller;
pub use normalize::normalize_document;
pub use record::{CreatedMethod, HeldInfo, PropertyStatus, Record};
