pub mod commands;
pub mod engine;
pub mod policy;

pub use commands::{CreateRecord, RecordPatch};
pub use engine::{
    apply_update, create_record, resolve_entry, submit_entry, Command, EntrySelector, Transition,
    TransitionOutcome, WorkflowEngine,
};
pub use policy::AuthorityPolicy;
