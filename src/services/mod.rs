pub mod identity;
pub mod validation;
pub mod vote;
pub mod work;

pub use identity::{IdentityService, Login, Session};
pub use vote::VoteLedger;
pub use work::{NewWork, WorkCatalog, WorkChanges};
