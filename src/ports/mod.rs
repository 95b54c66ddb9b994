pub mod catalog;
pub mod clock;
pub mod errors;
pub mod loan_ledger;
pub mod membership;

pub use catalog::*;
pub use clock::*;
pub use errors::*;
pub use loan_ledger::*;
pub use membership::*;
