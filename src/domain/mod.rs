pub mod commands;
pub mod errors;
pub mod loan;
pub mod media;
pub mod member;
pub mod value_objects;

pub use errors::*;
pub use loan::{Loan, LoanStatus};
pub use media::{BoardGame, CatalogItem, Media, MediaKind, MediaType};
pub use member::Member;
pub use value_objects::*;
