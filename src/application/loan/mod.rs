mod loan_service;
mod overdue_detection;

pub use loan_service::{
    BorrowOutcome, attempt_borrow, can_borrow, get_loan, is_overdue, list_member_loans,
    return_media,
};
pub use overdue_detection::find_overdue_loans;
