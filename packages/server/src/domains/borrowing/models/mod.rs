mod borrow_request;
mod transition_record;

pub use borrow_request::BorrowRequest;
pub use transition_record::TransitionRecord;
