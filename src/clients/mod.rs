pub mod itunes;
pub mod retry;
