pub mod clock;
pub mod diag;
pub mod recovery;
pub mod retry;
pub mod session;
