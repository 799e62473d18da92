pub mod error;
pub mod flow;
pub mod interpret;
pub mod score;
pub mod session;
