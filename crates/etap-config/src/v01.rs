pub mod battery;
pub mod interpretation;
