pub mod handlers;
pub mod replace;
pub mod validation;
