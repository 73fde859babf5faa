pub mod gif;
pub mod naming;
pub mod session;
