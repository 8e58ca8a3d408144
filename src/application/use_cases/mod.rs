pub mod impersonation;
pub mod payment;
pub mod session;
