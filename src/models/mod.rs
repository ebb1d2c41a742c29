pub mod activity;
pub mod session;
pub mod trip;
pub mod user;
