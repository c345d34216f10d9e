pub mod leave_application;
pub mod role;
