pub mod billing;
pub mod maintenance;
