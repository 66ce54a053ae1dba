pub mod check;
pub mod env;
pub mod info;
pub mod install;
pub mod wizard;
