//! Command implementations

pub mod count;
pub mod index;
pub mod init;
pub mod link;
pub mod new;
pub mod search;
pub mod show;
