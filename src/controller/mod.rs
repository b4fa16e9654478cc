pub mod auth;
mod dashboard;
mod sidepanel;

pub(crate) use dashboard::*;
pub(crate) use sidepanel::*;
