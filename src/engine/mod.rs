pub(crate) mod config;
pub(crate) mod controller;
pub(crate) mod decoder;
pub(crate) mod schedule;
pub(crate) mod visibility;
