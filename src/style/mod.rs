pub(crate) mod color;
pub(crate) mod config;
pub(crate) mod templates;
