pub(crate) mod caption_session;
pub(crate) mod history;
pub(crate) mod notice;
pub(crate) mod prefs;
pub(crate) mod recent;
pub(crate) mod store;
