pub(crate) mod callback;
pub(crate) mod clock;
pub(crate) mod core;
pub(crate) mod error;
