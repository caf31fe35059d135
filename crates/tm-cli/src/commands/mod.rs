//! CLI command implementations

pub(crate) mod check;
pub(crate) mod common;
pub(crate) mod interactive;
pub(crate) mod mark_applied;
pub(crate) mod status;
pub(crate) mod upgrade;

#[cfg(test)]
pub(crate) mod test_support;
