//! Cross-component integration flows.

pub mod flows;
pub mod runtime;
