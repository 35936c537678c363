//! Query modules, one per table family.

pub mod audit;
pub mod calls;
pub mod reference;
pub mod rules;
