//! SeaORM entities.

pub mod branch;
