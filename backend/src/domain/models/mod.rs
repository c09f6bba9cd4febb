//! Domain models. Dates are `chrono` types here; the `shared` crate carries
//! their string-typed wire counterparts.

pub mod animal;
pub mod breeding;
pub mod document;
pub mod pedigree;
pub mod sale;
