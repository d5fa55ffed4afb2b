pub mod color;
pub mod consolidate;
pub mod inspect;
