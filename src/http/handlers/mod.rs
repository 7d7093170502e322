//! Endpoint handlers, grouped by family.

pub mod formats;
pub mod images;
pub mod inspection;
pub mod meta;
pub mod methods;
pub mod status;
