pub mod graphql;
pub mod label;
pub mod organization;
pub mod repository;

pub use graphql::*;
pub use label::*;
pub use organization::*;
pub use repository::*;
