//! Service layer providing the todo CRUD operations on top of models.
//! - Separates request validation and business rules from data access.
//! - Reuses the entity definition in the `models` crate.

pub mod errors;
pub mod db;
pub mod todo;
#[cfg(test)]
pub mod test_support;
