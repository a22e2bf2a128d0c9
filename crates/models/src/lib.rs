pub mod errors;
pub mod db;
pub mod todo;

#[cfg(test)]
mod tests;
