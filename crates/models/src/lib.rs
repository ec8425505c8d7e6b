pub mod errors;
pub mod db;
pub mod user;
pub mod product;
pub mod review;

#[cfg(test)]
mod tests;
