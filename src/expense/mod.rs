pub mod handlers;
pub mod models;
mod service;

pub use handlers::{add_expense, delete_expense, update_expense};
