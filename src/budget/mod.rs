pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::{get_budget_by_month, get_current_budget, replace_base_income, set_base_income};
