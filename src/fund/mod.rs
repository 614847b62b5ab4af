pub mod handlers;
pub mod models;
mod service;

pub use handlers::{
    add_transaction, create_fund, delete_fund, delete_transaction, get_fund, list_funds,
    update_fund, update_transaction,
};
