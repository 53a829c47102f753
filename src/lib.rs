pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod merge;
pub mod mutation;
pub mod notify;
pub mod order;
pub mod ownership;
pub mod reconcile;
pub mod search;
pub mod social;
pub mod store;
pub mod utils;
pub mod viewer;

#[cfg(test)]
mod test;
