pub mod admin;
pub mod api;
pub mod catalog;
pub mod db;
pub mod error;
pub mod ledger;
pub mod mailer;
pub mod storage;
pub mod store;
pub mod tracing;

pub mod util {
    pub mod env;
}
