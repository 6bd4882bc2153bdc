pub mod db;

pub use db::{establish_connection, DbPool};
