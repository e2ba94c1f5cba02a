pub mod errors;
pub mod db;
pub mod celebration_msg;
