pub mod chatdb;
pub mod db;
pub mod profiledb;
pub mod quickfixdb;
