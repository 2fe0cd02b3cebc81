pub mod core;
pub mod directory;
pub mod main_module;
pub mod records;
pub mod report;
pub mod security;
pub mod sheet;
pub mod store;
pub mod tickets;
pub mod web;
