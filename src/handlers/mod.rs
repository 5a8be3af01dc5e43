// src/handlers/mod.rs

pub mod admin;
pub mod page;
pub mod survey;
