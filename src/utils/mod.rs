// src/utils/mod.rs

pub mod chart;
pub mod html;
pub mod seed;
pub mod table;
