// src/lib.rs - Library root for beergame-coach

pub mod api;
pub mod cli;
pub mod coach;
pub mod infra;
pub mod persistence;
pub mod provider;
pub mod storage;
