pub mod app;
pub mod batch;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod pairing;
pub mod record;
pub mod storage;
