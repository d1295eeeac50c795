pub mod app;
pub mod barcode;
pub mod config;
pub mod criteria;
pub mod domain;
pub mod error;
pub mod filter;
pub mod gdc;
pub mod output;
pub mod request;
pub mod tissue;
