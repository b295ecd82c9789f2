pub mod activity;
pub mod catalog;
pub mod competition;
pub mod config;
pub mod extract;
pub mod feed;
pub mod fixture;
pub mod ranking;
pub mod scoring;
