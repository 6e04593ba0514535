//! HTTP request handlers

pub mod admin;
pub mod ajax;
pub mod health;
pub mod session;
