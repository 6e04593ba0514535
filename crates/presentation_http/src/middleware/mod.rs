//! HTTP middleware components

pub mod admin_auth;
pub mod ajax_form;

pub use admin_auth::{AdminAuth, AdminAuthLayer};
pub use ajax_form::AjaxForm;
