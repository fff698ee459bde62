pub mod auth;
pub mod features;
pub mod health;
pub mod institutions;
pub mod menus;
pub mod security;
pub mod users;
