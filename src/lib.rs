pub mod access;
pub mod app;
pub mod archive;
pub mod auth;
pub mod config;
pub mod dates;
pub mod diagnosis;
pub mod emr;
pub mod error;
pub mod exercise;
pub mod mailer;
pub mod meals;
pub mod responses;
pub mod reviews;
pub mod state;
pub mod users;
pub mod verification;
pub mod weight;
