pub mod app;
pub mod config;
pub mod dto;
pub mod gateway;
pub mod handler;
pub mod middlewares;
pub mod model;
pub mod repository;
pub mod router;
pub mod service;
pub mod util;
