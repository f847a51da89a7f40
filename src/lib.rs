pub mod app;
pub mod components;
pub mod config;
pub mod editor;
pub mod error;
pub mod helpers;
pub mod input;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod ui;
