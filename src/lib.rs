// Concept tree library - exposes all core modules for testing

pub mod config;
pub mod namespace;
pub mod services;
pub mod view;
