mod components;
mod handlers;
mod screens;

pub use components::App;
