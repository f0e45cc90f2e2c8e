#![allow(clippy::too_many_arguments)]

pub mod logger;

pub mod app;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod error;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;
pub mod theme;
