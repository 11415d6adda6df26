// Front-ends - for now a plain text menu on stdin/stdout

pub mod menu;

pub use menu::{Menu, MenuChoice};
