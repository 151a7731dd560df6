pub mod calendar;
pub mod conflict;
pub mod service;
pub mod week_template;
