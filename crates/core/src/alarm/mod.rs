pub mod alarm_controller;
pub mod domain;
pub mod infrastructure;
