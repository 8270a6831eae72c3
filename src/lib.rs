//! Lineup planning for team coaches: an in-memory planner that assigns roster
//! players to match quarters, served to the browser by a small actix-web host.

pub mod config;
pub mod directory;
pub mod display;
pub mod error;
pub mod form;
pub mod host;
pub mod permissions;
pub mod planner;
pub mod web;
