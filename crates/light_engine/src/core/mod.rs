//! Core subsystem services

pub mod config;
