//! Overseer Core
//!
//! Core types shared by the Overseer client, monitor and CLI.
//!
//! This crate contains:
//! - Domain types: backend-owned snapshots (recurring jobs, training requests, models)
//! - DTOs: request/response bodies exchanged with the automation backend
//! - Presenter: pure formatting of countdowns and timestamps

pub mod domain;
pub mod dto;
pub mod presenter;
