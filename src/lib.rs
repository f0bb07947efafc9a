// SPDX-License-Identifier: GPL-2.0-or-later
use thiserror::Error as ThisError;

/// An enumeration of errors Earmark library functions can encounter.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("The clip store could not be reached: {0}")]
    Http(#[from] reqwest::Error),
    #[error("The clip store responded with {status}: {message}")]
    Store {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("The clip store sent a response that could not be understood: {0}")]
    UnexpectedResponse(String),
    #[error("Configuration file could not be read: {0}")]
    ConfigReadError(#[from] std::io::Error),
    #[error("Configuration file could not be parsed: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("Configuration file contains invalid values: {0}")]
    ConfigValueError(String),
    #[error("HTTP server encountered an error: {0}")]
    Server(std::io::Error),
    #[error("Client request is invalid: {0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

pub mod cli;
pub mod config;
pub mod store;
pub mod web;
