//! HTTP implementation of the generation service.
//!
//! [`HttpGenerationClient`] talks to the Digital Twins backend:
//!
//! | operation        | endpoint                 |
//! |------------------|--------------------------|
//! | `submit`         | `POST /process-text`     |
//! | `poll_status`    | `GET /job/{job_id}`      |
//! | `check_health`   | `GET /health`            |
//! | `fetch_personas` | `GET /personas`          |
//! | `fetch_history`  | `GET /history`           |

mod client;
mod dto;

pub use client::HttpGenerationClient;
