//! The env-gated diagnostic logging toggle (spec §5, §6.4, §9 "Global log
//! flag").
//!
//! `GDBWIRE_DEBUG_TO_STDERR` (presence, any value) opts into writing
//! diagnostic messages to stderr. The flag is read once on first use and
//! cached, mirroring the static-local read-once-and-cache pattern of
//! `gdbwire_logger_log` in the original — reimplemented through `tracing`
//! and a one-shot `tracing-subscriber` stderr sink instead of hand-rolled
//! `vsnprintf`/`fprintf`, since this crate's retrieval pack reaches for
//! `tracing` for exactly this ambient concern.
//!
//! Libraries normally leave subscriber installation to the application.
//! This module installs its own only when the caller opts in via the
//! environment variable, since that exact behavior is what spec §6.4
//! mandates; when the variable is unset, these functions are no-ops and a
//! host application's own subscriber (if any) is left untouched.

use std::env;
use std::sync::OnceLock;

use crate::value::ParseError;

static DEBUG_TO_STDERR: OnceLock<bool> = OnceLock::new();

fn debug_to_stderr() -> bool {
    *DEBUG_TO_STDERR.get_or_init(|| {
        let enabled = env::var_os("GDBWIRE_DEBUG_TO_STDERR").is_some();
        if enabled {
            install_stderr_subscriber();
        }
        enabled
    })
}

fn install_stderr_subscriber() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub(crate) fn log_push(bytes: usize) {
    if debug_to_stderr() {
        tracing::debug!(bytes, "pushed data into parser");
    }
}

pub(crate) fn log_parse_error(err: &ParseError) {
    if debug_to_stderr() {
        tracing::warn!(
            token = %err.token,
            start_column = err.pos.start_column,
            end_column = err.pos.end_column,
            "recovering from a parse error at newline",
        );
    }
}

pub(crate) fn log_annotation_push(bytes: usize) {
    if debug_to_stderr() {
        tracing::debug!(bytes, "pushed data into annotation parser");
    }
}

pub(crate) fn log_decode_error(message: &str) {
    if debug_to_stderr() {
        tracing::warn!(message, "command decode failed");
    }
}
