//! Configuration boundary errors.
//!
//! Core grid, carving and pathing operations report failure with `Option` or `bool`; only the
//! parsing of user supplied settings surfaces these errors.
#![allow(deprecated)]

use error_chain::*;

error_chain! {
    foreign_links {
        Io(::std::io::Error);
    }

    errors {
        InvalidAlgorithm(name: String) {
            description("invalid maze algorithm")
            display("invalid maze algorithm: '{}' (expected binary_tree, sidewinder or dfs)", name)
        }
        InvalidOutputFormat(name: String) {
            description("invalid output format")
            display("invalid output format: '{}' (expected txt, text or stdout)", name)
        }
    }
}
