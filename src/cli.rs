//! Minimal CLI parsing.
//!
//! - `--check` validates the Photoview credentials and exits.
//! - `--entry-id <id>` / `--entry-id=<id>` overrides `PHOTOVIEW_ENTRY_ID`.

use std::env;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub check: bool,
    pub entry_id: Option<String>,
}

impl CliOptions {
    pub fn from_args() -> Self {
        Self::parse(env::args().skip(1))
    }

    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = CliOptions::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--check" => options.check = true,
                "--entry-id" => {
                    if let Some(value) = args.next() {
                        options.entry_id = Some(value);
                    }
                }
                _ if arg.starts_with("--entry-id=") => {
                    if let Some(value) = arg.split_once('=').map(|(_, v)| v) {
                        options.entry_id = Some(value.to_string());
                    }
                }
                _ => {}
            }
        }
        options
    }
}
