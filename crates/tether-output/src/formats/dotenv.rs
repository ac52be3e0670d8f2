// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `KEY=value` lines, sorted by key.

use tether_config::dotenv::{format_line, parse_env};
use tether_core::{EnvRecord, Result};

use super::last_wins;
use crate::format::{Formatter, InputData, InputFormat};

#[derive(Debug, Default, Clone, Copy)]
pub struct DotenvFormat;

impl Formatter for DotenvFormat {
    fn name(&self) -> &'static str {
        "dotenv"
    }

    fn render(&self, records: &[EnvRecord]) -> Result<Vec<u8>> {
        let mut out = String::new();
        for (key, value) in last_wins(records) {
            out.push_str(&format_line(key, value));
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

impl InputFormat for DotenvFormat {
    fn name(&self) -> &'static str {
        "dotenv"
    }

    fn detect(&self, data: &[u8]) -> bool {
        // JSON documents can parse as odd dotenv lines; leave them to the JSON formats.
        match data.iter().find(|b| !b.is_ascii_whitespace()) {
            None | Some(b'{') | Some(b'[') => false,
            Some(_) => parse_env(data).is_ok(),
        }
    }

    fn parse(&self, data: &[u8]) -> Result<InputData> {
        Ok(InputData::Map(parse_env(data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(records: &[EnvRecord]) -> String {
        String::from_utf8(DotenvFormat.render(records).unwrap()).unwrap()
    }

    #[test]
    fn single_record() {
        assert_eq!(render(&[EnvRecord::new("MY_KEY", "myvalue")]), "MY_KEY=myvalue\n");
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn sorted_and_quoted() {
        let out = render(&[
            EnvRecord::new("B", "2"),
            EnvRecord::new("A", "hello world"),
            EnvRecord::new("C", "it's"),
        ]);
        assert_eq!(out, "A='hello world'\nB=2\nC=\"it's\"\n");
    }

    #[test]
    fn later_duplicate_wins() {
        let out = render(&[EnvRecord::new("A", "1"), EnvRecord::new("A", "2")]);
        assert_eq!(out, "A=2\n");
    }

    #[test]
    fn detect_and_parse() {
        assert!(DotenvFormat.detect(b"A=1\nB='two'\n"));
        assert!(!DotenvFormat.detect(b""));
        assert!(!DotenvFormat.detect(b"{\"A\":\"1\"}"));

        let parsed = DotenvFormat.parse(b"A=1\nB='two words'\n").unwrap();
        let InputData::Map(map) = parsed else {
            panic!("expected a map");
        };
        assert_eq!(map["A"], "1");
        assert_eq!(map["B"], "two words");
    }
}
