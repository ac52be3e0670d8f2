// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writes payloads to a byte stream, standard output by default.

use std::io::{self, Write};

use tether_core::{Result, TetherError};

use crate::writer::Writer;

pub struct StreamWriter<W> {
    inner: W,
}

impl StreamWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> Writer for StreamWriter<W> {
    fn name(&self) -> &str {
        "stdout"
    }

    fn write(&mut self, payload: &[u8]) -> Result<()> {
        self.inner
            .write_all(payload)
            .and_then(|()| self.inner.flush())
            .map_err(|e| TetherError::io("<stdout>", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_payload_verbatim() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write(b"A=1\n").unwrap();
        writer.write(b"B=2\n").unwrap();
        assert_eq!(writer.into_inner(), b"A=1\nB=2\n");
    }
}
