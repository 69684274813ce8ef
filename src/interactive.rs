//! Prompt loop for the standalone program
//!
//! Each turn is either a prompt, sent to the engine, or a line of
//! `key=value` tokens that edits the [`ParameterStore`].

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::backend::Backend;
use crate::config::{PredictConfig, TurnMode};
use crate::error::Result;
use crate::params::ParameterStore;
use crate::predict::predict;
use crate::session::Session;

const PROMPT_MARKER: &str = ">>> ";

pub struct InteractiveLoop<'a, B: Backend> {
    session: &'a Session<B>,
    store: &'a ParameterStore,
    base: PredictConfig,
    mode: TurnMode,
}

impl<'a, B: Backend> InteractiveLoop<'a, B> {
    pub fn new(session: &'a Session<B>, store: &'a ParameterStore, base: PredictConfig, mode: TurnMode) -> Self {
        Self {
            session,
            store,
            base,
            mode,
        }
    }

    /// Run until `reader` is exhausted.
    ///
    /// Rejected parameter edits are reported on `writer` and the loop goes on.
    /// Read, write and prediction failures end the loop with an error.
    pub fn run<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<()> {
        self.print_settings(&mut writer)?;

        while let Some(prompt) = self.read_turn(&mut reader, &mut writer)? {
            debug!(prompt_len = prompt.len(), "sending prompt");
            let config = self.store.resolve(&self.base);
            let text = predict(self.session, &prompt, &config)?;
            write!(writer, "\n{}\n\n", text)?;
            writer.flush()?;
        }

        debug!("end of input");
        Ok(())
    }

    /// Read the next prompt; `None` at end of input
    fn read_turn<R: BufRead, W: Write>(&self, reader: &mut R, writer: &mut W) -> Result<Option<String>> {
        let mut lines: Vec<String> = Vec::new();
        write!(writer, "{}", PROMPT_MARKER)?;
        writer.flush()?;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(None);
            }
            // Undecodable bytes become U+FFFD
            let line = String::from_utf8_lossy(&buf).into_owned();

            if line.trim().is_empty() {
                if self.mode == TurnMode::MultiLine && !lines.is_empty() {
                    return Ok(Some(lines.concat()));
                }
                continue;
            }

            match self.store.apply_line(&line) {
                Ok(true) => {
                    lines.clear();
                    self.print_settings(writer)?;
                    write!(writer, "{}", PROMPT_MARKER)?;
                    writer.flush()?;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "rejected parameter change");
                    writeln!(writer, "Invalid parameter change: {}", e)?;
                    write!(writer, "{}", PROMPT_MARKER)?;
                    writer.flush()?;
                    continue;
                }
            }

            match self.mode {
                TurnMode::SingleLine => {
                    return Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()));
                }
                TurnMode::MultiLine => lines.push(line),
            }
        }
    }

    fn print_settings<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "Settings: {}\n", self.store)?;
        Ok(())
    }
}
