//! Interactive prompts collecting the configuration for one run.
//!
//! Everything is gathered up front into an immutable [`RunConfig`] before
//! any font is read, so a bad answer aborts the run instead of leaving a
//! half-written output behind.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use fontgraft_transfer::{Alignment, FontMetadata, Selection, TransferOptions};

/// Everything the run needs, answered and validated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub options: TransferOptions,
    pub metadata: FontMetadata,
}

/// Reads answers from `input` and writes prompts to `output`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line).context("Failed to read input")?;
        Ok(line.trim().to_string())
    }

    /// Pick one font from `fonts`. A single candidate is announced and
    /// used directly; with several, a blank or unparseable answer selects
    /// the first.
    pub fn choose_font(&mut self, label: &str, fonts: &[PathBuf]) -> Result<PathBuf> {
        if fonts.is_empty() {
            bail!("No {label} fonts found");
        }
        if let [only] = fonts {
            self.say(&format!("Using {label} font {}", only.display()))?;
            return Ok(only.clone());
        }

        self.say(&format!("Available {label} fonts:"))?;
        for (index, font) in fonts.iter().enumerate() {
            self.say(&format!("  [{index}] {}", font.display()))?;
        }
        let answer = self.ask(&format!("Select {label} font [0]: "))?;
        let index = answer.parse::<usize>().ok().filter(|&i| i < fonts.len()).unwrap_or(0);
        Ok(fonts[index].clone())
    }

    /// Ask for the codepoint selection, alignment mode, and output naming.
    pub fn gather(&mut self) -> Result<RunConfig> {
        let mut selection = Selection::new();

        let start = self.ask("Range start (hex, blank to skip): ")?;
        let end = self.ask("Range end (hex, blank to skip): ")?;
        match (start.is_empty(), end.is_empty()) {
            (true, true) => {}
            (false, false) => selection.add_range(&start, &end)?,
            _ => bail!("A codepoint range needs both a start and an end"),
        }

        let list = self.ask("Extra codepoints (hex, comma separated, blank to skip): ")?;
        selection.add_list(&list)?;
        let codepoints = selection.build()?;

        let family_name = self.ask("New family name: ")?;
        let author = self.ask("Author: ")?;
        let license = self.ask("License (blank for the default notice): ")?;
        let license = (!license.is_empty()).then_some(license);
        let metadata = FontMetadata::new(family_name, author, license)?;

        self.say("Vertical alignment:")?;
        self.say("  [1] keep source top")?;
        self.say("  [2] match destination top")?;
        self.say("  [3] match destination bottom")?;
        let alignment = Alignment::from_choice(&self.ask("Choice [1]: ")?);

        Ok(RunConfig { options: TransferOptions::new(codepoints, alignment), metadata })
    }
}

/// Convenience for the non-test path.
pub fn stdio_prompter() -> Prompter<std::io::BufReader<std::io::Stdin>, std::io::Stdout> {
    Prompter::new(std::io::BufReader::new(std::io::stdin()), std::io::stdout())
}
