//! CLI definition and the interactive run.

use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use clap::Parser;
use fontgraft_transfer::transfer_and_rename;
use log::info;

use crate::{
    discover::{find_fonts, output_extension},
    io::{read_font, write_font},
    prompt::{Prompter, stdio_prompter},
};

#[derive(Parser)]
#[command(name = "fontgraft")]
#[command(about = "Copy glyphs between TrueType fonts for a chosen set of codepoints")]
pub struct Cli {
    /// Directory scanned for source fonts (glyphs are copied from these)
    #[arg(long, default_value = "Source")]
    pub source_dir: PathBuf,
    /// Directory scanned for destination fonts (glyphs are copied into these)
    #[arg(long, default_value = "Destination")]
    pub dest_dir: PathBuf,
    /// Directory the finished font is written to
    #[arg(long, default_value = "Output")]
    pub output_dir: PathBuf,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let mut prompter = stdio_prompter();
        run_interactive(&mut prompter, &self.source_dir, &self.dest_dir, &self.output_dir)
    }
}

/// One full run: gather the configuration, pick the fonts, transfer, and
/// write the output.
///
/// The directories are scanned up front so an empty one fails before any
/// prompt, but the interactive font picks come after the configuration
/// prompts, matching the console order of the selection and naming
/// questions.
pub fn run_interactive<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    source_dir: &Path,
    dest_dir: &Path,
    output_dir: &Path,
) -> Result<()> {
    let source_fonts = find_fonts(source_dir)?;
    if source_fonts.is_empty() {
        bail!("No source fonts found in {}", source_dir.display());
    }
    let dest_fonts = find_fonts(dest_dir)?;
    if dest_fonts.is_empty() {
        bail!("No destination fonts found in {}", dest_dir.display());
    }

    let config = prompter.gather()?;

    let source_path = prompter.choose_font("source", &source_fonts)?;
    let dest_path = prompter.choose_font("destination", &dest_fonts)?;

    let source = read_font(&source_path)?;
    let destination = read_font(&dest_path)?;
    let output = transfer_and_rename(&source, &destination, &config.options, &config.metadata)?;

    let output_path = output_dir.join(format!(
        "{}.{}",
        config.metadata.family_name(),
        output_extension(&dest_path)
    ));
    write_font(&output_path, &output.data)?;

    for cp in &output.skipped {
        prompter.say(&format!("{cp} was not found in the source font"))?;
    }
    prompter.say(&format!("Wrote {} ({})", output_path.display(), output.stats()))?;
    info!("done: {}", output.stats());
    Ok(())
}
