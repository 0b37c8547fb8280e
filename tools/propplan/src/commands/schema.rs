use std::{fmt::Write as _, fs, path::PathBuf};

use anyhow::Result;
use clap::Args;
use propcodec::{core::format_prop_defs, transform::CompileOptions};

use super::{load_codecs, select};

#[derive(Args)]
pub struct SchemaArgs {
    /// Path to the JSON schema file
    input: PathBuf,

    /// Only show this record
    #[arg(short, long)]
    record: Option<String>,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl SchemaArgs {
    pub fn run(self) -> Result<()> {
        let codecs = load_codecs(&self.input, CompileOptions::default())?;
        let registry = codecs.registry();

        let mut text = String::new();
        for codec in select(&codecs, self.record.as_deref())? {
            let Some(schema) = registry.record(codec.key()) else {
                continue;
            };
            writeln!(text, "{}", codec.name())?;
            text.push_str(&format_prop_defs(registry, &schema.props)?);
        }

        match self.output {
            Some(path) => fs::write(path, text)?,
            None => print!("{text}"),
        }
        Ok(())
    }
}
