use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use propcodec::{DeserializeOptions, SerializeOptions, transform::CompileOptions};
use tracing::info;

use super::{load_codecs, select};

#[derive(Args)]
pub struct RoundtripArgs {
    /// Path to the JSON schema file
    schema: PathBuf,

    /// Stored JSON document of one record
    input: PathBuf,

    /// Record type of the document
    #[arg(short, long)]
    record: String,

    /// Reject unknown keys when reading and missing required props when writing
    #[arg(long)]
    strict: bool,
}

impl RoundtripArgs {
    pub fn run(self) -> Result<()> {
        let codecs = load_codecs(&self.schema, CompileOptions::default())?;
        let codec = select(&codecs, Some(self.record.as_str()))?[0];

        let text = fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read {}", self.input.display()))?;
        let json: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", self.input.display()))?;

        let value = codecs.from_json(codec.key(), &json, DeserializeOptions::strict(self.strict))?;
        let written = codecs.to_json(&value, SerializeOptions::strict(self.strict))?;
        if written != json {
            info!(record = codec.name(), "stored document changed on round trip");
        }

        println!("{}", serde_json::to_string_pretty(&written)?);
        Ok(())
    }
}
