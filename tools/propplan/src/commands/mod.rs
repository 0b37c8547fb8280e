pub mod plan;
pub mod roundtrip;
pub mod schema;

use std::{path::Path, sync::Arc};

use anyhow::{Result, bail};
use propcodec::{
    CodecSet, RecordCodec,
    core::TypeRegistry,
    transform::CompileOptions,
};

use crate::schema_file::SchemaFile;

/// Load a schema file and compile codecs for all of its records.
fn load_codecs(path: &Path, options: CompileOptions) -> Result<CodecSet> {
    let registry: TypeRegistry = SchemaFile::load(path)?.into_registry()?;
    Ok(CodecSet::builder(Arc::new(registry))
        .with_compile_options(options)
        .build()?)
}

/// The codecs selected by `--record`, or all of them.
fn select<'a>(codecs: &'a CodecSet, record: Option<&str>) -> Result<Vec<&'a RecordCodec>> {
    match record {
        Some(name) => match codecs.codec_by_name(name) {
            Some(codec) => Ok(vec![codec]),
            None => bail!("record '{name}' not found"),
        },
        None => Ok(codecs.codecs().collect()),
    }
}
