//! The set of compiled record codecs for one registry.

use std::{collections::BTreeMap, sync::Arc};

use propcodec_core::{Object, TypeKey, TypeRegistry, Value};
use propcodec_transform::{CompileOptions, Generator, RecordDispatch, TransformError};
use rayon::prelude::*;
use tracing::info;

use crate::{
    codec::RecordCodec,
    error::CodecError,
    options::{DeserializeOptions, SerializeOptions},
};

/// Compiled codecs for every record type of a [`TypeRegistry`].
///
/// All transforms are generated and compiled up front, so naming problems
/// surface from [`CodecSet::compile`] rather than from the first call.
#[derive(Debug)]
pub struct CodecSet {
    registry: Arc<TypeRegistry>,
    options: CompileOptions,
    codecs: BTreeMap<TypeKey, RecordCodec>,
}

/// Builder for configuring [`CodecSet`].
pub struct CodecSetBuilder {
    registry: Arc<TypeRegistry>,
    options: CompileOptions,
}

impl CodecSet {
    pub fn builder(registry: Arc<TypeRegistry>) -> CodecSetBuilder {
        CodecSetBuilder {
            registry,
            options: CompileOptions::default(),
        }
    }

    /// Compile with default [`CompileOptions`].
    pub fn compile(registry: Arc<TypeRegistry>) -> Result<Self, CodecError> {
        Self::builder(registry).build()
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn codec(&self, key: TypeKey) -> Option<&RecordCodec> {
        self.codecs.get(&key)
    }

    /// Codec of the record registered under `name`.
    pub fn codec_by_name(&self, name: &str) -> Option<&RecordCodec> {
        self.registry.lookup(name).and_then(|key| self.codec(key))
    }

    /// Codecs in registration order.
    pub fn codecs(&self) -> impl Iterator<Item = &RecordCodec> {
        self.codecs.values()
    }

    fn require_codec(&self, key: TypeKey) -> Result<&RecordCodec, CodecError> {
        self.codec(key).ok_or(CodecError::UnknownRecord { key })
    }

    /// Serialize a record object into its storage hash.
    pub fn serialize(&self, value: &Value, options: SerializeOptions) -> Result<Value, CodecError> {
        let Value::Object(record) = value else {
            return Err(CodecError::NotARecord {
                actual: value.variant_name(),
            });
        };
        let codec = self.require_codec(record.type_key)?;
        Ok(codec.serialize(record, options.strict, self)?)
    }

    /// Rebuild a record of type `key` from its storage hash.
    pub fn from_hash(
        &self,
        key: TypeKey,
        repr: &Value,
        options: DeserializeOptions,
    ) -> Result<Value, CodecError> {
        let codec = self.require_codec(key)?;
        Ok(codec.from_hash(repr, options.strict, self)?)
    }

    /// [`serialize`](Self::serialize), then convert to JSON.
    pub fn to_json(
        &self,
        value: &Value,
        options: SerializeOptions,
    ) -> Result<serde_json::Value, CodecError> {
        Ok(self.serialize(value, options)?.to_json()?)
    }

    /// Read a JSON document as a storage hash, then [`from_hash`](Self::from_hash).
    pub fn from_json(
        &self,
        key: TypeKey,
        json: &serde_json::Value,
        options: DeserializeOptions,
    ) -> Result<Value, CodecError> {
        self.from_hash(key, &Value::from_json(json), options)
    }
}

impl RecordDispatch for CodecSet {
    fn serialize_record(&self, record: &Arc<Object>, strict: bool) -> Result<Value, TransformError> {
        let codec = self
            .codec(record.type_key)
            .ok_or(TransformError::UnknownRecord {
                key: record.type_key,
            })?;
        codec.serialize(record, strict, self)
    }

    /// Nested records are rebuilt non-strictly.
    fn record_from_hash(&self, key: TypeKey, repr: &Value) -> Result<Value, TransformError> {
        let codec = self
            .codec(key)
            .ok_or(TransformError::UnknownRecord { key })?;
        codec.from_hash(repr, false, self)
    }
}

impl CodecSetBuilder {
    pub fn with_compile_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Generate and compile every prop of every record.
    ///
    /// Records are compiled in parallel; the reported error is the one of the
    /// first failing record in registration order.
    pub fn build(self) -> Result<CodecSet, CodecError> {
        let registry = self.registry.as_ref();
        let generator = Generator::new(registry).with_options(self.options);
        let keys: Vec<TypeKey> = registry.record_keys().collect();

        let compiled: Vec<Result<RecordCodec, CodecError>> = keys
            .par_iter()
            .filter_map(|&key| registry.record(key).map(|schema| (key, schema)))
            .map(|(key, schema)| RecordCodec::compile(registry, generator, key, schema))
            .collect();

        let mut codecs = BTreeMap::new();
        for codec in compiled {
            let codec = codec?;
            codecs.insert(codec.key(), codec);
        }
        info!(
            records = codecs.len(),
            union_policy = self.options.union_policy.as_str(),
            "compiled record codecs"
        );

        Ok(CodecSet {
            registry: self.registry,
            options: self.options,
            codecs,
        })
    }
}
