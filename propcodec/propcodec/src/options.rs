/// Options for [`CodecSet::serialize`](crate::CodecSet::serialize).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Fail on a required prop without a value instead of omitting it.
    /// Passed through to nested records.
    pub strict: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl SerializeOptions {
    pub fn strict(strict: bool) -> Self {
        Self { strict }
    }
}

/// Options for [`CodecSet::from_hash`](crate::CodecSet::from_hash).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeserializeOptions {
    /// Reject stored keys that match no declared prop instead of keeping
    /// them as extra entries. Applies to the top-level record only.
    pub strict: bool,
}

impl DeserializeOptions {
    pub fn strict(strict: bool) -> Self {
        Self { strict }
    }
}
