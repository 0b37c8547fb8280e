use std::fmt;

/// Direction of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// In-memory value to storage representation.
    Serialize,
    /// Storage representation to in-memory value.
    Deserialize,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Serialize, Mode::Deserialize];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Serialize => "serialize",
            Mode::Deserialize => "deserialize",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
