use std::str::FromStr;

/// Policy for general unions, i.e. unions that are not "absence or `T`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnionPolicy {
    /// Always deep-clone the value; the compiler does not try to tell which
    /// member a value belongs to.
    #[default]
    DeepClone,
    /// Return identity when every member compiles to identity, deep-clone
    /// otherwise.
    IdentityWhenAllMembersIdentity,
}

impl UnionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnionPolicy::DeepClone => "deep-clone",
            UnionPolicy::IdentityWhenAllMembersIdentity => "identity-when-all-members-identity",
        }
    }
}

/// Error returned when parsing a policy name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown union policy '{0}' (expected deep-clone or identity-when-all-members-identity)")]
pub struct ParsePolicyError(pub String);

impl FromStr for UnionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deep-clone" => Ok(UnionPolicy::DeepClone),
            "identity-when-all-members-identity" => Ok(UnionPolicy::IdentityWhenAllMembersIdentity),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Options applied by [`Generator`](crate::Generator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    pub union_policy: UnionPolicy,
}
