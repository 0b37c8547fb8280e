//! Transform compiler for `propcodec`.
//!
//! Given a [`TypeDescriptor`](propcodec_core::TypeDescriptor), a
//! [`Mode`](propcodec_core::Mode) and the name of the binding holding the
//! value, [`generate`] decides whether the value needs any transformation and,
//! if so, describes it as an [`Expr`] tree. The description is pure data;
//! [`Plan::compile`] turns it into a closure tree that is built once per prop
//! and applied to every instance afterwards.
//!
//! # Typical Flow
//! ```rust
//! use propcodec_core::{Mode, TypeDescriptor, TypeKey, TypeRegistry, Value};
//! use propcodec_transform::{Context, NoRecords, Plan, TransformResult, generate};
//!
//! let registry = TypeRegistry::new();
//! let ty = TypeDescriptor::array(TypeDescriptor::scalar(TypeKey::STRING));
//!
//! let result = generate(&registry, &ty, Mode::Serialize, "tags").unwrap();
//! assert!(matches!(result, TransformResult::Expression(_)));
//!
//! let plan = Plan::compile(&registry, &result).unwrap();
//! let ctx = Context::new(&NoRecords);
//! let tags = Value::List(vec![Value::string("a")]);
//! assert_eq!(plan.apply(&tags, &ctx).unwrap(), tags);
//! ```

mod error;
mod expr;
mod generate;
mod plan;
mod policy;
mod resolve;

pub use error::{CompileError, PlanError, TransformError};
pub use expr::{Container, Expr, TransformResult};
pub use generate::{Generator, generate};
pub use plan::{Context, NoRecords, Plan, RecordDispatch};
pub use policy::{CompileOptions, ParsePolicyError, UnionPolicy};
pub use resolve::canonical_name_for;
