//! Example-program translation to several scripting languages.
//!
//! `codetrans` takes a fully resolved compilation unit (symbols and types
//! already computed by a front-end) and re-expresses it idiomatically in
//! JavaScript, Groovy, Ruby or Kotlin. Structured containers become native
//! literals, data objects become maps or named-argument constructors, and
//! async-result callbacks are split into success and failure branches.
//!
//! # Architecture
//!
//! ```text
//! Resolved tree         Code model            Target languages
//! ─────────────    ───────────────────    ────────────────────
//!                                       ┌─> JavaScript
//! TreeProvider ──> ModelBuilder ─> ir ──┼─> Groovy
//! (input/)         (builder/)      (ir/) ├─> Ruby
//!                                       └─> Kotlin   (output/)
//! ```
//!
//! The builder classifies every type reference into a capability kind once
//! (structured object, data object, enum, throwable, ...). Model nodes then
//! answer field accesses, calls and constructions themselves, and render by
//! calling back into a [`CodeWriter`].
//!
//! # Example
//!
//! ```ignore
//! use codetrans::{Target, TranslateConfig, Translator, UnitTree};
//!
//! let tree = UnitTree::from_json(&json)?;
//! let script = Translator::new(TranslateConfig::for_target(Target::Kotlin)).translate(&tree)?;
//! ```
//!
//! # Note on Translation Fidelity
//!
//! Only a restricted subset of the source language is accepted: one catch
//! clause per try, canonical loop shapes, no `while`/`break`/`continue`.
//! Anything else fails with [`TranslateError::Unsupported`] naming the
//! construct; no partial output is produced.

pub mod builder;
pub mod config;
pub mod context;
pub mod input;
pub mod ir;
pub mod output;
pub mod scope;
pub mod traits;
pub mod translate;
pub mod types;

// Re-exports: configuration
pub use config::{Classification, ConfigError, TranslateConfig};

// Re-exports: input
pub use input::UnitTree;

// Re-exports: model
pub use ir::{Block, Expr, MethodModel, Stmt, UnitModel};
pub use scope::VariableScope;
pub use types::{ClassKind, ClassType, MethodSignature, TypeInfo};

// Re-exports: traits
pub use traits::{Construct, TranslateError, TreeProvider};

// Re-exports: translation
pub use builder::ModelBuilder;
pub use context::{ModelFactory, TranslationContext};
pub use translate::{Translator, translate};

// Re-exports: writers
pub use output::{CodeWriter, Target};
#[cfg(feature = "write-groovy")]
pub use output::GroovyWriter;
#[cfg(feature = "write-javascript")]
pub use output::JavaScriptWriter;
#[cfg(feature = "write-kotlin")]
pub use output::KotlinWriter;
#[cfg(feature = "write-ruby")]
pub use output::RubyWriter;
