//! Output writers - render the code model as target source.

mod emitter;
mod writer;

pub use emitter::CodeEmitter;
pub use writer::{CodeWriter, RenderResult, escape_c_string, snake_case};

#[cfg(feature = "write-groovy")]
pub mod groovy;
#[cfg(feature = "write-javascript")]
pub mod javascript;
#[cfg(feature = "write-kotlin")]
pub mod kotlin;
#[cfg(feature = "write-ruby")]
pub mod ruby;

#[cfg(feature = "write-groovy")]
pub use groovy::GroovyWriter;
#[cfg(feature = "write-javascript")]
pub use javascript::JavaScriptWriter;
#[cfg(feature = "write-kotlin")]
pub use kotlin::KotlinWriter;
#[cfg(feature = "write-ruby")]
pub use ruby::RubyWriter;

use crate::config::TranslateConfig;
use crate::traits::{Construct, TranslateError};
use serde::{Deserialize, Serialize};

/// Target language of a translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    JavaScript,
    Groovy,
    Ruby,
    Kotlin,
}

impl Target {
    pub const ALL: [Target; 4] = [Target::JavaScript, Target::Groovy, Target::Ruby, Target::Kotlin];

    pub fn name(self) -> &'static str {
        match self {
            Target::JavaScript => "javascript",
            Target::Groovy => "groovy",
            Target::Ruby => "ruby",
            Target::Kotlin => "kotlin",
        }
    }

    /// File extension of translated scripts.
    pub fn extension(self) -> &'static str {
        match self {
            Target::JavaScript => "js",
            Target::Groovy => "groovy",
            Target::Ruby => "rb",
            Target::Kotlin => "kts",
        }
    }

    pub fn from_name(name: &str) -> Option<Target> {
        Self::ALL
            .into_iter()
            .find(|target| target.name().eq_ignore_ascii_case(name) || target.extension() == name)
    }
}

/// A fresh writer for the configured target.
pub fn writer(config: &TranslateConfig) -> Result<Box<dyn CodeWriter>, TranslateError> {
    let indent = config.indent.as_str();
    #[allow(unreachable_patterns)]
    match config.target {
        #[cfg(feature = "write-javascript")]
        Target::JavaScript => Ok(Box::new(JavaScriptWriter::new(indent))),
        #[cfg(feature = "write-groovy")]
        Target::Groovy => Ok(Box::new(GroovyWriter::new(indent))),
        #[cfg(feature = "write-ruby")]
        Target::Ruby => Ok(Box::new(RubyWriter::new(indent))),
        #[cfg(feature = "write-kotlin")]
        Target::Kotlin => Ok(Box::new(KotlinWriter::new(indent))),
        other => Err(TranslateError::unsupported(
            Construct::Render,
            format!("writer for `{}` is not enabled", other.name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_by_name_or_extension() {
        assert_eq!(Target::from_name("Kotlin"), Some(Target::Kotlin));
        assert_eq!(Target::from_name("rb"), Some(Target::Ruby));
        assert_eq!(Target::from_name("cobol"), None);
    }

    #[test]
    fn writer_reports_its_language() {
        for target in Target::ALL {
            let writer = writer(&TranslateConfig::for_target(target)).unwrap();
            assert_eq!(writer.language(), target.name());
        }
    }
}
