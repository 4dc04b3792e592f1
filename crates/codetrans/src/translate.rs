//! Unit translation: build the model for a unit, then render it.

use crate::builder::ModelBuilder;
use crate::config::TranslateConfig;
use crate::context::{ModelFactory, TranslationContext};
use crate::ir::{FieldModel, MethodModel, UnitModel};
use crate::output;
use crate::traits::{Construct, TranslateError, TreeProvider};
use std::collections::BTreeMap;
use tracing::debug;

/// Translates units for one configured target.
///
/// A translator holds no per-unit state; one instance can serve any number
/// of units, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslateConfig,
}

impl Translator {
    pub fn new(config: TranslateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranslateConfig {
        &self.config
    }

    /// Build the code model of a unit.
    ///
    /// The entry method is built first; every method and field it reaches
    /// through `this` is then built in turn until nothing new is referenced.
    /// Helpers keep their declaration order.
    pub fn build<P: TreeProvider + ?Sized>(&self, provider: &P) -> Result<UnitModel, TranslateError> {
        let unit = provider.unit();
        debug!(
            unit = %unit.name,
            target = self.config.target.name(),
            entry = %self.config.entry_method,
            "building unit"
        );
        let ctx = TranslationContext::new(ModelFactory::from_config(&self.config));
        let mut builder = ModelBuilder::new(provider, &self.config.classification);

        let Some((entry_index, entry_decl)) = unit
            .methods
            .iter()
            .enumerate()
            .find(|(_, method)| method.name == self.config.entry_method)
        else {
            return Err(TranslateError::unsupported(
                Construct::Unit,
                format!("`{}` has no `{}` method", unit.name, self.config.entry_method),
            ));
        };
        let entry = builder.method(entry_decl, &ctx)?;

        let mut methods: BTreeMap<usize, MethodModel> = BTreeMap::new();
        let mut fields: BTreeMap<usize, FieldModel> = BTreeMap::new();
        loop {
            let references = builder.references().clone();
            let pending_fields: Vec<usize> = unit
                .fields
                .iter()
                .enumerate()
                .filter(|(index, field)| {
                    !fields.contains_key(index) && references.fields.contains(&field.name)
                })
                .map(|(index, _)| index)
                .collect();
            let pending_methods: Vec<usize> = unit
                .methods
                .iter()
                .enumerate()
                .filter(|(index, method)| {
                    *index != entry_index
                        && !methods.contains_key(index)
                        && references.methods.contains(&method.name)
                })
                .map(|(index, _)| index)
                .collect();
            if pending_fields.is_empty() && pending_methods.is_empty() {
                break;
            }
            for index in pending_fields {
                if let Some(decl) = unit.fields.get(index) {
                    fields.insert(index, builder.field(decl, &ctx)?);
                }
            }
            for index in pending_methods {
                if let Some(decl) = unit.methods.get(index) {
                    methods.insert(index, builder.method(decl, &ctx)?);
                }
            }
        }
        debug!(
            unit = %unit.name,
            fields = fields.len(),
            methods = methods.len(),
            "unit built"
        );

        Ok(UnitModel {
            name: unit.name.clone(),
            fields: fields.into_values().collect(),
            methods: methods.into_values().collect(),
            entry: entry.body,
        })
    }

    /// Render a built unit with the configured target's writer.
    pub fn render(&self, unit: &UnitModel) -> Result<String, TranslateError> {
        let mut writer = output::writer(&self.config)?;
        writer.render_unit(unit)?;
        Ok(writer.take_output())
    }

    /// Translate one unit to target source text.
    pub fn translate<P: TreeProvider + ?Sized>(&self, provider: &P) -> Result<String, TranslateError> {
        let unit = self.build(provider)?;
        self.render(&unit)
    }
}

/// Translate one unit with the given configuration.
pub fn translate<P: TreeProvider + ?Sized>(
    provider: &P,
    config: &TranslateConfig,
) -> Result<String, TranslateError> {
    Translator::new(config.clone()).translate(provider)
}
