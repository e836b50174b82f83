//! Declared data structures: named parameters with conversion options.
//!
//! A [`Schema`] stores each parameter's properties in a [`MetaData`] tree so
//! they can be queried by path (`"created.format"`), and keeps the parsed
//! [`ParameterSpec`] alongside for conversion.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::convert::{self, DataType, ParameterSpec, TypedValue};
use crate::log::{ErrorLogger, LogEvent};
use crate::metadata::type_name;
use crate::{Error, MetaData};

/// Definition of a data structure's parameters.
///
/// ## Example
///
/// ```
/// use meta_commons::convert::{DataType, ParameterSpec, TypedValue};
/// use meta_commons::Schema;
/// use serde_json::json;
///
/// let schema = Schema::builder()
///     .parameter("age", ParameterSpec::new(DataType::Integer))
///     .parameter(
///         "colour",
///         ParameterSpec::new(DataType::Enum)
///             .with_options(["red", "green"])
///             .with_default("red"),
///     )
///     .build()?;
///
/// assert_eq!(schema.to_typed("age", &json!("30"))?, TypedValue::Integer(30));
/// assert_eq!(
///     schema.to_typed("colour", &json!("blue"))?,
///     TypedValue::String("red".into())
/// );
/// # Ok::<(), meta_commons::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    definition: MetaData,
    names: Vec<String>,
    specs: HashMap<String, ParameterSpec>,
    logger: Option<Arc<dyn ErrorLogger>>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Builds a schema from a JSON object mapping parameter names to property
    /// objects, e.g. `{"age": {"data_type": "Integer", "optional": true}}`.
    pub fn from_value(source: Value) -> Result<Self, Error> {
        let parameters = match source {
            Value::Object(parameters) => parameters,
            other => {
                return Err(Error::InvalidSource(format!(
                    "schema must be an object, found {}",
                    type_name(&other)
                )))
            }
        };

        let mut entries = Vec::with_capacity(parameters.len());
        for (name, properties) in parameters {
            let Value::Object(properties) = properties else {
                return Err(Error::InvalidSource(format!(
                    "parameter [{name}] must be an object of properties"
                )));
            };
            entries.push((name, properties));
        }

        Self::assemble(entries, None)
    }

    fn assemble(
        entries: Vec<(String, Map<String, Value>)>,
        logger: Option<Arc<dyn ErrorLogger>>,
    ) -> Result<Self, Error> {
        let common = common_properties()?;
        let mut definition = MetaData::new();
        let mut names = Vec::with_capacity(entries.len());
        let mut specs = HashMap::with_capacity(entries.len());

        for (name, properties) in entries {
            let mut merged = common.clone();
            merged.extend(properties);
            let merged = Value::Object(merged);

            let spec: ParameterSpec = serde_json::from_value(merged.clone())
                .map_err(|e| Error::InvalidSource(format!("parameter [{name}]: {e}")))?;

            definition.add(&name, merged, false, None)?;
            specs.insert(name.clone(), spec);
            names.push(name);
        }

        tracing::debug!(parameters = names.len(), "schema assembled");
        Ok(Self {
            definition,
            names,
            specs,
            logger,
        })
    }

    /// Attaches a logger that is told about conversions left unconverted.
    pub fn set_logger(&mut self, logger: Arc<dyn ErrorLogger>) {
        self.logger = Some(logger);
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// True if the parameter defines `property`, which may be a path
    /// (`"json_options.load"`).
    pub fn has_parameter_property(&self, name: &str, property: &str) -> bool {
        self.has_parameter(name) && self.definition.has(&self.property_path(name, property))
    }

    pub fn is_parameter_optional(&self, name: &str) -> bool {
        self.specs.get(name).is_some_and(|spec| spec.optional)
    }

    /// Returns a parameter property, or `default` when it is not defined.
    pub fn parameter_property(&self, name: &str, property: &str, default: Value) -> Value {
        if !self.has_parameter(name) {
            return default;
        }
        self.definition
            .get_or(&self.property_path(name, property), default)
    }

    /// Parameter names in declaration order.
    pub fn parameter_names(&self) -> &[String] {
        &self.names
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.get(name)
    }

    /// The full definition, one property object per parameter.
    pub fn definition(&self) -> &MetaData {
        &self.definition
    }

    /// Converts a raw value for `name` into its declared type.
    pub fn to_typed(&self, name: &str, raw: &Value) -> Result<TypedValue, Error> {
        let spec = self.spec(name)?;
        let typed = convert::to_typed(spec, raw);

        if typed.is_raw() && spec.data_type != DataType::Mixed {
            if let Some(logger) = &self.logger {
                logger.record(
                    LogEvent::notice(format!(
                        "parameter [{name}] could not be converted to {}",
                        spec.data_type
                    ))
                    .with_data(raw.clone()),
                );
            }
        }

        Ok(typed)
    }

    /// Converts a typed value for `name` back into its raw form.
    pub fn to_raw(&self, name: &str, typed: &TypedValue) -> Result<Value, Error> {
        Ok(convert::to_raw(self.spec(name)?, typed))
    }

    fn spec(&self, name: &str) -> Result<&ParameterSpec, Error> {
        self.specs
            .get(name)
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))
    }

    fn property_path(&self, name: &str, property: &str) -> String {
        format!("{name}{}{property}", self.definition.separator())
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct SchemaBuilder {
    parameters: Vec<(String, ParameterSpec, Map<String, Value>)>,
    logger: Option<Arc<dyn ErrorLogger>>,
}

impl SchemaBuilder {
    /// Declares a parameter. Later declarations of the same name fail at
    /// build time.
    pub fn parameter(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.parameters.push((name.into(), spec, Map::new()));
        self
    }

    /// Attaches an extra property to the most recently declared parameter,
    /// e.g. `json_options` for application use.
    pub fn property(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Some((_, _, extra)) = self.parameters.last_mut() {
            extra.insert(property.into(), value.into());
        }
        self
    }

    pub fn logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> Result<Schema, Error> {
        let mut entries = Vec::with_capacity(self.parameters.len());
        for (name, spec, extra) in self.parameters {
            let Value::Object(mut properties) = serde_json::to_value(&spec)
                .map_err(|e| Error::InvalidSource(format!("parameter [{name}]: {e}")))?
            else {
                return Err(Error::InvalidSource(format!(
                    "parameter [{name}] did not serialize to an object"
                )));
            };
            properties.extend(extra);
            entries.push((name, properties));
        }

        Schema::assemble(entries, self.logger)
    }
}

/// Properties every parameter starts from.
fn common_properties() -> Result<Map<String, Value>, Error> {
    match serde_json::to_value(ParameterSpec::default()) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::InvalidSource(format!(
            "parameter defaults serialized to {}",
            type_name(&other)
        ))),
        Err(e) => Err(Error::InvalidSource(e.to_string())),
    }
}
