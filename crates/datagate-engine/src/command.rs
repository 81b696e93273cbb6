//! Command model and builder.

use std::sync::Arc;

use datagate_types::{Language, MediaType, Principal, SchemaId};
use indexmap::IndexMap;

use crate::error::GatewayError;

/// Property key holding the payload language.
pub const KEY_LANGUAGE: &str = "language";
/// Property key holding the target dataset.
pub const KEY_SCHEMA: &str = "schema";

/// Ordered multimap of command properties.
///
/// Key order is first-insertion order; every occurrence of a repeated
/// parameter is preserved in arrival order.
pub type Properties = IndexMap<String, Vec<String>>;

/// Immutable description of one dataset operation.
///
/// A command is either **valid** (all fields captured, ready to route)
/// or **invalid**, carrying exactly one construction error. Invalid
/// commands flow through the same channel as valid ones and
/// short-circuit the pipeline when [`ensure_valid`](Self::ensure_valid)
/// is first consulted, which gives the transport a single uniform error
/// path for malformed requests.
///
/// Commands are cheap to clone (shared backing data) and never mutated
/// after [`CommandBuilder::build`].
///
/// # Example
///
/// ```
/// use datagate_engine::Command;
/// use datagate_types::{Language, MediaType, Principal};
///
/// let command = Command::builder()
///     .language(Language::Sql)
///     .schema_name("default")
///     .property("query", "SELECT 1")
///     .accept(MediaType::new("application", "json"))
///     .owner(Principal::anonymous())
///     .build();
///
/// assert!(command.ensure_valid().is_ok());
/// assert_eq!(command.require("query").unwrap(), "SELECT 1");
/// assert_eq!(command.language().unwrap(), Language::Sql);
/// ```
#[derive(Debug, Clone)]
pub struct Command {
    data: Arc<CommandData>,
    invalid: Option<GatewayError>,
}

#[derive(Debug, Default)]
struct CommandData {
    properties: Properties,
    acceptable: Vec<MediaType>,
    owner: Principal,
}

impl Command {
    /// Starts building a command.
    #[must_use]
    pub fn builder() -> CommandBuilder {
        CommandBuilder::default()
    }

    /// Creates an invalid command carrying the given construction error.
    #[must_use]
    pub fn invalid(cause: GatewayError) -> Self {
        Self {
            data: Arc::new(CommandData::default()),
            invalid: Some(cause),
        }
    }

    /// Fails with the captured construction error, if any.
    ///
    /// # Errors
    ///
    /// Returns the error recorded while the command was built.
    pub fn ensure_valid(&self) -> Result<(), GatewayError> {
        match &self.invalid {
            Some(cause) => Err(cause.clone()),
            None => Ok(()),
        }
    }

    /// All captured properties, in arrival order.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.data.properties
    }

    /// Result media types accepted by the client, most preferred first.
    #[must_use]
    pub fn acceptable(&self) -> &[MediaType] {
        &self.data.acceptable
    }

    /// The identity that issued this command.
    #[must_use]
    pub fn owner(&self) -> &Principal {
        &self.data.owner
    }

    /// The target dataset of this command.
    ///
    /// # Errors
    ///
    /// Fails if the `schema` property is missing, duplicated or not a
    /// legal schema id.
    pub fn schema(&self) -> Result<SchemaId, GatewayError> {
        let raw = self.require(KEY_SCHEMA)?;
        raw.parse()
            .map_err(|e| GatewayError::InvalidCommand(format!("{e}")))
    }

    /// The payload language of this command.
    ///
    /// # Errors
    ///
    /// Fails if the `language` property is missing or duplicated.
    pub fn language(&self) -> Result<Language, GatewayError> {
        Ok(Language::parse(self.require(KEY_LANGUAGE)?))
    }

    /// Gets the single value of a required property, failing fast if it
    /// is missing, duplicated or blank.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidCommand`] naming the violation.
    pub fn require(&self, key: &str) -> Result<&str, GatewayError> {
        match self.data.properties.get(key).map(Vec::as_slice) {
            None | Some([]) => Err(GatewayError::InvalidCommand(format!(
                "required parameter '{key}' is missing"
            ))),
            Some([value]) if value.trim().is_empty() => Err(GatewayError::InvalidCommand(
                format!("illegal parameter '{key}': empty value"),
            )),
            Some([value]) => Ok(value),
            Some(_) => Err(GatewayError::InvalidCommand(format!(
                "duplicated parameter '{key}' found"
            ))),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.invalid {
            Some(cause) => write!(f, "command(invalid: {cause})"),
            None => {
                let keys: Vec<&str> = self.data.properties.keys().map(String::as_str).collect();
                write!(
                    f,
                    "command(owner={}, properties={keys:?})",
                    self.data.owner
                )
            }
        }
    }
}

/// Accumulates the parts of a [`Command`].
///
/// Building never fails: the first violation recorded while accumulating
/// (e.g. a malformed request body noticed by the transport) is captured,
/// and [`build`](Self::build) yields an invalid command wrapping it.
#[derive(Debug, Default)]
pub struct CommandBuilder {
    properties: Properties,
    acceptable: Vec<MediaType>,
    owner: Principal,
    invalid: Option<GatewayError>,
}

impl CommandBuilder {
    /// Adds one value under `key`, preserving earlier occurrences.
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Merges many values under `key`, after any earlier occurrences.
    #[must_use]
    pub fn properties(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = String>,
    ) -> Self {
        self.properties
            .entry(key.into())
            .or_default()
            .extend(values);
        self
    }

    /// Sets the payload language (stored as the `language` property).
    #[must_use]
    pub fn language(self, language: Language) -> Self {
        self.property(KEY_LANGUAGE, language.name())
    }

    /// Sets the target dataset (stored as the `schema` property).
    #[must_use]
    pub fn schema(self, schema: &SchemaId) -> Self {
        self.property(KEY_SCHEMA, schema.as_str())
    }

    /// Sets the target dataset from a raw name.
    #[must_use]
    pub fn schema_name(self, schema: impl Into<String>) -> Self {
        self.property(KEY_SCHEMA, schema.into())
    }

    /// Appends one accepted result media type (in preference order).
    #[must_use]
    pub fn accept(mut self, media: MediaType) -> Self {
        self.acceptable.push(media);
        self
    }

    /// Appends accepted result media types, most preferred first.
    #[must_use]
    pub fn acceptable(mut self, types: impl IntoIterator<Item = MediaType>) -> Self {
        self.acceptable.extend(types);
        self
    }

    /// Sets the identity owning the command.
    #[must_use]
    pub fn owner(mut self, owner: Principal) -> Self {
        self.owner = owner;
        self
    }

    /// Records a construction error; only the first one is kept.
    #[must_use]
    pub fn invalidate(mut self, cause: GatewayError) -> Self {
        self.invalid.get_or_insert(cause);
        self
    }

    /// Finishes building; yields an invalid command if any step recorded
    /// an error.
    #[must_use]
    pub fn build(self) -> Command {
        Command {
            data: Arc::new(CommandData {
                properties: self.properties,
                acceptable: self.acceptable,
                owner: self.owner,
            }),
            invalid: self.invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Command {
        Command::builder()
            .language(Language::Sql)
            .schema_name("default")
            .property("query", "SELECT 1")
            .owner(Principal::named("alice"))
            .build()
    }

    #[test]
    fn valid_command_exposes_fields() {
        let command = valid();
        assert!(command.ensure_valid().is_ok());
        assert_eq!(command.schema().unwrap().as_str(), "default");
        assert_eq!(command.language().unwrap(), Language::Sql);
        assert_eq!(command.owner(), &Principal::named("alice"));
    }

    #[test]
    fn invalid_command_surfaces_its_cause() {
        let cause = GatewayError::InvalidCommand("bad body".into());
        let command = Command::invalid(cause.clone());
        assert_eq!(command.ensure_valid().unwrap_err(), cause);
        assert!(command.properties().is_empty());
    }

    #[test]
    fn builder_captures_first_error_only() {
        let command = Command::builder()
            .invalidate(GatewayError::InvalidCommand("first".into()))
            .invalidate(GatewayError::InvalidCommand("second".into()))
            .build();
        assert_eq!(
            command.ensure_valid().unwrap_err(),
            GatewayError::InvalidCommand("first".into())
        );
    }

    #[test]
    fn require_missing_parameter() {
        let err = valid().require("update").unwrap_err();
        assert_eq!(
            err,
            GatewayError::InvalidCommand("required parameter 'update' is missing".into())
        );
    }

    #[test]
    fn require_duplicated_parameter() {
        let command = Command::builder()
            .property("query", "SELECT 1")
            .property("query", "SELECT 2")
            .build();
        assert!(matches!(
            command.require("query"),
            Err(GatewayError::InvalidCommand(reason)) if reason.contains("duplicated")
        ));
    }

    #[test]
    fn require_blank_parameter() {
        let command = Command::builder().property("query", "   ").build();
        assert!(matches!(
            command.require("query"),
            Err(GatewayError::InvalidCommand(reason)) if reason.contains("empty value")
        ));
    }

    #[test]
    fn properties_preserve_order_and_occurrences() {
        let command = Command::builder()
            .property("b", "1")
            .property("a", "2")
            .properties("b", ["3".to_string(), "4".to_string()])
            .build();

        let keys: Vec<&String> = command.properties().keys().collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(command.properties()["b"], ["1", "3", "4"]);
    }

    #[test]
    fn acceptable_keeps_preference_order() {
        let json = MediaType::new("application", "json");
        let xml = MediaType::new("application", "xml");
        let command = Command::builder()
            .accept(json.clone())
            .accept(xml.clone())
            .build();
        assert_eq!(command.acceptable(), [json, xml]);
    }

    #[test]
    fn unknown_language_routes_as_unknown() {
        let command = Command::builder()
            .property(KEY_LANGUAGE, "graphql")
            .schema_name("default")
            .build();
        assert_eq!(command.language().unwrap(), Language::Unknown);
    }

    #[test]
    fn malformed_schema_is_a_usage_error() {
        let command = Command::builder()
            .language(Language::Sql)
            .schema_name("no/slashes")
            .build();
        assert!(matches!(
            command.schema(),
            Err(GatewayError::InvalidCommand(_))
        ));
    }
}
