use std::{fmt, fs, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ImperativeError, Result};

/// Kind of node in the command definition tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A node that only groups other nodes. Never bound to a handler.
    Group,

    /// A leaf node bound to exactly one handler.
    Command,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Group => write!(f, "group"),
            NodeType::Command => write!(f, "command"),
        }
    }
}

/// Value type of an option or positional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ArgType {
    /// Free-form string.
    String,

    /// `true`/`false` flag.
    Boolean,

    /// Integer or floating point number.
    Number,

    /// List of strings. Repeated flags accumulate.
    Array,

    /// String holding a JSON document.
    Json,

    /// Path to a file that must exist when the command runs.
    ExistingLocalFile,
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::String => write!(f, "string"),
            ArgType::Boolean => write!(f, "boolean"),
            ArgType::Number => write!(f, "number"),
            ArgType::Array => write!(f, "array"),
            ArgType::Json => write!(f, "json"),
            ArgType::ExistingLocalFile => write!(f, "existingLocalFile"),
        }
    }
}

/// Set of values (or regular expressions) an option accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllowableValues {
    /// Literal values or regular expressions. Each entry is anchored at both
    /// ends before matching.
    pub values: Vec<String>,

    /// Whether matching honours case.
    #[serde(default)]
    pub case_sensitive: bool,
}

/// Definition of one `--option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionDefinition {
    /// Long name, kebab-case by convention (`--my-option`).
    pub name: String,

    /// Alternative names. Single characters are used with one dash.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Help text.
    pub description: String,

    /// Value type.
    #[serde(rename = "type")]
    pub option_type: ArgType,

    /// The option must be present once every layer has been applied.
    #[serde(default)]
    pub required: bool,

    /// Value used when no other layer supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Restricts the accepted values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowable_values: Option<AllowableValues>,

    /// Options that may not be combined with this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,

    /// Options that must all be present when this one is absent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub absence_implications: Vec<String>,

    /// Options that must all be present when this one is present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implies: Vec<String>,

    /// Inclusive numeric bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value_range: Option<[f64; 2]>,

    /// Inclusive string length bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_length_range: Option<[usize; 2]>,

    /// A missing value may be requested interactively.
    #[serde(default)]
    pub promptable: bool,

    /// The value is sensitive: never echoed, never logged.
    #[serde(default)]
    pub secure: bool,

    /// Help group heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl OptionDefinition {
    /// Creates an optional option with no constraints.
    pub fn new(name: impl Into<String>, option_type: ArgType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: description.into(),
            option_type,
            required: false,
            default_value: None,
            allowable_values: None,
            conflicts_with: Vec::new(),
            absence_implications: Vec::new(),
            implies: Vec::new(),
            numeric_value_range: None,
            string_length_range: None,
            promptable: false,
            secure: false,
            group: None,
        }
    }

    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Restricts accepted values.
    pub fn allowable_values<I, S>(mut self, values: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowable_values = Some(AllowableValues {
            values: values.into_iter().map(Into::into).collect(),
            case_sensitive,
        });
        self
    }

    /// Declares a conflicting option.
    pub fn conflicts_with(mut self, option: impl Into<String>) -> Self {
        self.conflicts_with.push(option.into());
        self
    }

    /// Declares an option required whenever this one is absent.
    pub fn absence_implies(mut self, option: impl Into<String>) -> Self {
        self.absence_implications.push(option.into());
        self
    }

    /// Declares an option required whenever this one is present.
    pub fn implies(mut self, option: impl Into<String>) -> Self {
        self.implies.push(option.into());
        self
    }

    /// Sets inclusive numeric bounds.
    pub fn numeric_range(mut self, min: f64, max: f64) -> Self {
        self.numeric_value_range = Some([min, max]);
        self
    }

    /// Sets inclusive string length bounds.
    pub fn length_range(mut self, min: usize, max: usize) -> Self {
        self.string_length_range = Some([min, max]);
        self
    }

    /// Allows interactive prompting when the value is missing.
    pub fn promptable(mut self) -> Self {
        self.promptable = true;
        self
    }

    /// Marks the value as sensitive.
    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Sets the help group heading.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Returns true if `token` names this option (name or alias, either case format).
    pub fn answers_to(&self, token: &str) -> bool {
        let wanted = crate::arguments::case::kebab_case(token);
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .any(|candidate| candidate == token || crate::arguments::case::kebab_case(candidate) == wanted)
    }
}

/// Definition of one positional operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionalDefinition {
    /// Name the value is exposed under.
    pub name: String,

    /// Help text.
    pub description: String,

    /// Value type. An `array` positional absorbs every remaining token and
    /// must be declared last.
    #[serde(rename = "type")]
    pub positional_type: ArgType,

    /// The positional must be supplied.
    #[serde(default)]
    pub required: bool,

    /// Regular expression the value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// Inclusive string length bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_length_range: Option<[usize; 2]>,
}

impl PositionalDefinition {
    /// Creates an optional positional.
    pub fn new(
        name: impl Into<String>,
        positional_type: ArgType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            positional_type,
            required: false,
            regex: None,
            string_length_range: None,
        }
    }

    /// Marks the positional as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts the value to a regular expression.
    pub fn regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = Some(regex.into());
        self
    }
}

/// Profile types a command loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSpec {
    /// Types that must resolve to a profile.
    #[serde(default)]
    pub required: Vec<String>,

    /// Types that contribute values only when a profile exists.
    #[serde(default)]
    pub optional: Vec<String>,

    /// Types for which no `--<type>-profile` option is generated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppress_options: Vec<String>,
}

impl ProfileSpec {
    /// Spec with the given required types.
    pub fn required<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: types.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Spec with the given optional types.
    pub fn optional<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            optional: types.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// All referenced types, required first.
    pub fn types(&self) -> impl Iterator<Item = &String> {
        self.required.iter().chain(self.optional.iter())
    }

    /// Whether `profile_type` is listed as required.
    pub fn is_required(&self, profile_type: &str) -> bool {
        self.required.iter().any(|t| t == profile_type)
    }

    pub(crate) fn absorb(&mut self, other: &ProfileSpec) {
        for t in &other.required {
            if !self.required.contains(t) {
                self.required.push(t.clone());
            }
        }
        for t in &other.optional {
            if !self.optional.contains(t) && !self.required.contains(t) {
                self.optional.push(t.clone());
            }
        }
        for t in &other.suppress_options {
            if !self.suppress_options.contains(t) {
                self.suppress_options.push(t.clone());
            }
        }
    }
}

/// Rule excluding a descendant from a pass-on declaration.
///
/// With both fields set, both must match. With one set, that one must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PassOnIgnore {
    /// Node name to skip.
    #[serde(default)]
    pub name: Option<String>,

    /// Node type to skip.
    #[serde(default, rename = "type")]
    pub node_type: Option<NodeType>,
}

impl PassOnIgnore {
    /// Matches every node of `node_type`.
    pub fn node_type(node_type: NodeType) -> Self {
        Self {
            name: None,
            node_type: Some(node_type),
        }
    }

    pub(crate) fn matches(&self, name: &str, node_type: NodeType) -> bool {
        match (&self.name, self.node_type) {
            (Some(n), Some(t)) => n == name && t == node_type,
            (Some(n), None) => n == name,
            (None, Some(t)) => t == node_type,
            (None, None) => false,
        }
    }
}

/// Traits a group hands down to all of its descendants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PassOn {
    /// Options appended to every descendant not ignored.
    #[serde(default)]
    pub options: Vec<OptionDefinition>,

    /// Profile types merged into every descendant not ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSpec>,

    /// Descendants that do not inherit.
    #[serde(default)]
    pub ignore_nodes: Vec<PassOnIgnore>,
}

/// Usage example shown in help.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandExample {
    /// What the example does.
    pub description: String,

    /// Arguments following the command path.
    pub options: String,
}

/// One node of the command definition tree, as authored.
///
/// Definition documents may be written in TOML or JSON using camelCase keys,
/// or built in code with the builder methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandDefinition {
    /// Token that selects this node. Blank only for the root.
    #[serde(default)]
    pub name: String,

    /// Alternative tokens.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Group or command.
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Help text.
    #[serde(default)]
    pub description: String,

    /// One-line summary for listings. Falls back to the description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Options declared directly on this node.
    #[serde(default)]
    pub options: Vec<OptionDefinition>,

    /// Positional operands, in order.
    #[serde(default)]
    pub positionals: Vec<PositionalDefinition>,

    /// Profile types this node loads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSpec>,

    /// Child nodes (groups only).
    #[serde(default)]
    pub children: Vec<CommandDefinition>,

    /// Identifier of the handler in the handler registry (commands only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    /// Traits handed down to descendants.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pass_on: Vec<PassOn>,

    /// Usage examples.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<CommandExample>,

    /// At least one of these options must be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_specify_one: Vec<String>,

    /// At most one of these options may be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only_one_of: Vec<String>,

    /// Adds `--response-format-type`, `--response-format-filter` and
    /// `--response-format-header`, letting the user reshape output the
    /// handler formats with [`CommandResponse::log_output`](crate::response::CommandResponse::log_output).
    #[serde(default)]
    pub output_format_options: bool,

    /// Syntax errors are returned to the caller of the processor instead of
    /// being rendered. Intended for tests.
    #[serde(default)]
    pub syntax_throw: bool,
}

impl CommandDefinition {
    fn node(name: impl Into<String>, node_type: NodeType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            node_type,
            description: description.into(),
            summary: None,
            options: Vec::new(),
            positionals: Vec::new(),
            profile: None,
            children: Vec::new(),
            handler: None,
            pass_on: Vec::new(),
            examples: Vec::new(),
            must_specify_one: Vec::new(),
            only_one_of: Vec::new(),
            output_format_options: false,
            syntax_throw: false,
        }
    }

    /// Unnamed root group.
    pub fn root(description: impl Into<String>) -> Self {
        Self::node("", NodeType::Group, description)
    }

    /// Named group.
    pub fn group(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::node(name, NodeType::Group, description)
    }

    /// Command without a handler; bind one with [`CommandDefinition::handler`].
    pub fn command(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::node(name, NodeType::Command, description)
    }

    /// Binds the handler identifier.
    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Sets the listing summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Adds a child node.
    pub fn child(mut self, child: CommandDefinition) -> Self {
        self.children.push(child);
        self
    }

    /// Adds an option.
    pub fn option(mut self, option: OptionDefinition) -> Self {
        self.options.push(option);
        self
    }

    /// Adds a positional.
    pub fn positional(mut self, positional: PositionalDefinition) -> Self {
        self.positionals.push(positional);
        self
    }

    /// Sets the profile requirements.
    pub fn profile(mut self, profile: ProfileSpec) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Adds a pass-on declaration.
    pub fn pass_on(mut self, pass_on: PassOn) -> Self {
        self.pass_on.push(pass_on);
        self
    }

    /// Adds a usage example.
    pub fn example(mut self, description: impl Into<String>, options: impl Into<String>) -> Self {
        self.examples.push(CommandExample {
            description: description.into(),
            options: options.into(),
        });
        self
    }

    /// Requires at least one of `options`.
    pub fn must_specify_one<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.must_specify_one = options.into_iter().map(Into::into).collect();
        self
    }

    /// Allows at most one of `options`.
    pub fn only_one_of<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only_one_of = options.into_iter().map(Into::into).collect();
        self
    }

    /// Lets the user override the shape of formatted output.
    pub fn output_format_options(mut self) -> Self {
        self.output_format_options = true;
        self
    }

    /// Returns syntax errors to the caller instead of rendering them.
    pub fn syntax_throw(mut self) -> Self {
        self.syntax_throw = true;
        self
    }

    /// Parses a TOML definition document.
    ///
    /// # Errors
    /// Returns `ImperativeError::TomlParseError` if the document is not a
    /// valid definition.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ImperativeError::toml_parse(e, None))
    }

    /// Parses a JSON definition document.
    ///
    /// # Errors
    /// Returns `ImperativeError::JsonParseError` if the document is not a
    /// valid definition.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ImperativeError::json_parse(e, None))
    }

    /// Loads a definition document, choosing the format by file extension
    /// (`.json` is JSON, anything else TOML).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ImperativeError::IoError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ImperativeError::json_parse(e, Some(path))),
            _ => toml::from_str(&content).map_err(|e| ImperativeError::toml_parse(e, Some(path))),
        }
    }
}
