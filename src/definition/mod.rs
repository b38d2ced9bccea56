//! Command definition tree.
//!
//! Definitions are authored as a recursive [`CommandDefinition`] document
//! (in code, TOML or JSON). [`CommandTree::new`] prepares the document once:
//! it validates every node, flattens pass-on traits into each descendant and
//! appends the options every invocation understands. The resulting tree is
//! immutable and can be shared across sequential invocations.

mod preparer;
mod tree;
mod types;

pub use preparer::prepare;
pub use tree::{CommandNode, CommandTree, Resolution};
pub(crate) use tree::suggest_similar;
pub use types::{
    AllowableValues, ArgType, CommandDefinition, CommandExample, NodeType, OptionDefinition,
    PassOn, PassOnIgnore, PositionalDefinition, ProfileSpec,
};

/// Name of the help option added to every node.
pub const HELP_OPTION: &str = "help";

/// Alias of the help option.
pub const HELP_OPTION_ALIAS: &str = "h";

/// Name of the examples-help option added to groups.
pub const HELP_EXAMPLES_OPTION: &str = "help-examples";

/// Name of the option selecting the JSON response document.
pub const RESPONSE_FORMAT_JSON_OPTION: &str = "response-format-json";

/// Alias of the JSON response option.
pub const RESPONSE_FORMAT_JSON_ALIAS: &str = "rfj";

/// Name of the option overriding the shape of a handler's formatted output.
pub const RESPONSE_FORMAT_TYPE_OPTION: &str = "response-format-type";

/// Alias of the output shape option.
pub const RESPONSE_FORMAT_TYPE_ALIAS: &str = "rft";

/// Name of the option limiting formatted output to some fields.
pub const RESPONSE_FORMAT_FILTER_OPTION: &str = "response-format-filter";

/// Alias of the output filter option.
pub const RESPONSE_FORMAT_FILTER_ALIAS: &str = "rff";

/// Name of the option toggling table headers.
pub const RESPONSE_FORMAT_HEADER_OPTION: &str = "response-format-header";

/// Alias of the table header option.
pub const RESPONSE_FORMAT_HEADER_ALIAS: &str = "rfh";

/// Name of the option that prints resolved inputs instead of running.
pub const SHOW_INPUTS_ONLY_OPTION: &str = "show-inputs-only";

/// Help group of the options added to every node.
pub const GLOBAL_OPTIONS_GROUP: &str = "Global Options";

/// Help group of the output format options.
pub const RESPONSE_FORMAT_OPTIONS_GROUP: &str = "Response Format Options";

/// Help group of the generated `--<type>-profile` options.
pub const PROFILE_OPTIONS_GROUP: &str = "Profile Options";

/// Help group of required options without an explicit group.
pub const REQUIRED_OPTIONS_GROUP: &str = "Required Options";

/// Help group of optional options without an explicit group.
pub const OPTIONS_GROUP: &str = "Options";

/// Name of the option selecting a profile of `profile_type`.
pub fn profile_option_name(profile_type: &str) -> String {
    format!("{profile_type}-profile")
}

/// Alias of the option selecting a profile of `profile_type`.
pub fn profile_option_alias(profile_type: &str) -> String {
    format!("{profile_type}-p")
}
