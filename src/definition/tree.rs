use std::sync::Arc;

use strsim::levenshtein;
use tracing::debug;

use super::{
    preparer::prepare,
    types::{ArgType, CommandDefinition, NodeType, OptionDefinition, PositionalDefinition, ProfileSpec},
};
use crate::{Result, cli::CommandError};

/// Largest edit distance at which a name is offered as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// A prepared node: validated, with its merged option list.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode {
    definition: CommandDefinition,
    path: Vec<String>,
    children: Vec<CommandNode>,
}

impl CommandNode {
    pub(super) fn new(
        definition: CommandDefinition,
        path: Vec<String>,
        children: Vec<CommandNode>,
    ) -> Self {
        Self {
            definition,
            path,
            children,
        }
    }

    /// Node name. Blank for the root.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Prepared definition. Its `children` list is empty; use
    /// [`CommandNode::children`].
    pub fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    /// Tokens leading from the root to this node.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Space-joined path, blank for the root.
    pub fn full_name(&self) -> String {
        self.path.join(" ")
    }

    /// Group or command.
    pub fn node_type(&self) -> NodeType {
        self.definition.node_type
    }

    /// Whether this node is a group.
    pub fn is_group(&self) -> bool {
        self.definition.node_type == NodeType::Group
    }

    /// Help text.
    pub fn description(&self) -> &str {
        &self.definition.description
    }

    /// Listing summary, falling back to the description.
    pub fn summary(&self) -> &str {
        self.definition
            .summary
            .as_deref()
            .unwrap_or(&self.definition.description)
    }

    /// Child nodes in declaration order.
    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    /// Merged option list: own options, inherited options, then the options
    /// every node understands.
    pub fn options(&self) -> &[OptionDefinition] {
        &self.definition.options
    }

    /// Positional definitions in order.
    pub fn positionals(&self) -> &[PositionalDefinition] {
        &self.definition.positionals
    }

    /// Merged profile requirements.
    pub fn profile(&self) -> Option<&ProfileSpec> {
        self.definition.profile.as_ref()
    }

    /// Handler identifier, if bound.
    pub fn handler(&self) -> Option<&str> {
        self.definition.handler.as_deref()
    }

    /// Whether `token` is this node's name or one of its aliases.
    pub fn matches(&self, token: &str) -> bool {
        self.definition.name == token || self.definition.aliases.iter().any(|a| a == token)
    }

    /// Child answering to `token`.
    pub fn find_child(&self, token: &str) -> Option<&CommandNode> {
        self.children.iter().find(|child| child.matches(token))
    }

    /// Option answering to `token` (name or alias, camelCase or kebab-case).
    pub fn find_option(&self, token: &str) -> Option<&OptionDefinition> {
        self.definition
            .options
            .iter()
            .find(|option| option.name == token || option.aliases.iter().any(|a| a == token))
            .or_else(|| self.definition.options.iter().find(|option| option.answers_to(token)))
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a CommandNode>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

/// Outcome of [`CommandTree::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    /// Deepest node matched by the leading tokens.
    pub node: &'a CommandNode,

    /// Tokens not consumed by the walk: options and positionals.
    pub remaining: Vec<String>,
}

/// Immutable, prepared command tree.
///
/// Cloning is cheap; clones share the prepared nodes.
#[derive(Debug, Clone)]
pub struct CommandTree {
    root: Arc<CommandNode>,
}

impl CommandTree {
    /// Prepares `root` and builds the tree.
    ///
    /// # Errors
    /// Returns `ImperativeError::InvalidDefinition` if any node is invalid.
    pub fn new(root: CommandDefinition) -> Result<Self> {
        let root = prepare(root)?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    /// Root node.
    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Node at `path`, matching names or aliases.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&CommandNode> {
        path.iter()
            .try_fold(self.root.as_ref(), |node, token| node.find_child(token.as_ref()))
    }

    /// Every node, depth first, root included.
    pub fn nodes(&self) -> Vec<&CommandNode> {
        let mut out = Vec::new();
        self.root.walk(&mut out);
        out
    }

    /// Walks `tokens` from the root, matching child names or aliases.
    ///
    /// The walk stops at the first command, at the first token that is not
    /// an option of the current group, or when tokens run out. Boolean flags
    /// given to a group before its subcommand (`--rfj eat`) are carried over
    /// into the remaining tokens.
    ///
    /// # Errors
    /// Returns `CommandError::UnknownCommand` when a token at group level
    /// matches no child.
    pub fn resolve(&self, tokens: &[String]) -> std::result::Result<Resolution<'_>, CommandError> {
        let mut node = self.root.as_ref();
        let mut deferred = Vec::new();
        let mut index = 0;

        while index < tokens.len() && node.is_group() {
            let token = &tokens[index];

            if token == "--" {
                break;
            }

            if let Some(flag) = token.strip_prefix('-') {
                let name = flag.trim_start_matches('-');
                let name = name.split_once('=').map_or(name, |(n, _)| n);
                match node.find_option(name) {
                    Some(option) if option.option_type == ArgType::Boolean => {
                        deferred.push(token.clone());
                        index += 1;
                        continue;
                    }
                    _ => break,
                }
            }

            match node.find_child(token) {
                Some(child) => {
                    node = child;
                    index += 1;
                }
                None => {
                    let mut attempted = node.path.clone();
                    attempted.push(token.clone());

                    let candidates = node.children.iter().flat_map(|child| {
                        std::iter::once(child.name()).chain(child.definition.aliases.iter().map(String::as_str))
                    });

                    return Err(CommandError::UnknownCommand {
                        tokens: attempted,
                        suggestions: suggest_similar(token, candidates),
                    });
                }
            }
        }

        debug!(command = %node.full_name(), "resolved command");

        deferred.extend(tokens[index..].iter().cloned());
        Ok(Resolution {
            node,
            remaining: deferred,
        })
    }
}

/// Names among `candidates` close to `input`, closest first.
///
/// A candidate qualifies when its edit distance to `input` is at most two
/// or when it starts with `input`.
pub(crate) fn suggest_similar<'a>(
    input: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let input_lower = input.to_lowercase();

    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance = levenshtein(&input_lower, &candidate.to_lowercase());
            let close = distance <= MAX_SUGGESTION_DISTANCE
                || (!input_lower.is_empty() && candidate.starts_with(&input_lower));
            close.then_some((distance, candidate))
        })
        .collect();

    scored.sort();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored.into_iter().map(|(_, name)| name.to_string()).collect()
}
