//! Unit tests for arguments module
//!
//! Tests argv parsing, name conversion, environment conversion, argument
//! layering and censoring. Environments and prompts are faked in memory.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::{
    collections::HashMap,
    io,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    arguments::{
        ArgumentMapper, ArgumentSource, ParsedArguments, Prompter,
        case::{camel_case, kebab_case},
        censor::{censor_raw_args, censored},
        env_value, parse, scan_flag,
    },
    cli::CommandError,
    config::ImperativeConfig,
    definition::{
        ArgType, CommandDefinition, CommandNode, CommandTree, OptionDefinition,
        PositionalDefinition, ProfileSpec,
    },
    profiles::ProfileArgument,
};

fn tokens(input: &str) -> Vec<String> {
    input.split_whitespace().map(String::from).collect()
}

fn tree() -> CommandTree {
    CommandTree::new(
        CommandDefinition::root("Sample").child(
            CommandDefinition::command("eat", "Eat fruit")
                .handler("eat")
                .profile(ProfileSpec::optional(["fruit"]))
                .option(
                    OptionDefinition::new("flavor", ArgType::String, "Flavor")
                        .alias("f")
                        .default_value("mild"),
                )
                .option(OptionDefinition::new("count", ArgType::Number, "How many"))
                .option(OptionDefinition::new("ripe", ArgType::Boolean, "Only ripe"))
                .option(OptionDefinition::new("toppings", ArgType::Array, "Toppings"))
                .option(
                    OptionDefinition::new("sauces", ArgType::Array, "Sauces")
                        .default_value(json!(["none"])),
                )
                .option(OptionDefinition::new("password", ArgType::String, "Secret"))
                .option(
                    OptionDefinition::new("pin", ArgType::String, "Pin")
                        .secure()
                        .promptable(),
                )
                .positional(PositionalDefinition::new("fruit", ArgType::String, "Fruit"))
                .positional(PositionalDefinition::new("extras", ArgType::Array, "Extras")),
        ),
    )
    .unwrap()
}

fn node(tree: &CommandTree) -> &CommandNode {
    tree.find(&["eat"]).unwrap()
}

fn config(interactive: bool) -> ImperativeConfig {
    ImperativeConfig::builder("sample")
        .cli_home("/tmp/sample-home")
        .interactive(interactive)
        .build(&HashMap::<String, String>::new())
        .unwrap()
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn profile_arg(option: &str, value: Value) -> ProfileArgument {
    ProfileArgument {
        option: option.to_string(),
        value,
        secure: false,
        profile: "mine".to_string(),
    }
}

#[test]
fn case_conversions() {
    assert_eq!(kebab_case("fruitSize"), "fruit-size");
    assert_eq!(kebab_case("fruit-size"), "fruit-size");
    assert_eq!(kebab_case("fruit_size"), "fruit-size");
    assert_eq!(kebab_case("h"), "h");
    assert_eq!(camel_case("fruit-size"), "fruitSize");
    assert_eq!(camel_case("fruitSize"), "fruitSize");
    assert_eq!(camel_case("response-format-json"), "responseFormatJson");
}

#[test]
fn env_values_are_typed() {
    assert_eq!(env_value("TRUE", ArgType::Boolean), json!(true));
    assert_eq!(env_value("false", ArgType::Boolean), json!(false));
    assert_eq!(env_value("12", ArgType::Number), json!(12));
    assert_eq!(env_value("1.5", ArgType::Number), json!(1.5));
    assert_eq!(env_value("twelve", ArgType::Number), json!("twelve"));
    assert_eq!(
        env_value(r#"a "b c" 'd e'  f"#, ArgType::Array),
        json!(["a", "b c", "d e", "f"])
    );
    assert_eq!(env_value("plain text", ArgType::String), json!("plain text"));
}

#[test]
fn parse_long_short_and_inline_forms() {
    let tree = tree();
    let parsed = parse(
        node(&tree),
        &tokens("banana --count 3 -f=sweet --ripe --toppings nuts honey --toppings cream"),
    )
    .unwrap();

    assert_eq!(parsed.get("count"), Some(&json!("3")));
    assert_eq!(parsed.get("flavor"), Some(&json!("sweet")));
    assert_eq!(parsed.get("ripe"), Some(&json!(true)));
    assert_eq!(parsed.get("toppings"), Some(&json!(["nuts", "honey", "cream"])));
    assert_eq!(parsed.occurrences["toppings"], 2);
    assert_eq!(parsed.positionals, tokens("banana"));
}

#[test]
fn parse_boolean_with_explicit_value() {
    let tree = tree();
    let parsed = parse(node(&tree), &tokens("--ripe false banana")).unwrap();

    assert_eq!(parsed.get("ripe"), Some(&json!(false)));
    assert_eq!(parsed.positionals, tokens("banana"));
}

#[test]
fn parse_camel_case_option_and_negative_number() {
    let tree = tree();
    let parsed = parse(node(&tree), &tokens("--responseFormatJson --count -2")).unwrap();

    assert!(parsed.flag("response-format-json"));
    assert_eq!(parsed.get("count"), Some(&json!("-2")));
}

#[test]
fn parse_terminator_makes_rest_positional() {
    let tree = tree();
    let parsed = parse(node(&tree), &tokens("banana -- --count 3")).unwrap();

    assert!(!parsed.contains("count"));
    assert_eq!(parsed.positionals, tokens("banana --count 3"));
}

#[test]
fn parse_unknown_option_suggests() {
    let tree = tree();

    let Err(CommandError::UnknownOption { option, suggestions }) =
        parse(node(&tree), &tokens("--flavour sweet"))
    else {
        panic!("expected unknown option");
    };

    assert_eq!(option, "--flavour");
    assert_eq!(suggestions, vec!["--flavor".to_string()]);
}

#[test]
fn parse_missing_value_fails() {
    let tree = tree();

    assert!(matches!(
        parse(node(&tree), &tokens("--count")),
        Err(CommandError::MissingOptionValue { option }) if option == "count"
    ));
}

#[tokio::test]
async fn default_applies_when_nothing_else_supplies_value() {
    let tree = tree();
    let config = config(false);
    let env = env(&[]);
    let mapper = ArgumentMapper::new(&config, &env);

    let resolved = mapper
        .map(node(&tree), &ParsedArguments::default(), &[])
        .await
        .unwrap();

    assert_eq!(resolved.get_str("flavor"), Some("mild"));
    assert_eq!(resolved.source("flavor"), Some(ArgumentSource::Default));
    assert!(!resolved.is_explicit("flavor"));
}

#[tokio::test]
async fn precedence_cli_over_env_over_profile_over_default() {
    let tree = tree();
    let config = config(false);
    let profile = [profile_arg("flavor", json!("sweet"))];

    let env_with = env(&[("SAMPLE_OPT_FLAVOR", "bold")]);
    let mapper = ArgumentMapper::new(&config, &env_with);

    let with_cli = parse(node(&tree), &tokens("--flavor tart")).unwrap();
    let resolved = mapper.map(node(&tree), &with_cli, &profile).await.unwrap();
    assert_eq!(resolved.get_str("flavor"), Some("tart"));
    assert_eq!(resolved.source("flavor"), Some(ArgumentSource::CommandLine));

    let resolved = mapper
        .map(node(&tree), &ParsedArguments::default(), &profile)
        .await
        .unwrap();
    assert_eq!(resolved.get_str("flavor"), Some("bold"));
    assert_eq!(resolved.source("flavor"), Some(ArgumentSource::Environment));

    let env_without = env(&[]);
    let mapper = ArgumentMapper::new(&config, &env_without);
    let resolved = mapper
        .map(node(&tree), &ParsedArguments::default(), &profile)
        .await
        .unwrap();
    assert_eq!(resolved.get_str("flavor"), Some("sweet"));
    assert_eq!(resolved.source("flavor"), Some(ArgumentSource::Profile));
}

#[tokio::test]
async fn arrays_concatenate_across_profile_and_env_but_cli_replaces() {
    let tree = tree();
    let config = config(false);
    let env = env(&[
        ("SAMPLE_OPT_TOPPINGS", "cream"),
        ("SAMPLE_OPT_SAUCES", "chocolate"),
    ]);
    let mapper = ArgumentMapper::new(&config, &env);
    let profile = [profile_arg("toppings", json!(["nuts"]))];

    let resolved = mapper
        .map(node(&tree), &ParsedArguments::default(), &profile)
        .await
        .unwrap();
    assert_eq!(resolved.get_list("toppings").unwrap(), vec!["nuts", "cream"]);
    assert_eq!(resolved.get_list("sauces").unwrap(), vec!["chocolate"]);

    let cli = parse(node(&tree), &tokens("--toppings sprinkles")).unwrap();
    let resolved = mapper.map(node(&tree), &cli, &profile).await.unwrap();
    assert_eq!(resolved.get_list("toppings").unwrap(), vec!["sprinkles"]);
}

#[tokio::test]
async fn values_are_coerced_to_declared_types() {
    let tree = tree();
    let config = config(false);
    let env = env(&[("SAMPLE_OPT_RIPE", "true")]);
    let mapper = ArgumentMapper::new(&config, &env);

    let cli = parse(node(&tree), &tokens("--count 3")).unwrap();
    let resolved = mapper.map(node(&tree), &cli, &[]).await.unwrap();

    assert_eq!(resolved.get("count"), Some(&json!(3)));
    assert!(resolved.flag("ripe"));
    assert_eq!(resolved.get("countItems"), None);
}

#[tokio::test]
async fn positionals_are_assigned_in_order_with_array_rest() {
    let tree = tree();
    let config = config(false);
    let env = env(&[]);
    let mapper = ArgumentMapper::new(&config, &env);

    let cli = parse(node(&tree), &tokens("banana nuts cream")).unwrap();
    let resolved = mapper.map(node(&tree), &cli, &[]).await.unwrap();

    assert_eq!(resolved.get_str("fruit"), Some("banana"));
    assert_eq!(resolved.get_list("extras").unwrap(), vec!["nuts", "cream"]);
}

#[tokio::test]
async fn too_many_positionals_fail() {
    let tree = CommandTree::new(
        CommandDefinition::root("Root").child(
            CommandDefinition::command("one", "One positional")
                .positional(PositionalDefinition::new("only", ArgType::String, "Only")),
        ),
    )
    .unwrap();
    let config = config(false);
    let env = env(&[]);
    let mapper = ArgumentMapper::new(&config, &env);
    let node = tree.find(&["one"]).unwrap();

    let cli = parse(node, &tokens("a b c")).unwrap();
    let result = mapper.map(node, &cli, &[]).await;

    assert!(matches!(
        result,
        Err(CommandError::TooManyPositionals { expected: 1, received: 3 })
    ));
}

#[tokio::test]
async fn secure_profile_values_are_marked() {
    let tree = tree();
    let config = config(false);
    let env = env(&[]);
    let mapper = ArgumentMapper::new(&config, &env);
    let mut secret = profile_arg("flavor", json!("secret sauce"));
    secret.secure = true;

    let resolved = mapper
        .map(node(&tree), &ParsedArguments::default(), &[secret])
        .await
        .unwrap();

    assert!(resolved.is_secure("flavor"));
    assert_eq!(censored(&resolved)["flavor"], json!("****"));
}

struct ScriptedPrompter {
    answer: String,
    asked: Arc<Mutex<Vec<(String, bool)>>>,
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn prompt(&self, message: &str, hide_input: bool) -> io::Result<String> {
        self.asked
            .lock()
            .unwrap()
            .push((message.to_string(), hide_input));
        Ok(self.answer.clone())
    }
}

#[tokio::test]
async fn prompt_phrase_triggers_prompt_when_interactive() {
    let tree = tree();
    let config = config(true);
    let env = env(&[]);
    let asked = Arc::new(Mutex::new(Vec::new()));
    let prompter = ScriptedPrompter {
        answer: "1234".to_string(),
        asked: asked.clone(),
    };
    let mapper = ArgumentMapper::new(&config, &env).with_prompter(&prompter);

    let cli = parse(node(&tree), &tokens("--pin PROMPT*")).unwrap();
    let resolved = mapper.map(node(&tree), &cli, &[]).await.unwrap();

    assert_eq!(resolved.get_str("pin"), Some("1234"));
    assert_eq!(resolved.source("pin"), Some(ArgumentSource::Prompt));
    assert!(resolved.is_secure("pin"));

    let asked = asked.lock().unwrap();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].1, "secure option must not echo");
}

#[tokio::test]
async fn prompt_phrase_without_terminal_fails() {
    let tree = tree();
    let config = config(false);
    let env = env(&[]);
    let mapper = ArgumentMapper::new(&config, &env);

    let cli = parse(node(&tree), &tokens("--flavor PROMPT*")).unwrap();
    let result = mapper.map(node(&tree), &cli, &[]).await;

    assert!(matches!(result, Err(CommandError::Prompt(_))));
}

#[test]
fn raw_args_are_censored() {
    let args = tokens("eat --password hunter2 --flavor sweet --token-value=abc");

    assert_eq!(
        censor_raw_args(&args, None),
        tokens("eat --password **** --flavor sweet --token-value=****")
    );
}

#[test]
fn raw_args_hide_options_declared_secure() {
    let tree = CommandTree::new(
        CommandDefinition::root("Sample").child(
            CommandDefinition::group("eat", "Eat fruit").child(
                CommandDefinition::command("banana", "Eat a banana")
                    .handler("eat")
                    .option(
                        OptionDefinition::new("secret-key", ArgType::String, "Stand key")
                            .alias("sk")
                            .secure(),
                    )
                    .option(OptionDefinition::new("flavor", ArgType::String, "Flavor")),
            ),
        ),
    )
    .unwrap();
    let banana = tree.find(&["eat", "banana"]).unwrap();

    let args = tokens("eat banana --secret-key xyz123 --flavor sweet");
    assert_eq!(
        censor_raw_args(&args, Some(banana)),
        tokens("eat banana --secret-key **** --flavor sweet")
    );

    let args = tokens("eat banana -sk=xyz123 --secretKey abc");
    assert_eq!(
        censor_raw_args(&args, Some(banana)),
        tokens("eat banana -sk=**** --secretKey ****")
    );
}

#[tokio::test]
async fn well_known_names_are_censored() {
    let tree = tree();
    let config = config(false);
    let env = env(&[]);
    let mapper = ArgumentMapper::new(&config, &env);

    let cli = parse(node(&tree), &tokens("--password hunter2")).unwrap();
    let resolved = mapper.map(node(&tree), &cli, &[]).await.unwrap();

    let shown = censored(&resolved);
    assert_eq!(shown["password"], json!("****"));
    assert_eq!(shown["flavor"], json!("mild"));
}

#[test]
fn flag_scan_matches_parser_forms() {
    let names = ["response-format-json", "rfj"];

    assert!(scan_flag(&tokens("eat --rfj"), &names));
    assert!(scan_flag(&tokens("eat --rfj=true"), &names));
    assert!(scan_flag(&tokens("eat --responseFormatJson"), &names));
    assert!(scan_flag(&tokens("eat --rfj TRUE banana"), &names));
    assert!(!scan_flag(&tokens("eat --rfj false"), &names));
    assert!(!scan_flag(&tokens("eat --rfj=false"), &names));
    assert!(!scan_flag(&tokens("eat --rfj --rfj=false"), &names));
    assert!(!scan_flag(&tokens("eat -- --rfj"), &names));
    assert!(!scan_flag(&tokens("eat"), &names));
}

#[tokio::test]
async fn environment_supplies_positionals() {
    let tree = tree();
    let config = config(false);
    let env = env(&[("SAMPLE_OPT_FRUIT", "kiwi"), ("SAMPLE_OPT_EXTRAS", "nuts 'maple syrup'")]);
    let mapper = ArgumentMapper::new(&config, &env);

    let resolved = mapper
        .map(node(&tree), &ParsedArguments::default(), &[])
        .await
        .unwrap();
    assert_eq!(resolved.get_str("fruit"), Some("kiwi"));
    assert_eq!(resolved.source("fruit"), Some(ArgumentSource::Environment));
    assert_eq!(resolved.get("extras"), Some(&json!(["nuts", "maple syrup"])));

    let cli = parse(node(&tree), &tokens("banana")).unwrap();
    let resolved = mapper.map(node(&tree), &cli, &[]).await.unwrap();
    assert_eq!(resolved.get_str("fruit"), Some("banana"));
    assert_eq!(resolved.source("fruit"), Some(ArgumentSource::CommandLine));
}

fn promptable_tree() -> CommandTree {
    CommandTree::new(
        CommandDefinition::root("Sample").child(
            CommandDefinition::command("login", "Log in")
                .handler("login")
                .option(
                    OptionDefinition::new("user", ArgType::String, "User name")
                        .required()
                        .promptable(),
                )
                .option(
                    OptionDefinition::new("secret", ArgType::String, "Secret")
                        .required()
                        .promptable()
                        .secure(),
                ),
        ),
    )
    .unwrap()
}

#[tokio::test]
async fn missing_required_promptable_values_are_prompted() {
    let tree = promptable_tree();
    let login = tree.find(&["login"]).unwrap();
    let config = config(true);
    let env = env(&[]);
    let asked = Arc::new(Mutex::new(Vec::new()));
    let prompter = ScriptedPrompter {
        answer: "carmen".to_string(),
        asked: asked.clone(),
    };
    let mapper = ArgumentMapper::new(&config, &env).with_prompter(&prompter);

    let resolved = mapper
        .map(login, &ParsedArguments::default(), &[])
        .await
        .unwrap();

    assert_eq!(resolved.get_str("user"), Some("carmen"));
    assert_eq!(resolved.source("user"), Some(ArgumentSource::Prompt));
    assert!(resolved.is_secure("secret"));

    let asked = asked.lock().unwrap();
    assert_eq!(
        *asked,
        vec![
            ("Please enter \"user\": ".to_string(), false),
            ("Please enter \"secret\": ".to_string(), true),
        ]
    );
}

#[tokio::test]
async fn missing_promptable_values_stay_missing_without_terminal() {
    let tree = promptable_tree();
    let login = tree.find(&["login"]).unwrap();
    let config = config(false);
    let env = env(&[]);
    let asked = Arc::new(Mutex::new(Vec::new()));
    let prompter = ScriptedPrompter {
        answer: "carmen".to_string(),
        asked: asked.clone(),
    };
    let mapper = ArgumentMapper::new(&config, &env).with_prompter(&prompter);

    let resolved = mapper
        .map(login, &ParsedArguments::default(), &[])
        .await
        .unwrap();

    assert!(!resolved.contains("user"));
    assert!(!resolved.contains("secret"));
    assert!(asked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn supplied_promptable_values_are_not_prompted() {
    let tree = promptable_tree();
    let login = tree.find(&["login"]).unwrap();
    let config = config(true);
    let env = env(&[("SAMPLE_OPT_SECRET", "s3cret")]);
    let asked = Arc::new(Mutex::new(Vec::new()));
    let prompter = ScriptedPrompter {
        answer: "carmen".to_string(),
        asked: asked.clone(),
    };
    let mapper = ArgumentMapper::new(&config, &env).with_prompter(&prompter);

    let cli = parse(login, &tokens("--user ana")).unwrap();
    let resolved = mapper.map(login, &cli, &[]).await.unwrap();

    assert_eq!(resolved.get_str("user"), Some("ana"));
    assert_eq!(resolved.get_str("secret"), Some("s3cret"));
    assert!(asked.lock().unwrap().is_empty());
}
