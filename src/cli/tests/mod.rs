//! Unit tests for CLI module
//!
//! Tests the handler registry, value formatting and the command processor
//! end to end over an in-memory tree. Output is captured instead of
//! written to the terminal.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::{
    collections::HashMap,
    io::{self, Write},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    cli::{
        CliService, CommandError, CommandHandler, CommandProcessor, ExpectedError, HandlerError,
        HandlerParameters, HandlerRegistry, formatting::format_value, requested_format,
    },
    config::ImperativeConfig,
    definition::{ArgType, CommandDefinition, CommandTree, OptionDefinition, ProfileSpec},
    profiles::{Profile, ProfileStore},
    response::{CommandResponse, ResponseFormat},
};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn process(&self, params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        let flavor = params.arguments.get_str("flavor").unwrap_or_default().to_string();
        params.response.log(format!("flavor: {flavor}"));
        params.response.set_obj(json!({ "flavor": flavor }), false);
        Ok(())
    }
}

#[derive(Default)]
struct RespondHandler;

#[async_trait]
impl CommandHandler for RespondHandler {
    async fn process(&self, params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        params.response.log("responding");
        params.response.set_message("done");
        params.response.set_obj(json!({ "x": 1 }), false);
        Ok(())
    }
}

#[derive(Default)]
struct FailingHandler;

#[async_trait]
impl CommandHandler for FailingHandler {
    async fn process(&self, _params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        Err(ExpectedError::new("No bananas left")
            .details("Try again tomorrow")
            .exit_code(7)
            .into())
    }
}

#[derive(Default)]
struct BrokenHandler;

#[async_trait]
impl CommandHandler for BrokenHandler {
    async fn process(&self, _params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        Err(HandlerError::unexpected(io::Error::other("disk on fire")))
    }
}

#[derive(Default)]
struct PanickingHandler;

#[async_trait]
impl CommandHandler for PanickingHandler {
    async fn process(&self, _params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        panic!("boom");
    }
}

fn banana() -> CommandDefinition {
    CommandDefinition::command("banana", "Eat a banana")
        .alias("ba")
        .handler("eat.banana")
        .profile(ProfileSpec::optional(["fruit"]))
        .option(OptionDefinition::new("color", ArgType::String, "Banana color").required())
        .option(OptionDefinition::new("flavor", ArgType::String, "Flavor").default_value("mild"))
        .option(OptionDefinition::new("password", ArgType::String, "Secret"))
}

fn tree() -> CommandTree {
    CommandTree::new(
        CommandDefinition::root("Sample CLI")
            .child(
                CommandDefinition::group("eat", "Eat some food")
                    .child(banana())
                    .child(CommandDefinition::command("fail", "Always fails").handler("eat.fail"))
                    .child(CommandDefinition::command("broken", "Breaks").handler("eat.broken"))
                    .child(CommandDefinition::command("panic", "Panics").handler("eat.panic"))
                    .child(
                        CommandDefinition::command("strict", "Raises syntax errors")
                            .handler("eat.banana")
                            .syntax_throw()
                            .option(
                                OptionDefinition::new("color", ArgType::String, "Color").required(),
                            ),
                    ),
            )
            .child(
                CommandDefinition::command("respond-with-data", "Responds with data")
                    .handler("respond"),
            )
            .child(
                CommandDefinition::group("invalid", "Broken commands")
                    .child(CommandDefinition::command("no-handler", "Has no handler"))
                    .child(
                        CommandDefinition::command("unregistered", "Unknown handler")
                            .handler("missing.id"),
                    ),
            ),
    )
    .unwrap()
}

fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register_default::<EchoHandler>("eat.banana");
    registry.register_default::<RespondHandler>("respond");
    registry.register_default::<FailingHandler>("eat.fail");
    registry.register_default::<BrokenHandler>("eat.broken");
    registry.register_default::<PanickingHandler>("eat.panic");
    registry
}

fn profiles() -> ProfileStore {
    let mut store = ProfileStore::new();
    store.insert(
        Profile::new("mine", "fruit")
            .property("flavor", "sweet")
            .property("password", "hunter2"),
    );
    store.set_default("fruit", "mine");
    store
}

struct Harness {
    config: ImperativeConfig,
    tree: CommandTree,
    registry: HandlerRegistry,
    profiles: ProfileStore,
    env: HashMap<String, String>,
}

struct Output {
    code: i32,
    stdout: String,
    stderr: String,
}

impl Harness {
    fn new() -> Self {
        Self::with(false, HashMap::new())
    }

    fn with(diagnostic: bool, env: HashMap<String, String>) -> Self {
        let config = ImperativeConfig::builder("sample")
            .cli_home("/tmp/sample-home")
            .diagnostic(diagnostic)
            .interactive(false)
            .build(&HashMap::<String, String>::new())
            .unwrap();

        Self {
            config,
            tree: tree(),
            registry: registry(),
            profiles: profiles(),
            env,
        }
    }

    fn processor(&self) -> CommandProcessor<'_> {
        CommandProcessor::new(
            &self.config,
            &self.tree,
            &self.registry,
            &self.profiles,
            &self.env,
        )
    }

    async fn run(&self, args: &str) -> Output {
        let tokens = tokens(args);
        let out = Captured::default();
        let err = Captured::default();
        let mut response = CommandResponse::with_writers(
            requested_format(&tokens),
            Box::new(out.clone()),
            Box::new(err.clone()),
        );

        let code = self.processor().invoke(&tokens, &mut response).await.unwrap();

        Output {
            code,
            stdout: out.text(),
            stderr: err.text(),
        }
    }
}

fn tokens(input: &str) -> Vec<String> {
    input.split_whitespace().map(String::from).collect()
}

#[test]
fn format_value_scalars() {
    assert_eq!(format_value(&json!("hello world")), "\"hello world\"");
    assert_eq!(format_value(&json!("")), "\"\"");
    assert_eq!(format_value(&json!(42)), "42");
    assert_eq!(format_value(&json!(-2.5)), "-2.5");
    assert_eq!(format_value(&json!(true)), "true");
    assert_eq!(format_value(&Value::Null), "null");
}

#[test]
fn format_value_collections() {
    assert_eq!(format_value(&json!(["a", 1])), "[\"a\", 1]");
    assert_eq!(format_value(&json!([])), "[]");
    assert_eq!(format_value(&json!({"a": 1, "b": 2})), "{2}");
}

#[test]
fn registry_creates_registered_handlers() {
    let registry = registry();

    assert!(registry.contains("respond"));
    assert!(registry.create("respond").is_some());
    assert!(registry.create("nope").is_none());
    assert_eq!(registry.ids().first(), Some(&"eat.banana"));
}

#[test]
fn requested_format_reads_both_spellings() {
    assert_eq!(
        requested_format(&tokens("eat --response-format-json")),
        ResponseFormat::Json
    );
    assert_eq!(requested_format(&tokens("eat --rfj")), ResponseFormat::Json);
    assert_eq!(requested_format(&tokens("eat --rfj=true")), ResponseFormat::Json);
    assert_eq!(requested_format(&tokens("eat --responseFormatJson")), ResponseFormat::Json);
    assert_eq!(requested_format(&tokens("eat --rfj=false")), ResponseFormat::Default);
    assert_eq!(requested_format(&tokens("eat --rfj false")), ResponseFormat::Default);
    assert_eq!(requested_format(&tokens("eat -- --rfj")), ResponseFormat::Default);
    assert_eq!(requested_format(&tokens("eat")), ResponseFormat::Default);
}

#[tokio::test]
async fn handler_runs_with_defaults_and_profile() {
    let harness = Harness::new();

    let output = harness.run("eat banana --color yellow").await;

    assert_eq!(output.code, 0);
    assert_eq!(output.stdout, "flavor: sweet\n");
    assert!(output.stderr.is_empty());
}

#[tokio::test]
async fn command_line_beats_environment_beats_profile() {
    let env = HashMap::from([("SAMPLE_OPT_FLAVOR".to_string(), "bold".to_string())]);
    let harness = Harness::with(false, env);

    let cli = harness.run("eat banana --color yellow --flavor tart").await;
    assert_eq!(cli.stdout, "flavor: tart\n");

    let env = harness.run("eat banana --color yellow").await;
    assert_eq!(env.stdout, "flavor: bold\n");
}

#[tokio::test]
async fn json_response_is_one_document() {
    let harness = Harness::new();

    let output = harness.run("respond-with-data --response-format-json").await;

    assert_eq!(output.code, 0);
    let document: Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(document["success"], json!(true));
    assert_eq!(document["message"], json!("done"));
    assert_eq!(document["data"], json!({"x": 1}));
    assert_eq!(document["stdout"], json!("responding\n"));
    assert!(output.stderr.is_empty());
}

#[tokio::test]
async fn json_flag_accepts_every_parser_form() {
    let harness = Harness::new();

    for args in [
        "respond-with-data --rfj=true",
        "respond-with-data --responseFormatJson",
        "respond-with-data --response-format-json TRUE",
    ] {
        let output = harness.run(args).await;
        let document: Value = serde_json::from_str(&output.stdout).unwrap();
        assert_eq!(document["data"], json!({"x": 1}), "{args}");
    }

    let output = harness.run("respond-with-data --rfj false").await;
    assert_eq!(output.code, 0);
    assert_eq!(output.stdout, "responding\n");
}

#[tokio::test]
async fn parsed_json_flag_sets_the_format() {
    let harness = Harness::new();
    let out = Captured::default();
    let mut response = CommandResponse::with_writers(
        ResponseFormat::Default,
        Box::new(out.clone()),
        Box::new(io::sink()),
    );

    let code = harness
        .processor()
        .invoke(&tokens("respond-with-data --rfj=TRUE"), &mut response)
        .await
        .unwrap();

    assert_eq!(code, 0);
    assert!(response.is_json());
    let document: Value = serde_json::from_str(&out.text()).unwrap();
    assert_eq!(document["message"], json!("done"));
}

#[tokio::test]
async fn missing_required_option_fails_before_handler() {
    let harness = Harness::new();

    let output = harness.run("eat banana").await;

    assert_eq!(output.code, 1);
    assert!(output.stdout.is_empty());
    assert!(output.stderr.contains("Syntax Error"));
    assert!(output.stderr.contains("--color"));
}

#[tokio::test]
async fn json_mode_embeds_validation_error() {
    let harness = Harness::new();

    let output = harness.run("eat banana --rfj").await;

    assert_eq!(output.code, 1);
    assert!(output.stderr.is_empty());
    let document: Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(document["success"], json!(false));
    assert_eq!(document["exitCode"], json!(1));
    assert_eq!(document["error"]["kind"], json!("Validation"));
    assert_eq!(document["error"]["option"], json!("color"));
    assert_eq!(document["error"]["definition"]["name"], json!("color"));
}

#[tokio::test]
async fn syntax_throw_returns_error_unrendered() {
    let harness = Harness::new();
    let out = Captured::default();
    let err = Captured::default();
    let mut response = CommandResponse::with_writers(
        ResponseFormat::Default,
        Box::new(out.clone()),
        Box::new(err.clone()),
    );

    let result = harness
        .processor()
        .invoke(&tokens("eat strict"), &mut response)
        .await;

    assert!(matches!(result, Err(CommandError::Validation(ref e)) if e.option == "color"));
    assert!(out.text().is_empty());
    assert!(err.text().is_empty());
}

#[tokio::test]
async fn missing_handler_fails_with_message() {
    let harness = Harness::new();

    let none = harness.run("invalid no-handler").await;
    assert_eq!(none.code, 1);
    assert!(none.stderr.contains("it has no handler"));

    let unregistered = harness.run("invalid unregistered").await;
    assert_eq!(unregistered.code, 1);
    assert!(unregistered.stderr.contains("\"missing.id\" is not registered"));
}

#[tokio::test]
async fn expected_error_uses_requested_exit_code() {
    let harness = Harness::new();

    let output = harness.run("eat fail").await;

    assert_eq!(output.code, 7);
    assert!(output.stderr.contains("Command Error"));
    assert!(output.stderr.contains("No bananas left"));
    assert!(output.stderr.contains("Try again tomorrow"));
}

#[tokio::test]
async fn unexpected_error_detail_needs_diagnostic_mode() {
    let quiet = Harness::new().run("eat broken").await;
    assert_eq!(quiet.code, 1);
    assert!(quiet.stderr.contains("Unexpected Command Error"));
    assert!(!quiet.stderr.contains("disk on fire"));
    assert!(quiet.stderr.contains("SAMPLE_DIAGNOSTIC"));

    let loud = Harness::with(true, HashMap::new()).run("eat broken").await;
    assert!(loud.stderr.contains("disk on fire"));
}

#[tokio::test]
async fn handler_panic_is_contained() {
    let output = Harness::with(true, HashMap::new()).run("eat panic").await;

    assert_eq!(output.code, 1);
    assert!(output.stderr.contains("boom"));
}

#[tokio::test]
async fn help_short_circuits() {
    let harness = Harness::new();

    let help = harness.run("eat banana --help").await;
    assert_eq!(help.code, 0);
    assert!(help.stdout.contains("DESCRIPTION"));
    assert!(help.stdout.contains("Eat a banana"));
    assert!(help.stdout.contains("--color"));

    let group = harness.run("eat").await;
    assert_eq!(group.code, 0);
    assert!(group.stdout.contains("COMMANDS"));
    assert!(group.stdout.contains("banana"));
}

#[tokio::test]
async fn show_inputs_only_censors_secrets() {
    let harness = Harness::new();

    let output = harness
        .run("eat banana --color yellow --password hunter2 --show-inputs-only")
        .await;

    assert_eq!(output.code, 0);
    assert!(output.stdout.contains("\"color\": \"yellow\""));
    assert!(output.stdout.contains("****"));
    assert!(!output.stdout.contains("hunter2"));
}

#[tokio::test]
async fn unknown_command_suggests_alternatives() {
    let output = Harness::new().run("eat banan").await;

    assert_eq!(output.code, 1);
    assert!(output.stderr.contains("Unknown command"));
    assert!(output.stderr.contains("Did you mean: banana"));
}

#[tokio::test]
async fn unknown_profile_is_a_profile_error() {
    let output = Harness::new()
        .run("eat banana --color yellow --fruit-profile nope")
        .await;

    assert_eq!(output.code, 1);
    assert!(output.stderr.contains("Profile Error"));
    assert!(output.stderr.contains("\"nope\""));
}

#[tokio::test]
async fn try_invoke_leaves_rendering_to_caller() {
    let harness = Harness::new();
    let mut response = CommandResponse::with_writers(
        ResponseFormat::Default,
        Box::new(io::sink()),
        Box::new(io::sink()),
    );

    let error = harness
        .processor()
        .try_invoke(&tokens("eat banana"), &mut response)
        .await
        .unwrap_err();

    assert!(error.is_syntax());
    assert!(response.stderr_text().is_empty());
}

#[tokio::test]
async fn sequential_invocations_share_the_tree() {
    let harness = Harness::new();

    let first = harness.run("eat ba --color green").await;
    let second = harness.run("eat ba --color green").await;

    assert_eq!(first.stdout, second.stdout);
    assert_eq!(first.code, second.code);
}

#[tokio::test]
async fn service_lists_profiles_censored() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join("sample.config.toml"),
        r#"
[defaults]
fruit = "mine"

[profiles.mine]
type = "fruit"

[profiles.mine.properties]
flavor = "sweet"
password = "hunter2"
"#,
    )
    .unwrap();

    let config = ImperativeConfig::builder("sample")
        .cli_home(home.path())
        .interactive(false)
        .build(&HashMap::<String, String>::new())
        .unwrap();
    let service = CliService::new(
        config,
        CommandDefinition::root("Sample CLI").child(banana()),
        registry(),
    )
    .unwrap()
    .with_environment(Box::new(HashMap::<String, String>::new()));

    assert!(service.list_commands().contains(&"config list".to_string()));

    let out = Captured::default();
    let mut response = CommandResponse::with_writers(
        ResponseFormat::Default,
        Box::new(out.clone()),
        Box::new(io::sink()),
    );
    let code = service
        .run_with_response(&tokens("config list"), &mut response)
        .await
        .unwrap();

    assert_eq!(code, 0);
    let text = out.text();
    assert!(text.contains("fruit (default: mine)"));
    assert!(text.contains("flavor: \"sweet\""));
    assert!(text.contains("password: \"****\""));
    assert!(!text.contains("hunter2"));
}

fn profiles_service(home: &std::path::Path) -> CliService {
    let config = ImperativeConfig::builder("sample")
        .cli_home(home)
        .profile_type("fruit")
        .profile_type("veggie")
        .interactive(false)
        .build(&HashMap::<String, String>::new())
        .unwrap();

    let mut store = profiles();
    store.insert(Profile::new("tart", "fruit").property("flavor", "sour"));

    CliService::new(
        config,
        CommandDefinition::root("Sample CLI").child(banana()),
        registry(),
    )
    .unwrap()
    .with_profiles(store)
    .with_environment(Box::new(HashMap::<String, String>::new()))
}

async fn run_service(service: &CliService, args: &str) -> (i32, String) {
    let out = Captured::default();
    let mut response = CommandResponse::with_writers(
        requested_format(&tokens(args)),
        Box::new(out.clone()),
        Box::new(io::sink()),
    );
    let code = service
        .run_with_response(&tokens(args), &mut response)
        .await
        .unwrap();
    (code, out.text())
}

#[tokio::test]
async fn config_profiles_prints_a_table_of_types() {
    let home = tempfile::tempdir().unwrap();
    let service = profiles_service(home.path());

    let (code, text) = run_service(&service, "config profiles").await;

    assert_eq!(code, 0);
    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec![
            "type    default  profiles",
            "------  -------  ----------",
            "fruit   mine     mine, tart",
            "veggie",
        ]
    );
}

#[tokio::test]
async fn config_profiles_output_follows_format_options() {
    let home = tempfile::tempdir().unwrap();
    let service = profiles_service(home.path());

    let (_, list) = run_service(&service, "config profiles --rft list --rff type").await;
    assert_eq!(list, "fruit\nveggie\n");

    let (_, bare) = run_service(
        &service,
        "config profiles --response-format-filter type default --rfh false",
    )
    .await;
    assert_eq!(bare, "fruit   mine\nveggie\n");

    let (code, json) = run_service(&service, "config profiles --rfj").await;
    assert_eq!(code, 0);
    let document: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        document["data"],
        json!({"fruit": ["mine", "tart"], "veggie": []})
    );
}

#[tokio::test]
async fn config_profiles_rejects_unknown_output_type() {
    let home = tempfile::tempdir().unwrap();
    let service = profiles_service(home.path());

    let out = Captured::default();
    let err = Captured::default();
    let mut response = CommandResponse::with_writers(
        ResponseFormat::Default,
        Box::new(out.clone()),
        Box::new(err.clone()),
    );
    let code = service
        .run_with_response(&tokens("config profiles --rft grid"), &mut response)
        .await
        .unwrap();

    assert_eq!(code, 1);
    assert!(out.text().is_empty());
    assert!(err.text().contains("--response-format-type"));
}
