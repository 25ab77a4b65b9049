//! Declarative option schemas, one per command.
//!
//! A schema lists the options a command exposes (with their value kinds and
//! defaults) and the ordered consistency rules checked after type checking.
//! The first rule that fails produces the diagnostic, so rules are listed with
//! the most likely mistake first.

use trading_core::types::KNOWN_EXCHANGES;

use super::validate::Value;

/// Commands of the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Run,
    Live,
    RemoteRun,
    RemoteStatus,
    IngestExchange,
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Run => "run",
            CommandKind::Live => "live",
            CommandKind::RemoteRun => "remote-run",
            CommandKind::RemoteStatus => "remote-status",
            CommandKind::IngestExchange => "ingest-exchange",
        }
    }
}

/// How a raw option value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Path,
    /// Path of a file that must exist and be readable.
    File,
    /// Decimal amount.
    Amount,
    /// Calendar date or timestamp, interpreted as UTC.
    Date,
    /// `daily` or `minute`.
    Frequency,
    /// Comma-separated frequencies.
    Frequencies,
    /// Comma-separated symbols.
    Symbols,
    /// Repeated `name=expression` bindings.
    Defines,
    /// `exchange,alias,...` pairs.
    AuthAliases,
    Flag,
}

/// Value used when an option is not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Text(&'static str),
    Flag(bool),
    /// The invocation time.
    Now,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    /// How the option is spelled in diagnostics, e.g. `'-s' / '--start'`.
    pub flag: &'static str,
    pub kind: ValueKind,
    pub default: Option<DefaultValue>,
}

impl OptionSpec {
    fn new(name: &'static str, flag: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            flag,
            kind,
            default: None,
        }
    }

    fn or(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// A consistency rule over the typed option values.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Exactly one of two options must be present.
    ExactlyOne {
        options: [&'static str; 2],
        message: &'static str,
    },
    /// Both options must be present; a joint message is used when neither is.
    Both {
        first: &'static str,
        second: &'static str,
        neither: &'static str,
        missing_first: &'static str,
        missing_second: &'static str,
    },
    Required {
        option: &'static str,
        message: &'static str,
    },
    /// A present value must pass `check`.
    Satisfies {
        option: &'static str,
        check: fn(&Value) -> bool,
        message: &'static str,
    },
    /// The value must be one of `allowed`, unless `unless` is present.
    OneOf {
        option: &'static str,
        allowed: &'static [&'static str],
        unless: Option<&'static str>,
    },
}

/// Options that only exist under some runtime capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Running inside an interactive session.
    pub interactive: bool,
}

#[derive(Debug, Clone)]
pub struct CommandSchema {
    pub command: CommandKind,
    pub options: Vec<OptionSpec>,
    pub rules: Vec<Rule>,
}

impl CommandSchema {
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|spec| spec.name == name)
    }

    /// Build the schema of `command`.
    pub fn for_command(command: CommandKind, capabilities: Capabilities) -> Self {
        match command {
            CommandKind::Run => run_schema(capabilities),
            CommandKind::Live => live_schema(capabilities),
            CommandKind::RemoteRun => remote_run_schema(capabilities),
            CommandKind::RemoteStatus => remote_status_schema(),
            CommandKind::IngestExchange => ingest_schema(),
        }
    }
}

const ALGO_SOURCE: &str =
    "must specify exactly one of '-f' / '--algofile' or '-t' / '--algotext'";
const EXCHANGE: &str = "must specify an exchange name '-x'";
const CAPITAL: &str = "must specify a capital base with '--capital-base'";
const CAPITAL_POSITIVE: &str = "capital base given with '--capital-base' must be positive";

fn algorithm_options(capabilities: Capabilities) -> Vec<OptionSpec> {
    use ValueKind::*;

    let mut options = vec![
        OptionSpec::new("algofile", "'-f' / '--algofile'", File),
        OptionSpec::new("algotext", "'-t' / '--algotext'", Text),
        OptionSpec::new("define", "'-D' / '--define'", Defines),
        OptionSpec::new("capital-base", "'--capital-base'", Amount),
        OptionSpec::new("exchange-name", "'-x' / '--exchange-name'", Text),
        OptionSpec::new("algo-namespace", "'-n' / '--algo-namespace'", Text),
        OptionSpec::new("quote-currency", "'-c' / '--quote-currency'", Text),
        OptionSpec::new("print-algo", "'--print-algo'", Flag).or(DefaultValue::Flag(false)),
    ];
    if capabilities.interactive {
        options.push(OptionSpec::new("local-namespace", "'--local-namespace'", Flag));
    }
    options
}

fn simulation_options() -> Vec<OptionSpec> {
    use ValueKind::*;

    vec![
        OptionSpec::new("data-frequency", "'--data-frequency'", Frequency)
            .or(DefaultValue::Text("daily")),
        OptionSpec::new("bundle", "'-b' / '--bundle'", Text).or(DefaultValue::Text("poloniex")),
        OptionSpec::new("bundle-timestamp", "'--bundle-timestamp'", Date).or(DefaultValue::Now),
        OptionSpec::new("start", "'-s' / '--start'", Date),
        OptionSpec::new("end", "'-e' / '--end'", Date),
    ]
}

fn backtest_rules() -> Vec<Rule> {
    vec![
        Rule::ExactlyOne {
            options: ["algofile", "algotext"],
            message: ALGO_SOURCE,
        },
        Rule::Both {
            first: "start",
            second: "end",
            neither: "must specify dates with '-s' / '--start' and '-e' / '--end' in backtest mode",
            missing_first: "must specify a start date with '-s' / '--start' in backtest mode",
            missing_second: "must specify an end date with '-e' / '--end' in backtest mode",
        },
        Rule::Required {
            option: "exchange-name",
            message: EXCHANGE,
        },
        Rule::Required {
            option: "quote-currency",
            message: "must specify a quote currency with '-c' in backtest mode",
        },
        Rule::Required {
            option: "capital-base",
            message: CAPITAL,
        },
        Rule::Satisfies {
            option: "capital-base",
            check: is_positive_amount,
            message: CAPITAL_POSITIVE,
        },
    ]
}

fn run_schema(capabilities: Capabilities) -> CommandSchema {
    let mut options = algorithm_options(capabilities);
    options.extend(simulation_options());
    options.push(OptionSpec::new("output", "'-o' / '--output'", ValueKind::Text).or(DefaultValue::Text("-")));

    CommandSchema {
        command: CommandKind::Run,
        options,
        rules: backtest_rules(),
    }
}

fn remote_run_schema(capabilities: Capabilities) -> CommandSchema {
    let mut options = algorithm_options(capabilities);
    options.extend(simulation_options());
    options.push(OptionSpec::new("mail", "'-m' / '--mail'", ValueKind::Text));

    let mut rules = backtest_rules();
    rules.push(Rule::Required {
        option: "mail",
        message: MAIL,
    });
    rules.push(Rule::Satisfies {
        option: "mail",
        check: is_email_value,
        message: MAIL,
    });

    CommandSchema {
        command: CommandKind::RemoteRun,
        options,
        rules,
    }
}

const MAIL: &str = "must specify a valid email with '--mail'";

fn live_schema(capabilities: Capabilities) -> CommandSchema {
    use ValueKind::*;

    let mut options = algorithm_options(capabilities);
    options.extend([
        OptionSpec::new("start", "'-s' / '--start'", Date),
        OptionSpec::new("end", "'-e' / '--end'", Date),
        OptionSpec::new("output", "'-o' / '--output'", Text).or(DefaultValue::Text("-")),
        OptionSpec::new("live-graph", "'--live-graph'", Flag).or(DefaultValue::Flag(false)),
        OptionSpec::new("simulate-orders", "'--simulate-orders'", Flag).or(DefaultValue::Flag(true)),
        OptionSpec::new("auth-aliases", "'--auth-aliases'", AuthAliases),
    ]);

    CommandSchema {
        command: CommandKind::Live,
        options,
        rules: vec![
            Rule::ExactlyOne {
                options: ["algofile", "algotext"],
                message: ALGO_SOURCE,
            },
            Rule::Required {
                option: "exchange-name",
                message: EXCHANGE,
            },
            Rule::Required {
                option: "algo-namespace",
                message: "must specify an algorithm name '-n' in live execution mode",
            },
            Rule::Required {
                option: "quote-currency",
                message: "must specify a quote currency '-c' in live execution mode",
            },
            Rule::Required {
                option: "capital-base",
                message: CAPITAL,
            },
            Rule::Satisfies {
                option: "capital-base",
                check: is_positive_amount,
                message: CAPITAL_POSITIVE,
            },
        ],
    }
}

fn remote_status_schema() -> CommandSchema {
    use ValueKind::*;

    CommandSchema {
        command: CommandKind::RemoteStatus,
        options: vec![
            OptionSpec::new("algo-id", "'-i' / '--algo-id'", Text),
            OptionSpec::new("data-output", "'-d' / '--data-output'", Text).or(DefaultValue::Text("-")),
            OptionSpec::new("log-output", "'-l' / '--log-output'", Text).or(DefaultValue::Text("-")),
        ],
        rules: vec![Rule::Required {
            option: "algo-id",
            message: "must specify an id of your running algorithm with '--algo-id'",
        }],
    }
}

fn ingest_schema() -> CommandSchema {
    use ValueKind::*;

    CommandSchema {
        command: CommandKind::IngestExchange,
        options: vec![
            OptionSpec::new("exchange-name", "'-x' / '--exchange-name'", Text),
            OptionSpec::new("data-frequency", "'-f' / '--data-frequency'", Frequencies)
                .or(DefaultValue::Text("daily")),
            OptionSpec::new("start", "'-s' / '--start'", Date),
            OptionSpec::new("end", "'-e' / '--end'", Date),
            OptionSpec::new("include-symbols", "'-i' / '--include-symbols'", Symbols),
            OptionSpec::new("exclude-symbols", "'--exclude-symbols'", Symbols),
            OptionSpec::new("csv", "'--csv'", Path),
            OptionSpec::new("show-progress", "'--show-progress'", Flag).or(DefaultValue::Flag(true)),
            OptionSpec::new("verbose", "'--verbose'", Flag).or(DefaultValue::Flag(false)),
            OptionSpec::new("validate", "'--validate'", Flag).or(DefaultValue::Flag(false)),
        ],
        rules: vec![
            Rule::Required {
                option: "exchange-name",
                message: EXCHANGE,
            },
            Rule::OneOf {
                option: "exchange-name",
                allowed: KNOWN_EXCHANGES,
                unless: Some("csv"),
            },
        ],
    }
}

fn is_positive_amount(value: &Value) -> bool {
    matches!(value, Value::Amount(amount) if amount.is_sign_positive() && !amount.is_zero())
}

fn is_email_value(value: &Value) -> bool {
    matches!(value, Value::Text(text) if is_email(text))
}

/// Basic `local@domain.tld` shape: one `@`, a non-empty local part, and a
/// domain holding a dot with text on both sides.
pub fn is_email(candidate: &str) -> bool {
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_email("ops@example.com"));
        assert!(is_email("first.last@mail.example.org"));
        assert!(!is_email("not-an-email"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("ops@example"));
        assert!(!is_email("ops@.com"));
        assert!(!is_email("ops@example."));
        assert!(!is_email("a@b@c.com"));
    }

    #[test]
    fn test_local_namespace_requires_interactive() {
        let batch = CommandSchema::for_command(CommandKind::Run, Capabilities::default());
        assert!(batch.option("local-namespace").is_none());

        let interactive =
            CommandSchema::for_command(CommandKind::Run, Capabilities { interactive: true });
        assert!(interactive.option("local-namespace").is_some());
    }

    #[test]
    fn test_live_has_no_bundle_options() {
        let live = CommandSchema::for_command(CommandKind::Live, Capabilities::default());
        assert!(live.option("bundle").is_none());
        assert!(live.option("data-frequency").is_none());
        assert!(live.option("simulate-orders").is_some());
    }

    #[test]
    fn test_remote_run_extends_run_rules() {
        let run = CommandSchema::for_command(CommandKind::Run, Capabilities::default());
        let remote = CommandSchema::for_command(CommandKind::RemoteRun, Capabilities::default());
        assert_eq!(remote.rules.len(), run.rules.len() + 2);
        assert!(remote.option("output").is_none());
        assert!(remote.option("mail").is_some());
    }
}
