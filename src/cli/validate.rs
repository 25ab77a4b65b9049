//! Generic option validation.
//!
//! Validation depends only on the schema, the raw invocation, the invocation
//! time and whether referenced input files can be opened: the same input
//! always yields the same outcome and the same diagnostic.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use trading_core::types::{AuthAlias, DataFrequency, Define, FrequencySet};

use super::schema::{CommandKind, CommandSchema, DefaultValue, Rule, ValueKind};

/// A rejected invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub command: CommandKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(command: CommandKind, message: impl Into<String>) -> Self {
        Self {
            command,
            message: message.into(),
        }
    }

    /// Usage banner shown above the diagnostic.
    pub fn usage(&self) -> String {
        format!(
            "Usage: trading {name} [OPTIONS]\nTry 'trading {name} --help' for help.",
            name = self.command.name()
        )
    }
}

/// An option value as supplied on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Flag(bool),
    Many(Vec<String>),
}

/// A command tag plus the options the operator supplied, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: CommandKind,
    options: Vec<(String, RawValue)>,
}

impl Invocation {
    pub fn new(command: CommandKind) -> Self {
        Self {
            command,
            options: Vec::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: RawValue) {
        self.options.retain(|(existing, _)| existing != name);
        self.options.push((name.to_string(), value));
    }

    /// Builder form of [`Invocation::set`] for text values.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, RawValue::Text(value.into()));
        self
    }

    /// Record a text option when supplied.
    pub fn text(&mut self, name: &str, value: Option<&String>) {
        if let Some(value) = value {
            self.set(name, RawValue::Text(value.clone()));
        }
    }

    /// Record a path option when supplied.
    pub fn path(&mut self, name: &str, value: Option<&PathBuf>) {
        if let Some(value) = value {
            self.set(name, RawValue::Text(value.display().to_string()));
        }
    }

    /// Record a `--name/--no-name` flag pair when either side was given.
    pub fn flag_pair(&mut self, name: &str, on: bool, off: bool) {
        if on {
            self.set(name, RawValue::Flag(true));
        } else if off {
            self.set(name, RawValue::Flag(false));
        }
    }

    /// Record a repeated option when given at least once.
    pub fn many(&mut self, name: &str, values: &[String]) {
        if !values.is_empty() {
            self.set(name, RawValue::Many(values.to_vec()));
        }
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.options
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.options.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// A type-checked option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Path(PathBuf),
    Amount(Decimal),
    Date(DateTime<Utc>),
    Frequency(DataFrequency),
    Frequencies(FrequencySet),
    Symbols(Vec<String>),
    Defines(Vec<Define>),
    AuthAliases(Vec<AuthAlias>),
    Flag(bool),
}

/// Validated options of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Values {
    command: CommandKind,
    values: BTreeMap<&'static str, Value>,
}

impl Values {
    pub fn command(&self) -> CommandKind {
        self.command
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(Value::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        match self.values.get(name) {
            Some(Value::Path(path)) => Some(path),
            _ => None,
        }
    }

    pub fn amount(&self, name: &str) -> Option<Decimal> {
        match self.values.get(name) {
            Some(Value::Amount(amount)) => Some(*amount),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.values.get(name) {
            Some(Value::Date(date)) => Some(*date),
            _ => None,
        }
    }

    pub fn frequency(&self, name: &str) -> Option<DataFrequency> {
        match self.values.get(name) {
            Some(Value::Frequency(frequency)) => Some(*frequency),
            _ => None,
        }
    }

    pub fn frequencies(&self, name: &str) -> Option<&FrequencySet> {
        match self.values.get(name) {
            Some(Value::Frequencies(set)) => Some(set),
            _ => None,
        }
    }

    pub fn symbols(&self, name: &str) -> &[String] {
        match self.values.get(name) {
            Some(Value::Symbols(symbols)) => symbols,
            _ => &[],
        }
    }

    pub fn defines(&self, name: &str) -> &[Define] {
        match self.values.get(name) {
            Some(Value::Defines(defines)) => defines,
            _ => &[],
        }
    }

    pub fn auth_aliases(&self, name: &str) -> &[AuthAlias] {
        match self.values.get(name) {
            Some(Value::AuthAliases(aliases)) => aliases,
            _ => &[],
        }
    }

    /// Flag value; absent flags read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Value::Flag(true)))
    }

    pub fn optional_flag(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(Value::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    /// Text value that the schema rules guarantee to be present.
    pub fn require_text(&self, name: &str) -> Result<&str, ValidationError> {
        self.text(name)
            .ok_or_else(|| ValidationError::new(self.command, format!("missing option '{}'", name)))
    }
}

/// Validate an invocation against a schema.
///
/// Options the schema does not expose are dropped, supplied values are type
/// checked, defaults are filled in (`now` for time defaults), and finally the
/// rules are evaluated in order.
pub fn validate(
    schema: &CommandSchema,
    invocation: &Invocation,
    now: DateTime<Utc>,
) -> Result<Values, ValidationError> {
    let command = schema.command;
    let mut values = BTreeMap::new();

    for (name, raw) in invocation.options() {
        let Some(spec) = schema.option(name) else {
            debug!(command = command.name(), option = name, "Option not available, ignoring");
            continue;
        };
        let value = parse_value(spec.kind, raw).map_err(|reason| {
            ValidationError::new(
                command,
                format!("Invalid value for {}: {}", spec.flag, reason),
            )
        })?;
        values.insert(spec.name, value);
    }

    for spec in &schema.options {
        if values.contains_key(spec.name) {
            continue;
        }
        let default = match spec.default {
            Some(DefaultValue::Text(text)) => parse_value(spec.kind, &RawValue::Text(text.to_string()))
                .map_err(|reason| ValidationError::new(command, reason))?,
            Some(DefaultValue::Flag(flag)) => Value::Flag(flag),
            Some(DefaultValue::Now) => Value::Date(now),
            None => continue,
        };
        values.insert(spec.name, default);
    }

    let values = Values { command, values };
    for rule in &schema.rules {
        check_rule(rule, &values)?;
    }

    Ok(values)
}

fn check_rule(rule: &Rule, values: &Values) -> Result<(), ValidationError> {
    let fail = |message: &str| Err(ValidationError::new(values.command, message));

    match rule {
        Rule::ExactlyOne { options, message } => {
            if values.contains(options[0]) == values.contains(options[1]) {
                return fail(*message);
            }
        }
        Rule::Both {
            first,
            second,
            neither,
            missing_first,
            missing_second,
        } => match (values.contains(first), values.contains(second)) {
            (false, false) => return fail(*neither),
            (false, true) => return fail(*missing_first),
            (true, false) => return fail(*missing_second),
            (true, true) => {}
        },
        Rule::Required { option, message } => {
            if !values.contains(option) {
                return fail(*message);
            }
        }
        Rule::Satisfies {
            option,
            check,
            message,
        } => {
            if let Some(value) = values.get(option) {
                if !check(value) {
                    return fail(*message);
                }
            }
        }
        Rule::OneOf {
            option,
            allowed,
            unless,
        } => {
            if unless.is_some_and(|other| values.contains(other)) {
                return Ok(());
            }
            if let Some(name) = values.text(option) {
                if !allowed.contains(&name) {
                    return Err(ValidationError::new(
                        values.command,
                        format!(
                            "{} does not support {}, please choose exchange from: {}",
                            values.command.name(),
                            name,
                            allowed.join(", ")
                        ),
                    ));
                }
            }
        }
    }

    Ok(())
}

fn parse_value(kind: ValueKind, raw: &RawValue) -> Result<Value, String> {
    match (kind, raw) {
        (ValueKind::Flag, RawValue::Flag(flag)) => Ok(Value::Flag(*flag)),
        (ValueKind::Flag, RawValue::Text(text)) => parse_bool(text).map(Value::Flag),
        (ValueKind::Defines, RawValue::Many(items)) => items
            .iter()
            .map(|item| Define::from_str(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Defines),
        (ValueKind::Defines, RawValue::Text(item)) => {
            Define::from_str(item).map(|define| Value::Defines(vec![define]))
        }
        (_, RawValue::Text(text)) => parse_text(kind, text),
        (_, RawValue::Many(items)) => match items.last() {
            Some(last) => parse_text(kind, last),
            None => Err("no value given".to_string()),
        },
        (_, RawValue::Flag(_)) => Err("expected a value, not a flag".to_string()),
    }
}

fn parse_text(kind: ValueKind, text: &str) -> Result<Value, String> {
    match kind {
        ValueKind::Text => Ok(Value::Text(text.to_string())),
        ValueKind::Path => Ok(Value::Path(PathBuf::from(text))),
        ValueKind::File => readable_file(text).map(Value::Path),
        ValueKind::Amount => Decimal::from_str(text.trim())
            .map(Value::Amount)
            .map_err(|_| format!("'{}' is not a valid number", text)),
        ValueKind::Date => parse_date(text).map(Value::Date),
        ValueKind::Frequency => DataFrequency::from_str(text)
            .map(Value::Frequency)
            .map_err(|_| format!("'{}' is not one of daily, minute", text)),
        ValueKind::Frequencies => FrequencySet::from_str(text)
            .map(Value::Frequencies)
            .map_err(|_| {
                format!(
                    "'{}' is not one of daily, minute, daily,minute, minute,daily",
                    text
                )
            }),
        ValueKind::Symbols => Ok(Value::Symbols(
            text.split(',')
                .map(str::trim)
                .filter(|symbol| !symbol.is_empty())
                .map(str::to_string)
                .collect(),
        )),
        ValueKind::Defines => Define::from_str(text).map(|define| Value::Defines(vec![define])),
        ValueKind::AuthAliases => AuthAlias::parse_list(text).map(Value::AuthAliases),
        ValueKind::Flag => parse_bool(text).map(Value::Flag),
    }
}

/// Check that `text` names a file that can be opened for reading.
fn readable_file(text: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(text);
    let file = File::open(&path).map_err(|e| format!("could not open file '{}': {}", text, e))?;
    match file.metadata() {
        Ok(metadata) if metadata.is_dir() => Err(format!("'{}' is a directory", text)),
        _ => Ok(path),
    }
}

fn parse_bool(text: &str) -> Result<bool, String> {
    match text.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(format!("'{}' is not a valid boolean", text)),
    }
}

/// Parse a date, a date-time, or an RFC 3339 timestamp as UTC.
fn parse_date(text: &str) -> Result<DateTime<Utc>, String> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    let formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.and_utc());
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(text, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
    }

    Err(format!("'{}' does not match the format YYYY-MM-DD", text))
}
