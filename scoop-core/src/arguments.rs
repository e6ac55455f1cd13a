// scoop-core/src/arguments.rs
//! Coercion of `key:value` strings into typed queue-declaration arguments.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ScoopError;

/// Keys whose values the broker expects as strings. Every other key is an integer.
pub const STRING_ARGUMENT_KEYS: [&str; 5] = [
    "x-overflow",
    "x-queue-mode",
    "x-queue-master-locator",
    "x-dead-letter-exchange",
    "x-dead-letter-routing-key",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Str(String),
    Int(i64),
}

/// Typed declaration arguments for a single queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueueArguments(BTreeMap<String, ArgValue>);

impl QueueArguments {
    /// Applies raw arguments in order; a repeated key replaces the earlier value.
    pub fn apply<S: AsRef<str>>(&mut self, raw: &[S]) -> Result<(), ScoopError> {
        for argument in raw {
            let (key, value) = parse_argument(argument.as_ref())?;
            self.0.insert(key, value);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ArgValue)> {
        self.0.iter()
    }
}

/// Argument sets for both queues, after layering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectedArguments {
    pub from: QueueArguments,
    pub to: QueueArguments,
}

impl DirectedArguments {
    /// Shared arguments first, then the direction-specific ones on top.
    pub fn layered<S: AsRef<str>>(
        shared: &[S],
        from_only: &[S],
        to_only: &[S],
    ) -> Result<Self, ScoopError> {
        let mut from = QueueArguments::default();
        let mut to = QueueArguments::default();
        from.apply(shared)?;
        to.apply(shared)?;
        from.apply(from_only)?;
        to.apply(to_only)?;
        Ok(Self { from, to })
    }
}

/// Parses a single `key:value` pair. Only the first `:` separates key and value.
pub fn parse_argument(raw: &str) -> Result<(String, ArgValue), ScoopError> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| ScoopError::MalformedArgument(raw.to_string()))?;
    let (key, value) = (key.trim(), value.trim());

    if STRING_ARGUMENT_KEYS.contains(&key) {
        return Ok((key.to_string(), ArgValue::Str(value.to_string())));
    }

    value
        .parse::<i64>()
        .map(|n| (key.to_string(), ArgValue::Int(n)))
        .map_err(|_| ScoopError::InvalidIntegerArgument {
            key: key.to_string(),
            value: value.to_string(),
        })
}
