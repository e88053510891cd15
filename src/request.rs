//! Request surface seen by guards
//!
//! A [`Request`] is what the transport layer hands over before dispatching a
//! protected operation: its named arguments and the headers the caller sent.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Well-known argument names read by condition filters
pub mod args {
    pub const FRIENDSHIP_ID: &str = "friendshipId";
    pub const COACHSHIP_ID: &str = "coachshipId";
    pub const RECEIVER_ID: &str = "receiverId";
    pub const OF_USER_ID: &str = "ofUserId";
}

/// An incoming call to a protected operation
#[derive(Debug, Clone, Default)]
pub struct Request {
    args: Map<String, Value>,
    headers: HashMap<String, String>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from a JSON object of arguments
    ///
    /// Non-object values yield a request with no arguments.
    pub fn from_args(args: Value) -> Self {
        match args {
            Value::Object(map) => Self {
                args: map,
                headers: HashMap::new(),
            },
            _ => Self::default(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Header names are case-insensitive
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// A string argument, if present and non-empty
    pub fn arg_str(&self, name: &str) -> Option<&str> {
        self.args
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn args(&self) -> &Map<String, Value> {
        &self.args
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}
