// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command flag declarations: one entry per `--name`/`-shortcut`
//! pair a command accepts, independent of its positional-argument policy.

use clap::{Arg, ArgAction};
use rt_core::Value;

/// A single declared flag on a [`crate::Command`].
#[derive(Debug, Clone)]
pub struct Flag {
    pub(crate) name: String,
    pub(crate) short: Option<char>,
    pub(crate) description: String,
    pub(crate) takes_value: bool,
    pub(crate) default: Option<Value>,
    pub(crate) global: bool,
}

impl Flag {
    /// A boolean switch, e.g. `--debug`.
    pub fn switch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            description: String::new(),
            takes_value: false,
            default: None,
            global: false,
        }
    }

    /// A flag that takes a value, e.g. `--profile <name>`.
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            description: String::new(),
            takes_value: true,
            default: None,
            global: false,
        }
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Root flags (`--version`, `--debug`, `--profile`, ...) are declared
    /// global so every subcommand inherits them without shadowing.
    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone()).long(self.name.clone());
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if !self.description.is_empty() {
            arg = arg.help(self.description.clone());
        }
        if self.global {
            arg = arg.global(true);
        }
        if self.takes_value {
            arg = arg.action(ArgAction::Set);
            if let Some(default) = &self.default {
                arg = arg.default_value(default.to_string());
            }
        } else {
            arg = arg.action(ArgAction::SetTrue);
        }
        arg
    }
}

#[cfg(test)]
#[path = "flag_tests.rs"]
mod tests;
