// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The command tree: each node owns a name, description, category,
//! usage tuple, its own flagset and positional-argument bounds, optional
//! subcommands, and five lifecycle hooks. Built once by addons during
//! initialization, verified, then handed to a [`crate::Dispatcher`].

use crate::args::Args;
use crate::flag::Flag;
use clap::{Arg, Command as ClapCommand};
use futures::future::BoxFuture;
use rt_core::CommandError;
use rt_session::Session;
use std::collections::HashSet;
use std::sync::Arc;

pub type HookResult = Result<(), CommandError>;

/// `Before`/`Do`/`AfterSuccess` share this shape: `(session, args) -> Result<()>`.
pub type Hook = Arc<dyn Fn(Arc<Session>, Arc<Args>) -> BoxFuture<'static, HookResult> + Send + Sync>;

/// `AfterFailure` additionally receives the error `Do` (or a `Before` in
/// the chain) returned, rendered to a string.
pub type FailureHook =
    Arc<dyn Fn(Arc<Session>, Arc<Args>, String) -> BoxFuture<'static, HookResult> + Send + Sync>;

/// `AfterAlways` runs unconditionally and cannot itself fail the command.
pub type AlwaysHook =
    Arc<dyn Fn(Arc<Session>, Arc<Args>, Option<String>) -> BoxFuture<'static, ()> + Send + Sync>;

/// A usage tuple: `(short usage line, long description)`.
pub type Usage = (String, String);

/// A node in the CLI command tree.
pub struct Command {
    name: String,
    description: String,
    category: String,
    usage: Usage,
    flags: Vec<Flag>,
    argn_min: usize,
    argn_max: usize,
    subcommands: Vec<Command>,
    skip_addons: bool,
    before: Option<Hook>,
    do_action: Option<Hook>,
    after_success: Option<Hook>,
    after_failure: Option<FailureHook>,
    after_always: Option<AlwaysHook>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: String::new(),
            usage: (String::new(), String::new()),
            flags: Vec::new(),
            argn_min: 0,
            argn_max: 0,
            subcommands: Vec::new(),
            skip_addons: false,
            before: None,
            do_action: None,
            after_success: None,
            after_failure: None,
            after_always: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_usage(mut self, short: impl Into<String>, long: impl Into<String>) -> Self {
        self.usage = (short.into(), long.into());
        self
    }

    pub fn with_argn(mut self, min: usize, max: usize) -> Self {
        self.argn_min = min;
        self.argn_max = max;
        self
    }

    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_subcommand(mut self, subcommand: Command) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    /// Marks this command as exempt from addon register actions: the
    /// initializer skips invoking an addon's register action when the
    /// active command has `skip.addons` set.
    pub fn skip_addons(mut self) -> Self {
        self.skip_addons = true;
        self
    }

    pub fn with_before(mut self, hook: Hook) -> Self {
        self.before = Some(hook);
        self
    }

    pub fn with_do(mut self, hook: Hook) -> Self {
        self.do_action = Some(hook);
        self
    }

    pub fn with_after_success(mut self, hook: Hook) -> Self {
        self.after_success = Some(hook);
        self
    }

    pub fn with_after_failure(mut self, hook: FailureHook) -> Self {
        self.after_failure = Some(hook);
        self
    }

    pub fn with_after_always(mut self, hook: AlwaysHook) -> Self {
        self.after_always = Some(hook);
        self
    }

    pub fn should_skip_addons(&self) -> bool {
        self.skip_addons
    }

    pub fn has_do(&self) -> bool {
        self.do_action.is_some()
    }

    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    pub(crate) fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub(crate) fn before_hook(&self) -> Option<&Hook> {
        self.before.as_ref()
    }

    pub(crate) fn do_hook(&self) -> Option<&Hook> {
        self.do_action.as_ref()
    }

    pub(crate) fn after_success_hook(&self) -> Option<&Hook> {
        self.after_success.as_ref()
    }

    pub(crate) fn after_failure_hook(&self) -> Option<&FailureHook> {
        self.after_failure.as_ref()
    }

    pub(crate) fn after_always_hook(&self) -> Option<&AlwaysHook> {
        self.after_always.as_ref()
    }

    /// Verification phase: unique names under each parent, at least
    /// one of `{Do, subcommands}`, consistent positional-arg bounds, and no
    /// subcommand flag shadowing an ancestor's.
    pub fn verify(&self) -> Result<(), CommandError> {
        self.verify_node(&[])
    }

    fn verify_node(&self, inherited_flags: &[String]) -> Result<(), CommandError> {
        if self.do_action.is_none() && self.subcommands.is_empty() {
            return Err(CommandError::Empty(self.name.clone()));
        }
        if self.argn_min > self.argn_max {
            return Err(CommandError::InvalidArgBounds {
                name: self.name.clone(),
                min: self.argn_min,
                max: self.argn_max,
            });
        }
        for flag in &self.flags {
            if inherited_flags.iter().any(|f| f == &flag.name) {
                return Err(CommandError::ShadowedFlag {
                    command: self.name.clone(),
                    flag: flag.name.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for sub in &self.subcommands {
            if !seen.insert(sub.name.clone()) {
                return Err(CommandError::DuplicateName(sub.name.clone()));
            }
        }

        let mut child_flags = inherited_flags.to_vec();
        child_flags.extend(self.flags.iter().map(|f| f.name.clone()));
        for sub in &self.subcommands {
            sub.verify_node(&child_flags)?;
        }
        Ok(())
    }

    /// Build the equivalent `clap::Command` tree used to parse argv.
    /// `--help`/`--version` are declared explicitly as root [`Flag`]s and
    /// short-circuited by the initializer, so clap's own
    /// auto-generated equivalents are disabled here to avoid a duplicate
    /// argument id.
    pub(crate) fn to_clap(&self) -> ClapCommand {
        let mut cmd = ClapCommand::new(self.name.clone())
            .disable_help_flag(true)
            .disable_help_subcommand(true)
            .disable_version_flag(true);
        if !self.description.is_empty() {
            cmd = cmd.about(self.description.clone());
        }
        if !self.usage.0.is_empty() {
            cmd = cmd.override_usage(self.usage.0.clone());
        }
        for flag in &self.flags {
            cmd = cmd.arg(flag.to_arg());
        }
        if self.argn_max > 0 {
            cmd = cmd.arg(
                Arg::new("args")
                    .num_args(self.argn_min..=self.argn_max)
                    .trailing_var_arg(true),
            );
        }
        for sub in &self.subcommands {
            cmd = cmd.subcommand(sub.to_clap());
        }
        cmd
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
