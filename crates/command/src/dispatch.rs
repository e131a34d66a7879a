// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch: parse argv against the verified command
//! tree, walk to the deepest active command, then run
//! `Before* -> Do -> (engine stop) -> AfterSuccess|AfterFailure -> AfterAlways`.

use crate::args::Args;
use crate::command::{Command, HookResult};
use clap::ArgMatches;
use rt_core::{CommandError, Value};
use rt_session::Session;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// What the initializer needs to know about the active command before it
/// runs any hooks: its name, whether addon registration
/// should be skipped for it (phase 13), and the flags/positionals parsed
/// from argv so root flags like `--version`/`--debug`/`--profile` can be
/// inspected ahead of dispatch.
pub struct LeafInfo {
    pub name: String,
    pub skip_addons: bool,
    pub args: Arc<Args>,
}

/// A verified command tree ready to parse and dispatch argv.
pub struct Dispatcher {
    root: Command,
}

impl Dispatcher {
    pub fn new(root: Command) -> Result<Self, CommandError> {
        root.verify()?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    /// Parse `argv` against the tree and resolve the deepest active
    /// command without running any hooks. Used by the initializer to read
    /// root flags and decide whether to short-circuit (`--version`,
    /// `--help`) or skip addon registration, before the real dispatch.
    pub fn leaf_info(&self, argv: &[String]) -> Result<LeafInfo, CommandError> {
        let clap_tree = self.root.to_clap();
        let matches = clap_tree
            .try_get_matches_from(argv.to_vec())
            .map_err(|e| CommandError::Flags(e.to_string()))?;
        let (chain, args) = resolve_chain(&self.root, &matches);
        let leaf = *chain.last().ok_or(CommandError::HasNoParent)?;
        Ok(LeafInfo {
            name: leaf.name().to_string(),
            skip_addons: leaf.should_skip_addons(),
            args: Arc::new(args),
        })
    }

    /// Parse `argv` and run the full lifecycle of the deepest active
    /// command. `on_do_complete` is awaited immediately after `Do` returns,
    /// before either After hook — the caller uses it to stop the engine,
    /// then run either `AfterSuccess` or `AfterFailure`. A `Do`/`Before`
    /// error from a user-initiated termination with `allowUserCancel` set
    /// is treated as success.
    pub async fn dispatch<F, Fut>(
        &self,
        session: Arc<Session>,
        argv: Vec<String>,
        on_do_complete: F,
    ) -> Result<i32, CommandError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let clap_tree = self.root.to_clap();
        let matches = clap_tree
            .try_get_matches_from(argv)
            .map_err(|e| CommandError::Flags(e.to_string()))?;
        let (chain, args) = resolve_chain(&self.root, &matches);
        let args = Arc::new(args);

        let run_result = run_chain(&chain, session.clone(), args.clone()).await;
        on_do_complete().await;

        let leaf = *chain.last().ok_or(CommandError::HasNoParent)?;
        let recoverable =
            run_result.is_err() && session.is_terminated() && session.allow_user_cancel();

        let (exit_code, after_result) = if run_result.is_ok() || recoverable {
            let after = match leaf.after_success_hook() {
                Some(hook) => hook(session.clone(), args.clone()).await,
                None => Ok(()),
            };
            (0, after)
        } else {
            let reason = run_result
                .as_ref()
                .err()
                .map(ToString::to_string)
                .unwrap_or_default();
            let after = match leaf.after_failure_hook() {
                Some(hook) => hook(session.clone(), args.clone(), reason).await,
                None => Ok(()),
            };
            (1, after)
        };

        if let Some(hook) = leaf.after_always_hook() {
            let reason = run_result.as_ref().err().map(ToString::to_string);
            hook(session.clone(), args.clone(), reason).await;
        }

        after_result?;
        Ok(exit_code)
    }
}

async fn run_chain(chain: &[&Command], session: Arc<Session>, args: Arc<Args>) -> HookResult {
    for cmd in chain {
        if let Some(before) = cmd.before_hook() {
            before(session.clone(), args.clone()).await?;
        }
    }
    let leaf = chain.last().ok_or(CommandError::HasNoParent)?;
    match leaf.do_hook() {
        Some(do_action) => do_action(session.clone(), args.clone()).await,
        None => Ok(()),
    }
}

fn collect_flags(cmd: &Command, matches: &ArgMatches, flags: &mut HashMap<String, Value>) {
    for flag in cmd.flags() {
        if flag.takes_value {
            if let Some(value) = matches.get_one::<String>(flag.name()) {
                flags.insert(flag.name().to_string(), Value::String(value.clone()));
            }
        } else if matches.get_flag(flag.name()) {
            flags.insert(flag.name().to_string(), Value::Bool(true));
        }
    }
}

/// Walk from `root` down through `matches`' active subcommand chain,
/// merging each level's flags and taking the deepest level's positional
/// arguments.
fn resolve_chain<'a>(root: &'a Command, matches: &ArgMatches) -> (Vec<&'a Command>, Args) {
    let mut chain = vec![root];
    let mut flags = HashMap::new();
    collect_flags(root, matches, &mut flags);

    let mut current_cmd = root;
    let mut current_matches = matches;
    while let Some((name, sub_matches)) = current_matches.subcommand() {
        let Some(sub_cmd) = current_cmd.subcommands().iter().find(|c| c.name() == name) else {
            break;
        };
        chain.push(sub_cmd);
        collect_flags(sub_cmd, sub_matches, &mut flags);
        current_cmd = sub_cmd;
        current_matches = sub_matches;
    }

    let positionals = current_matches
        .get_many::<String>("args")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    (chain, Args::new(positionals, flags))
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
