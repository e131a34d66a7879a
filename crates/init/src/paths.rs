// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem layout: `pwd`/`home`/`tmp`/`cache`/`config` resolved from the
//! standard OS user directories, with missing directories created on the
//! spot, using `dirs` in place of a hand-rolled `XDG_STATE_HOME`/`HOME`
//! fallback chain.

use std::io;
use std::path::PathBuf;

/// Resolved filesystem layout for one process run.
#[derive(Debug, Clone)]
pub struct Paths {
    pub pwd: PathBuf,
    pub home: PathBuf,
    pub tmp: PathBuf,
    pub cache: PathBuf,
    pub config: PathBuf,
    pub pid_file: PathBuf,
    /// True if `config` did not exist before this run created it —
    /// becomes `app.firstuse`.
    pub first_use: bool,
}

fn join_profile(base: PathBuf, profile: &str) -> PathBuf {
    if profile == "default" {
        base
    } else {
        base.join("profiles").join(profile)
    }
}

impl Paths {
    /// Resolve every path in the filesystem layout for
    /// `slug`/`profile`/`instance_id`, creating any directory that does
    /// not yet exist.
    pub fn resolve(slug: &str, profile: &str, instance_id: &str) -> io::Result<Self> {
        let pwd = std::env::current_dir()?;
        let home = dirs::home_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;

        let cache_root = dirs::cache_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no cache directory"))?;
        let cache = join_profile(cache_root.join(slug), profile);

        let config_root = dirs::config_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?;
        let config = join_profile(config_root.join(slug), profile);
        let first_use = !config.exists();

        let tmp_root = std::env::temp_dir();
        let tmp_name = format!("{slug}-{instance_id}");
        let tmp = join_profile(tmp_root.join(tmp_name), profile);

        std::fs::create_dir_all(&cache)?;
        std::fs::create_dir_all(&config)?;
        std::fs::create_dir_all(&tmp)?;

        let pids_dir = config.join("pids");
        std::fs::create_dir_all(&pids_dir)?;
        let pid_file = pids_dir.join(format!("instance-{instance_id}.pid"));
        std::fs::write(&pid_file, std::process::id().to_string())?;

        Ok(Self {
            pwd,
            home,
            tmp,
            cache,
            config,
            pid_file,
            first_use,
        })
    }

    pub fn profile_preferences_path(&self) -> PathBuf {
        self.config.join("profile.preferences")
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
