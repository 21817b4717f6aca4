//! Shared helpers for researchdesk CLI tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

const ENV_VARS: &[&str] = &[
    "GROQ_API_KEY",
    "GROQ_API_BASE",
    "RESEARCHDESK_MODEL",
    "NEWS_API_KEY",
    "RESEARCHDESK_HOST",
    "RESEARCHDESK_PORT",
];

/// Isolated HOME and working directory for one test
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub data_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let data_dir = temp_dir.path().join(".researchdesk");
        Ok(Self { temp_dir, data_dir })
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Command with HOME and cwd pointing at the temp dir and no credentials
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_researchdesk"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.current_dir(self.temp_dir.path());
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    pub fn write_config(&self, json: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::write(self.config_file(), json)?;
        Ok(())
    }

    pub fn write_dotenv(&self, content: &str) -> anyhow::Result<()> {
        let dir = self.temp_dir.path().join("config");
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(".env"), content)?;
        Ok(())
    }
}
