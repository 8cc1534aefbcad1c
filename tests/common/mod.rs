//! Common test utilities and helpers

#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Temporary directory of workflow exports with controllable mtimes
pub struct ExportTree {
    temp_dir: TempDir,
}

impl ExportTree {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `value` to `relative`, creating parent directories
    pub fn add(&self, relative: &str, value: &Value) -> PathBuf {
        let path = self.temp_dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    /// Write a file and set its modification time to `secs_ago` seconds in the past
    pub fn add_aged(&self, relative: &str, value: &Value, secs_ago: u64) -> PathBuf {
        let path = self.add(relative, value);
        set_age(&path, secs_ago);
        path
    }

    pub fn add_raw(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Every `*.json` path under the tree, relative and sorted
    pub fn json_files(&self) -> Vec<String> {
        let mut files: Vec<String> = walkdir::WalkDir::new(self.path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("json"))
            .map(|e| {
                e.path()
                    .strip_prefix(self.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }
}

pub fn set_age(path: &Path, secs_ago: u64) {
    let when = SystemTime::now() - Duration::from_secs(secs_ago);
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(when)
        .unwrap();
}

/// A workflow that satisfies the bundled schema
pub fn valid_workflow(trigger_name: &str) -> Value {
    json!({
        "name": trigger_name,
        "nodes": [
            {
                "id": "0f5532f9-36ba-4bef-86c7-30d607400b15",
                "name": trigger_name,
                "type": "n8n-nodes-base.scheduleTrigger",
                "typeVersion": 1.2,
                "position": [0, 0],
                "parameters": {}
            },
            {
                "id": "7c1a9f5e-2b4d-4e8a-9c3f-1d2e3f4a5b6c",
                "name": "Send Telegram Alert",
                "type": "n8n-nodes-base.telegram",
                "typeVersion": 1,
                "position": [220, 0],
                "parameters": { "chatId": "8400587790", "text": "price moved" },
                "continueOnFail": true
            },
            {
                "id": "a3b4c5d6-e7f8-4a9b-8c0d-1e2f3a4b5c6d",
                "name": "About",
                "type": "n8n-nodes-base.stickyNote",
                "typeVersion": 1,
                "position": [0, -200],
                "parameters": { "content": "## Price alert\nNotifies on big moves" }
            }
        ],
        "connections": {}
    })
}
