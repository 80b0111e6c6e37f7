//! Void Engine Edit Core
//!
//! Replays a JSON-lines command script against a fresh document and prints
//! the resulting scene as JSON.
//!
//! ```text
//! void_edit <script.jsonl> [--scene <entities.json>] [--prefs <preferences.toml>]
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use env_logger::Env;

use void_edit::{EditCommand, EditDocument, EditPreferences, SceneEntity};

struct Args {
    script: PathBuf,
    scene: Option<PathBuf>,
    prefs: Option<PathBuf>,
}

fn parse_args() -> Option<Args> {
    let mut script = None;
    let mut scene = None;
    let mut prefs = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scene" => scene = Some(PathBuf::from(args.next()?)),
            "--prefs" => prefs = Some(PathBuf::from(args.next()?)),
            _ if arg.starts_with("--") => {
                log::warn!("Unknown flag: {}", arg);
                return None;
            }
            _ => script = Some(PathBuf::from(arg)),
        }
    }

    Some(Args { script: script?, scene, prefs })
}

fn load_entities(path: &Path) -> Result<Vec<SceneEntity>, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let Some(args) = parse_args() else {
        eprintln!("usage: void_edit <script.jsonl> [--scene <entities.json>] [--prefs <preferences.toml>]");
        return ExitCode::from(2);
    };

    let prefs = EditPreferences::resolve(args.prefs.as_deref());
    let mut doc = EditDocument::with_preferences(prefs);

    if let Some(scene) = &args.scene {
        match load_entities(scene) {
            Ok(entities) => doc.load_scene(entities),
            Err(e) => {
                log::error!("Failed to load scene: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let script = match std::fs::read_to_string(&args.script) {
        Ok(script) => script,
        Err(e) => {
            log::error!("Failed to read {}: {}", args.script.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut failures = 0;
    for (line_no, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match EditCommand::parse(line).and_then(|cmd| doc.execute(cmd)) {
            Ok(outcome) => log::info!("{}: {:?}", line_no + 1, outcome),
            Err(e) => {
                failures += 1;
                log::error!("{}: {}", line_no + 1, e);
            }
        }
    }

    log::info!(
        "Done: {} undo steps, {} redo steps, {} failed commands",
        doc.history.undo_count(),
        doc.history.redo_count(),
        failures
    );

    match serde_json::to_string_pretty(doc.scene.entities()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to serialize scene: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
