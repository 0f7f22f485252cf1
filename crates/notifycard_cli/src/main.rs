//! Command-line front end for notifycard_core.
//!
//! # Responsibility
//! - Sanitize or render notification strings without a host.
//! - Keep output deterministic so it can be diffed in scripts.
//!
//! Usage:
//! - `notifycard [--log-dir <dir>] [--log-level <level>] <command> [text...]`
//! - `sanitize <text>...` prints a JSON array with one sanitized fragment per
//!   input, so fragments that keep a raw newline stay one entry.
//! - `render [--dark] <text>...` prints full card markup.
//! - With no `<text>`, a JSON array of strings is read from stdin.
//! - `--log-dir` starts file logging there; `--log-level` needs it.

use log::info;
use notifycard_core::render::html::render_card;
use notifycard_core::{
    core_version, default_log_level, init_logging, sanitize_notification, CardConfig, Fragment,
    Identity, LogSettings, NotificationList, Theme,
};
use std::io::Read;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("notifycard: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<String, String> {
    let (settings, rest) = split_log_options(args)?;
    if let Some(settings) = settings {
        init_logging(&settings).map_err(|err| err.to_string())?;
    }

    let Some((command, rest)) = rest.split_first() else {
        return Err(usage());
    };
    let output = match command.as_str() {
        "sanitize" => {
            let list = read_notifications(rest)?;
            let fragments: Vec<String> = list
                .iter()
                .map(|raw| sanitize_notification(raw).to_html())
                .collect();
            serde_json::to_string(&fragments)
                .map_err(|err| format!("failed to encode output: {err}"))?
        }
        "render" => {
            let dark = rest.first().is_some_and(|flag| flag == "--dark");
            let texts = if dark { &rest[1..] } else { rest };
            let list = read_notifications(texts)?.or_placeholder();
            let items: Vec<Fragment> = list.iter().map(|raw| sanitize_notification(raw)).collect();
            let config = CardConfig::new(Identity::Person("cli".to_string()));
            render_card(Theme::from_dark_mode(dark), &config, &items)
        }
        "version" => format!("notifycard_core version={}", core_version()),
        other => return Err(format!("unknown command `{other}`\n{}", usage())),
    };
    info!("event=cli_run module=cli status=ok command={}", command);
    Ok(output)
}

/// Splits leading `--log-dir` / `--log-level` options from the command.
fn split_log_options(args: &[String]) -> Result<(Option<LogSettings>, &[String]), String> {
    let mut log_dir: Option<&str> = None;
    let mut level: Option<&str> = None;
    let mut rest = args;
    while let Some((flag, tail)) = rest.split_first() {
        let slot = match flag.as_str() {
            "--log-dir" => &mut log_dir,
            "--log-level" => &mut level,
            _ => break,
        };
        let Some((value, tail)) = tail.split_first() else {
            return Err(format!("`{flag}` needs a value"));
        };
        *slot = Some(value.as_str());
        rest = tail;
    }

    let settings = match (log_dir, level) {
        (Some(dir), level) => Some(
            LogSettings::new(level.unwrap_or(default_log_level()), dir).with_stderr(true),
        ),
        (None, Some(_)) => return Err("`--log-level` requires `--log-dir`".to_string()),
        (None, None) => None,
    };
    Ok((settings, rest))
}

fn read_notifications(texts: &[String]) -> Result<NotificationList, String> {
    if !texts.is_empty() {
        return Ok(NotificationList::new(texts.to_vec()));
    }
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|err| format!("failed to read stdin: {err}"))?;
    serde_json::from_str::<Vec<String>>(&input)
        .map(NotificationList::new)
        .map_err(|err| format!("stdin must be a JSON array of strings: {err}"))
}

fn usage() -> String {
    "usage: notifycard [--log-dir <dir>] [--log-level <level>] \
     <sanitize|render [--dark]|version> [text...]"
        .to_string()
}
