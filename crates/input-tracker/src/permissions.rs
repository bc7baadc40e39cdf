//! Capability detection and guidance.
//!
//! Guster reads gestures through `libinput debug-events`, which needs
//! access to `/dev/input/event*`, and the default bindings drive X11 tools.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use guster_common::config::AppConfig;

/// A system capability that Guster may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check all capabilities for the given configuration.
pub fn check_capabilities(config: &AppConfig) -> Vec<Capability> {
    let mut capabilities = vec![
        check_event_producer(&config.event_source.command),
        check_input_device_access(),
        check_graphical_session(),
    ];
    capabilities.extend(check_binding_tools(config));
    capabilities
}

/// Check that the event producer binary is installed.
fn check_event_producer(command: &str) -> Capability {
    let available = find_on_path(command).is_some();

    Capability {
        name: "Event Producer".to_string(),
        description: format!("'{command}' binary that emits gesture events"),
        available,
        required: true,
        fix_instructions: if available {
            None
        } else {
            Some("Install libinput tools: sudo apt install libinput-tools".to_string())
        },
    }
}

/// Check if the user can read input devices (needed by `libinput debug-events`).
fn check_input_device_access() -> Capability {
    let input_dir = Path::new("/dev/input");
    let is_root = unsafe { libc::geteuid() } == 0;

    // Check if user is in the 'input' group
    let in_input_group = std::process::Command::new("groups")
        .output()
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .split_whitespace()
                .any(|group| group == "input")
        })
        .unwrap_or(false);

    Capability {
        name: "Input Device Access".to_string(),
        description: "Read access to /dev/input/event* for libinput".to_string(),
        available: input_dir.exists() && (is_root || in_input_group),
        required: true,
        fix_instructions: if is_root || in_input_group {
            None
        } else {
            Some(
                "Add user to input group: sudo usermod -aG input $USER (logout required)"
                    .to_string(),
            )
        },
    }
}

/// Check for a graphical session the bound commands can talk to.
fn check_graphical_session() -> Capability {
    let available = std::env::var("WAYLAND_DISPLAY").is_ok() || std::env::var("DISPLAY").is_ok();

    Capability {
        name: "Graphical Session".to_string(),
        description: "DISPLAY or WAYLAND_DISPLAY for window-manager commands".to_string(),
        available,
        required: false,
        fix_instructions: if available {
            None
        } else {
            Some("Run inside a desktop session, or set DISPLAY=:0 in the service unit".to_string())
        },
    }
}

/// Check that the programs invoked by gesture bindings exist.
fn check_binding_tools(config: &AppConfig) -> Vec<Capability> {
    let programs: BTreeSet<&str> = config
        .gestures
        .iter()
        .filter_map(|(_, command)| binding_program(command))
        .collect();

    programs
        .into_iter()
        .map(|program| {
            let available = find_on_path(program).is_some();
            Capability {
                name: format!("Command '{program}'"),
                description: "Program started by a gesture binding".to_string(),
                available,
                required: false,
                fix_instructions: if available {
                    None
                } else {
                    Some(format!("Install '{program}' or change the bindings that use it"))
                },
            }
        })
        .collect()
}

/// Best-effort guess at the program a shell command line starts.
///
/// Skips subshell parens, `NAME=value` assignments and `exec`/`env`
/// wrappers. Anything more involved is reported as written.
fn binding_program(command: &str) -> Option<&str> {
    command
        .split_whitespace()
        .map(|word| word.trim_start_matches(['(', '{']))
        .filter(|word| !word.is_empty())
        .find(|word| !is_assignment(word) && !matches!(*word, "exec" | "env" | "command"))
}

fn is_assignment(word: &str) -> bool {
    match word.split_once('=') {
        Some((name, _)) => {
            !name.is_empty()
                && !name.starts_with(|c: char| c.is_ascii_digit())
                && name.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Resolve `program` the way a shell would: paths as-is, bare names via `PATH`.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = PathBuf::from(program);
        return path.is_file().then_some(path);
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("Guster System Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = if cap.available {
            "[OK]"
        } else if cap.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_on_path() {
        assert!(find_on_path("sh").is_some());
        assert!(find_on_path("/bin/sh").is_some());
        assert!(find_on_path("guster-definitely-not-installed").is_none());
    }

    #[test]
    fn test_binding_tools_are_deduplicated() {
        let config = AppConfig::default();
        let tools = check_binding_tools(&config);
        let names: Vec<&str> = tools.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Command 'wmctrl'", "Command 'xdotool'"]);
        assert!(tools.iter().all(|c| !c.required));
    }

    #[test]
    fn test_binding_program_skips_wrappers() {
        assert_eq!(binding_program("xdotool key Super"), Some("xdotool"));
        assert_eq!(binding_program("FOO=1 LANG=C xdotool key Super"), Some("xdotool"));
        assert_eq!(binding_program("(exec wmctrl -s 1)"), Some("wmctrl"));
        assert_eq!(binding_program("env DISPLAY=:0 notify-send hi"), Some("notify-send"));
        assert_eq!(binding_program("   "), None);
    }
}
