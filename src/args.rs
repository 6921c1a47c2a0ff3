//! Command-line argument parsing and processing.
//!
//! Arguments are parsed by hand into a [`CliAction`]. Global flags (`--config`,
//! `--debug`, `--help`, `--version`) may appear anywhere; command-specific options
//! are only accepted by the commands that use them.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Show the sun's position, optionally at a given time or for a given window
    Sun {
        debug_enabled: bool,
        config_dir: Option<String>,
        at: Option<String>,
        sunrise: Option<String>,
        sunset: Option<String>,
        json: bool,
    },
    /// Read settings field(s)
    Get {
        debug_enabled: bool,
        config_dir: Option<String>,
        fields: Vec<String>,
        json: bool,
    },
    /// Update settings field(s)
    Set {
        debug_enabled: bool,
        config_dir: Option<String>,
        fields: Vec<(String, String)>,
    },
    /// Follow the sun and the settings until interrupted
    Watch {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Replay a time range with a simulated clock
    Simulate {
        debug_enabled: bool,
        config_dir: Option<String>,
        start_time: String,
        end_time: String,
        multiplier: Option<f64>,
        fast_forward: bool,
        log_file: Option<String>,
    },
    /// Detailed help for a command, or general help
    Help { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Command-specific options, recorded with the flag that set them.
#[derive(Default)]
struct CommandOptions {
    seen: Vec<&'static str>,
    at: Option<String>,
    sunrise: Option<String>,
    sunset: Option<String>,
    log_file: Option<String>,
    json: bool,
    fast_forward: bool,
}

impl CommandOptions {
    /// First option given that `command` does not accept.
    fn rejected_by(&self, allowed: &[&str]) -> Option<&'static str> {
        self.seen
            .iter()
            .copied()
            .find(|option| !allowed.contains(option))
    }
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments, program name first
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ParsedArgs {
            action: parse_action(args),
        }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

fn parse_action<I, S>(args: I) -> CliAction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args_vec: Vec<String> = args
        .into_iter()
        .skip(1)
        .map(|s| s.as_ref().to_string())
        .collect();

    let mut debug_enabled = false;
    let mut display_help = false;
    let mut display_version = false;
    let mut config_dir: Option<String> = None;
    let mut options = CommandOptions::default();
    let mut positional: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args_vec.len() {
        let arg = args_vec[i].as_str();
        // Flags that take a value consume the next argument
        let mut take_value = |name: &str| -> Option<String> {
            match args_vec.get(i + 1) {
                Some(value) if !value.starts_with('-') => {
                    i += 1;
                    Some(value.clone())
                }
                _ => {
                    log_warning!("Missing value for {name}");
                    None
                }
            }
        };

        match arg {
            "--help" | "-h" => display_help = true,
            "--version" | "-V" | "-v" => display_version = true,
            "--debug" | "-d" => debug_enabled = true,
            "--config" | "-c" => match take_value("--config <directory>") {
                Some(dir) => config_dir = Some(dir),
                None => return CliAction::ShowHelpDueToError,
            },
            "--json" | "-j" => {
                options.seen.push("--json");
                options.json = true;
            }
            "--fast-forward" | "-f" => {
                options.seen.push("--fast-forward");
                options.fast_forward = true;
            }
            "--at" | "--sunrise" | "--sunset" | "--log" => {
                let Some(value) = take_value(arg) else {
                    return CliAction::ShowHelpDueToError;
                };
                match arg {
                    "--at" => {
                        options.seen.push("--at");
                        options.at = Some(value);
                    }
                    "--sunrise" => {
                        options.seen.push("--sunrise");
                        options.sunrise = Some(value);
                    }
                    "--sunset" => {
                        options.seen.push("--sunset");
                        options.sunset = Some(value);
                    }
                    _ => {
                        options.seen.push("--log");
                        options.log_file = Some(value);
                    }
                }
            }
            flag if flag.starts_with('-') => {
                log_warning!("Unknown option: {flag}");
                return CliAction::ShowHelpDueToError;
            }
            _ => positional.push(arg.to_string()),
        }
        i += 1;
    }

    // Version and help take precedence over everything else
    if display_version {
        return CliAction::ShowVersion;
    }
    if display_help {
        return match positional.first() {
            Some(command) if command != "help" && command != "h" => CliAction::Help {
                command: Some(command.clone()),
            },
            _ => CliAction::ShowHelp,
        };
    }

    let (command, rest) = match positional.split_first() {
        Some((command, rest)) => (command.as_str(), rest),
        None => ("sun", &[][..]),
    };

    let allowed: &[&str] = match command {
        "sun" => &["--at", "--sunrise", "--sunset", "--json"],
        "get" | "g" => &["--json"],
        "simulate" | "S" => &["--log", "--fast-forward"],
        _ => &[],
    };
    if let Some(option) = options.rejected_by(allowed) {
        log_warning!("Option {option} is not valid for '{command}'");
        return CliAction::ShowHelpDueToError;
    }

    match command {
        "sun" => {
            if let Some(extra) = rest.first() {
                log_warning!("Unexpected argument for sun: {extra}");
                return CliAction::ShowHelpDueToError;
            }
            CliAction::Sun {
                debug_enabled,
                config_dir,
                at: options.at,
                sunrise: options.sunrise,
                sunset: options.sunset,
                json: options.json,
            }
        }
        "get" | "g" => {
            if rest.is_empty() {
                log_warning!("Missing field. Usage: skycycle get <field> [<field>...]");
                return CliAction::ShowHelpDueToError;
            }
            CliAction::Get {
                debug_enabled,
                config_dir,
                fields: rest.to_vec(),
                json: options.json,
            }
        }
        "set" | "s" => {
            let mut fields = Vec::new();
            for pair in rest {
                match pair.split_once('=') {
                    Some((field, value)) if !field.is_empty() && !value.is_empty() => {
                        fields.push((field.to_string(), value.to_string()));
                    }
                    _ => {
                        log_warning!("Expected <field>=<value>, got '{pair}'");
                        return CliAction::ShowHelpDueToError;
                    }
                }
            }
            if fields.is_empty() {
                log_warning!(
                    "Missing field or value. Usage: skycycle set <field>=<value> [<field>=<value>...]"
                );
                log_warning!("Example: skycycle set temperature_unit=fahrenheit");
                return CliAction::ShowHelpDueToError;
            }
            CliAction::Set {
                debug_enabled,
                config_dir,
                fields,
            }
        }
        "watch" | "w" => {
            if let Some(extra) = rest.first() {
                log_warning!("Unexpected argument for watch: {extra}");
                return CliAction::ShowHelpDueToError;
            }
            CliAction::Watch {
                debug_enabled,
                config_dir,
            }
        }
        "simulate" | "S" => {
            let (start_time, end_time, multiplier) = match rest {
                [start, end] => (start, end, None),
                [start, end, multiplier] => match multiplier.parse::<f64>() {
                    Ok(value) if value.is_finite() && value > 0.0 => (start, end, Some(value)),
                    _ => {
                        log_warning!("Invalid multiplier: {multiplier} (must be a positive number)");
                        return CliAction::ShowHelpDueToError;
                    }
                },
                _ => {
                    log_warning!(
                        "Usage: skycycle simulate <start> <end> [multiplier] [--fast-forward] [--log <file>]"
                    );
                    return CliAction::ShowHelpDueToError;
                }
            };
            if options.fast_forward && multiplier.is_some() {
                log_warning!("Cannot combine a multiplier with --fast-forward");
                return CliAction::ShowHelpDueToError;
            }
            CliAction::Simulate {
                debug_enabled,
                config_dir,
                start_time: start_time.clone(),
                end_time: end_time.clone(),
                multiplier,
                fast_forward: options.fast_forward,
                log_file: options.log_file,
            }
        }
        "help" | "h" => CliAction::Help {
            command: rest.first().cloned(),
        },
        unknown => {
            log_warning!("Unknown command: {unknown}");
            CliAction::ShowHelpDueToError
        }
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("skycycle [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("sun                    Show where the sun is now (default)");
    log_indented!("get, g <field>...      Read settings field(s)");
    log_indented!("set, s <field>=<value> Update settings field(s)");
    log_indented!("watch, w               Follow the sun and settings changes");
    log_indented!("simulate, S <start> <end> [multiplier]");
    log_indented!("                       Replay a time range with a simulated clock");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        let mut full = vec!["skycycle"];
        full.extend_from_slice(args);
        ParsedArgs::parse(full).action
    }

    #[test]
    fn test_parse_no_args_shows_the_sun() {
        assert_eq!(
            parse(&[]),
            CliAction::Sun {
                debug_enabled: false,
                config_dir: None,
                at: None,
                sunrise: None,
                sunset: None,
                json: false,
            }
        );
    }

    #[test]
    fn test_parse_sun_with_options() {
        assert_eq!(
            parse(&[
                "sun",
                "--sunrise",
                "05:00",
                "--sunset",
                "22:31",
                "--at",
                "22:15",
                "--json"
            ]),
            CliAction::Sun {
                debug_enabled: false,
                config_dir: None,
                at: Some("22:15".to_string()),
                sunrise: Some("05:00".to_string()),
                sunset: Some("22:31".to_string()),
                json: true,
            }
        );
    }

    #[test]
    fn test_global_flags_anywhere() {
        assert_eq!(
            parse(&["get", "-d", "all", "--config", "/tmp/sky"]),
            CliAction::Get {
                debug_enabled: true,
                config_dir: Some("/tmp/sky".to_string()),
                fields: vec!["all".to_string()],
                json: false,
            }
        );
    }

    #[test]
    fn test_parse_help_flag() {
        assert_eq!(parse(&["--help"]), CliAction::ShowHelp);
        assert_eq!(parse(&["-h"]), CliAction::ShowHelp);
        assert_eq!(
            parse(&["set", "--help"]),
            CliAction::Help {
                command: Some("set".to_string())
            }
        );
    }

    #[test]
    fn test_version_takes_precedence() {
        assert_eq!(parse(&["--help", "--version"]), CliAction::ShowVersion);
        assert_eq!(parse(&["watch", "-V"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_set_pairs() {
        assert_eq!(
            parse(&["set", "temperature_unit=fahrenheit", "is_dark_theme=true"]),
            CliAction::Set {
                debug_enabled: false,
                config_dir: None,
                fields: vec![
                    ("temperature_unit".to_string(), "fahrenheit".to_string()),
                    ("is_dark_theme".to_string(), "true".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_parse_set_rejects_bare_fields() {
        assert_eq!(parse(&["set"]), CliAction::ShowHelpDueToError);
        assert_eq!(
            parse(&["set", "temperature_unit", "celsius"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(parse(&["set", "=true"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_get_requires_a_field() {
        assert_eq!(parse(&["get", "--json"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_simulate() {
        assert_eq!(
            parse(&[
                "simulate",
                "2024-06-21 04:00:00",
                "2024-06-21 23:00:00",
                "7200",
                "--log",
                "sim.log"
            ]),
            CliAction::Simulate {
                debug_enabled: false,
                config_dir: None,
                start_time: "2024-06-21 04:00:00".to_string(),
                end_time: "2024-06-21 23:00:00".to_string(),
                multiplier: Some(7200.0),
                fast_forward: false,
                log_file: Some("sim.log".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_simulate_errors() {
        assert_eq!(
            parse(&["simulate", "2024-06-21 04:00:00"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            parse(&["S", "a", "b", "fast"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            parse(&["S", "a", "b", "60", "--fast-forward"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_options_are_scoped_to_their_command() {
        assert_eq!(parse(&["watch", "--json"]), CliAction::ShowHelpDueToError);
        assert_eq!(
            parse(&["get", "all", "--at", "12:00"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_unknown_flag_and_command() {
        assert_eq!(parse(&["--bogus"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["sunrise"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["--config"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_help_command() {
        assert_eq!(
            parse(&["help", "watch"]),
            CliAction::Help {
                command: Some("watch".to_string())
            }
        );
        assert_eq!(parse(&["help"]), CliAction::Help { command: None });
    }
}
