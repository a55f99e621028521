//! Настройки командной строки и окружения.

use std::ffi::OsString;

use clap::Parser;
use clap::error::ErrorKind;

/// Приглашение по умолчанию.
pub const DEFAULT_PROMPT: &str = "> ";

/// Что именно сессия выводит для каждой строки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Печатать поток токенов.
    pub show_tokens: bool,
    /// Печатать дерево разбора.
    pub show_tree: bool,
    /// Вычислять выражения и выполнять присваивания.
    pub evaluate: bool,
    /// Приглашение перед каждой строкой; пустая строка отключает его.
    pub prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            show_tokens: true,
            show_tree: true,
            evaluate: true,
            prompt: DEFAULT_PROMPT.to_owned(),
        }
    }
}

/// Аргументы командной строки.
#[derive(Parser, Debug)]
#[command(name = "expr-parser-demo", version, about = "Interactive expression parser demo")]
pub struct Args {
    /// Do not print the token stream
    #[arg(long)]
    pub no_tokens: bool,

    /// Do not print the parse tree
    #[arg(long)]
    pub no_tree: bool,

    /// Parse only, do not evaluate
    #[arg(long)]
    pub no_eval: bool,

    /// Prompt printed before each line (empty disables it)
    #[arg(long, env = "EXPR_DEMO_PROMPT", default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            show_tokens: !self.no_tokens,
            show_tree: !self.no_tree,
            evaluate: !self.no_eval,
            prompt: self.prompt.clone(),
        }
    }

    /// Уровень логирования, если `RUST_LOG` не задан.
    #[must_use]
    pub const fn default_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

/// Что делать после разбора командной строки.
///
/// Ошибочные аргументы не мешают запуску: программа печатает баннер и
/// работает с настройками по умолчанию.
#[derive(Debug)]
pub enum Startup {
    Run {
        config: SessionConfig,
        log_level: &'static str,
        /// Ошибка разбора аргументов, если они были отброшены.
        rejected: Option<clap::Error>,
    },
    /// `--help` или `--version`: напечатать и завершиться.
    Exit(clap::Error),
}

impl Startup {
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Args::try_parse_from(args) {
            Ok(args) => Self::Run {
                config: args.session_config(),
                log_level: args.default_log_level(),
                rejected: None,
            },
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                Self::Exit(e)
            }
            Err(e) => Self::Run {
                config: SessionConfig::default(),
                log_level: "warn",
                rejected: Some(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let args = Args::try_parse_from(["expr-parser-demo"]).unwrap();
        let config = args.session_config();

        assert!(config.show_tokens);
        assert!(config.show_tree);
        assert!(config.evaluate);
        assert_eq!(args.default_log_level(), "warn");
    }

    #[test]
    fn flags_disable_output() {
        let args = Args::try_parse_from([
            "expr-parser-demo",
            "--no-tokens",
            "--no-tree",
            "--no-eval",
            "--prompt",
            "",
            "-v",
        ])
        .unwrap();

        assert_eq!(
            args.session_config(),
            SessionConfig {
                show_tokens: false,
                show_tree: false,
                evaluate: false,
                prompt: String::new(),
            }
        );
        assert_eq!(args.default_log_level(), "debug");
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["expr-parser-demo", "--bogus"]).is_err());
    }

    #[test]
    fn stray_arguments_fall_back_to_defaults() {
        for argv in [
            vec!["expr-parser-demo", "foo"],
            vec!["expr-parser-demo", "--bogus"],
            vec!["expr-parser-demo", "--no-tree", "extra"],
        ] {
            match Startup::from_args(argv.iter().copied()) {
                Startup::Run {
                    config,
                    log_level,
                    rejected,
                } => {
                    assert_eq!(config, SessionConfig::default(), "{argv:?}");
                    assert_eq!(log_level, "warn");
                    assert!(rejected.is_some());
                }
                Startup::Exit(e) => panic!("unexpected early exit for {argv:?}: {e}"),
            }
        }
    }

    #[test]
    fn valid_arguments_are_applied() {
        let Startup::Run {
            config, rejected, ..
        } = Startup::from_args(["expr-parser-demo", "--no-eval"])
        else {
            panic!("expected a run");
        };
        assert!(!config.evaluate);
        assert!(rejected.is_none());
    }

    #[test]
    fn help_and_version_exit_early() {
        for flag in ["--help", "--version"] {
            assert!(matches!(
                Startup::from_args(["expr-parser-demo", flag]),
                Startup::Exit(_)
            ));
        }
    }
}
