mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "edcmeter",
    version,
    about = "EDC energy meter payload decoder and downlink encoder"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "EDCMETER_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::TruncationArg;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from(["edcmeter", "decode", "0264", "--port", "1"])
            .expect("decode args should parse");

        let Command::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(args.payload.as_deref(), Some("0264"));
        assert_eq!(args.port, 1);
        assert!(matches!(args.truncation, TruncationArg::Reject));
    }

    #[test]
    fn parses_truncation_policy() {
        let cli = Cli::try_parse_from(["edcmeter", "decode", "1e00", "--truncation", "zero-pad"])
            .expect("truncation should parse");
        let Command::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert!(matches!(args.truncation, TruncationArg::ZeroPad));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "edcmeter",
            "decode",
            "0264",
            "--json",
            r#"{"bytes":[2,100],"fPort":1}"#,
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn decode_requires_a_payload() {
        let err = Cli::try_parse_from(["edcmeter", "decode"]).expect_err("payload required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from([
            "edcmeter",
            "encode",
            "set_reporting_interval",
            "--interval-seconds",
            "300",
        ])
        .expect("encode args should parse");

        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.command.as_deref(), Some("set_reporting_interval"));
        assert_eq!(args.interval_seconds, Some(300));
    }

    #[test]
    fn parses_build_subcommand() {
        let cli = Cli::try_parse_from(["edcmeter", "build", "v1=230.1", "fpl1=0.9"])
            .expect("build args should parse");
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.fields, vec!["v1=230.1", "fpl1=0.9"]);
    }
}
