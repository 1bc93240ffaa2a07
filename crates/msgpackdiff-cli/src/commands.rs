use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use tracing::debug;

use msgpackdiff_diff::{compare_values, parse_all_with, DiffConfig, Line, LineKind};

use crate::cli::{Cli, ColorChoice};
use crate::input::get_binary;

/// Outcome of a successful comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Equal,
    NotEqual,
}

impl Verdict {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Verdict::Equal => ExitCode::SUCCESS,
            Verdict::NotEqual => ExitCode::from(1),
        }
    }
}

pub fn run(cli: &Cli) -> anyhow::Result<Verdict> {
    configure_color(cli.color);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_to(cli, &mut out)
}

/// Compare the two objects named on the command line and write the report
/// and verdict to `out`.
pub fn run_to<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<Verdict> {
    let config = load_config(cli)?;
    debug!(?config, "effective configuration");

    let first = get_binary(&cli.first).context("failed to extract first object")?;
    let second = get_binary(&cli.second).context("failed to extract second object")?;

    let parser = config.parser_config();
    let first = parse_all_with(&first, &parser).context("failed to parse first object")?;
    let second = parse_all_with(&second, &parser).context("failed to parse second object")?;

    let result = compare_values(first, second, &config.options);
    if result.equal {
        writeln!(out, "Objects are equal")?;
        return Ok(Verdict::Equal);
    }

    for line in result.lines(config.context) {
        writeln!(out, "{}", paint(&line))?;
    }
    writeln!(out, "Objects are not equal")?;
    Ok(Verdict::NotEqual)
}

fn load_config(cli: &Cli) -> anyhow::Result<DiffConfig> {
    let base = match &cli.config {
        Some(path) => DiffConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DiffConfig::default(),
    };
    Ok(cli.apply(base))
}

fn configure_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {
            if !io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
        }
    }
}

fn paint(line: &Line) -> String {
    let text = line.to_string();
    match line.kind {
        LineKind::Unchanged => text,
        LineKind::Deleted => text.red().to_string(),
        LineKind::Added => text.green().to_string(),
        LineKind::Skipped => text.dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write as _;

    fn run_args(args: &[&str]) -> (anyhow::Result<Verdict>, String) {
        colored::control::set_override(false);
        let mut argv = vec!["msgpackdiff", "--color", "never"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();

        let mut out = Vec::new();
        let verdict = run_to(&cli, &mut out);
        (verdict, String::from_utf8(out).unwrap())
    }

    #[test]
    fn equal_objects() {
        let id_name = "gqJpZBukbmFtZaVKYXNvbg==";
        let (verdict, out) = run_args(&[id_name, id_name]);
        assert_eq!(verdict.unwrap(), Verdict::Equal);
        assert_eq!(out, "Objects are equal\n");
    }

    #[test]
    fn unequal_objects_print_report() {
        // {"level":1,"data":{"level":2,"data":1}} vs ...,"data":2}}
        let (verdict, out) = run_args(&[
            "gqVsZXZlbAGkZGF0YYKlbGV2ZWwCpGRhdGEB",
            "gqVsZXZlbAGkZGF0YYKlbGV2ZWwCpGRhdGEC",
        ]);
        assert_eq!(verdict.unwrap(), Verdict::NotEqual);
        let expected = [
            " {",
            "   \"level\": 1,",
            "   \"data\": {",
            "     \"level\": 2,",
            "-    \"data\": 1",
            "+    \"data\": 2",
            "   }",
            " }",
            "Objects are not equal",
        ];
        assert_eq!(out.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn brief_prints_verdict_only() {
        let (verdict, out) = run_args(&["--brief", "kgEC", "kgIB"]);
        assert_eq!(verdict.unwrap(), Verdict::NotEqual);
        assert_eq!(out, "Objects are not equal\n");
    }

    #[test]
    fn flags_change_the_verdict() {
        // {"id": 27, "name": "Jason"} vs {"name": "Jason", "id": 27}
        let a = "gqJpZBukbmFtZaVKYXNvbg==";
        let b = "gqRuYW1lpUphc29uomlkGw==";
        assert_eq!(run_args(&[a, b]).0.unwrap(), Verdict::NotEqual);
        assert_eq!(run_args(&["--ignore-order", a, b]).0.unwrap(), Verdict::Equal);

        // {} vs {"user": null}
        assert_eq!(run_args(&["gA==", "gaR1c2VywA=="]).0.unwrap(), Verdict::NotEqual);
        assert_eq!(
            run_args(&["--ignore-empty", "gA==", "gaR1c2VywA=="]).0.unwrap(),
            Verdict::Equal
        );

        // {"num": 123} vs {"num": 123.0}
        let (int, float) = ("gaNudW17", "gaNudW3LQF7AAAAAAAA=");
        assert_eq!(run_args(&[int, float]).0.unwrap(), Verdict::NotEqual);
        assert_eq!(run_args(&["--flexible-types", int, float]).0.unwrap(), Verdict::Equal);
    }

    #[test]
    fn config_file_supplies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[options]\nignore_order = true").unwrap();
        let path = file.path().to_str().unwrap();

        let (verdict, _) = run_args(&[
            "--config",
            path,
            "gqJpZBukbmFtZaVKYXNvbg==",
            "gqRuYW1lpUphc29uomlkGw==",
        ]);
        assert_eq!(verdict.unwrap(), Verdict::Equal);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "context = [").unwrap();
        let path = file.path().to_str().unwrap();

        let (verdict, out) = run_args(&["--config", path, "gA==", "gA=="]);
        let err = verdict.unwrap_err();
        assert!(format!("{err:#}").contains("failed to load config"));
        assert!(out.is_empty());
    }

    #[test]
    fn malformed_input_is_an_error() {
        // 0xc1 is the reserved marker
        let (verdict, _) = run_args(&["wQ==", "gA=="]);
        let err = verdict.unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse first object"));
    }

    #[test]
    fn unreadable_second_object_is_an_error() {
        let (verdict, _) = run_args(&["gA==", "/nonexistent/dir/object.msgp"]);
        let err = verdict.unwrap_err();
        assert!(format!("{err:#}").contains("failed to extract second object"));
    }

    #[test]
    fn files_and_inline_mix() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x81, 0xa1, b'a', 0x01]).unwrap();
        let path = file.path().to_str().unwrap();

        let (verdict, _) = run_args(&[path, "gaFhAQ=="]);
        assert_eq!(verdict.unwrap(), Verdict::Equal);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Verdict::Equal.exit_code(), ExitCode::SUCCESS);
        assert_eq!(Verdict::NotEqual.exit_code(), ExitCode::from(1));
    }

    #[test]
    fn paint_without_color_is_plain() {
        colored::control::set_override(false);
        let line = Line {
            kind: LineKind::Deleted,
            depth: 1,
            text: "1,".into(),
        };
        assert_eq!(paint(&line), "-  1,");
    }
}
