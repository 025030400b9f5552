use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use anyhow::bail;

use crate::engine::Boundary;
use crate::rule_set::RuleSet;
use crate::simulation::DEFAULT_INTERVAL;

pub const USAGE: &str = "\
usage: gridlife [OPTIONS] [PATTERN]

PATTERN is a preset name (glider, blinker, toad, beacon, pulsar), or a path to a
.rle or plaintext .cells file. Defaults to glider.

options:
  --rule RULE       birth/survival rule, e.g. B3/S23 (default: from the file, or B3/S23)
  --clip WxH        step inside a fixed WxH window instead of an unbounded plane
  --interval MS     milliseconds between generations (50-1000, default 200)
  --print N         print generation N to stdout and exit instead of animating
  -h, --help        show this message";

/// Where the starting pattern comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Preset(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: Source,

    /// Overrides whatever rule the pattern file carries
    pub rule: Option<RuleSet>,
    pub boundary: Boundary,
    pub interval: Duration,

    /// Headless mode: print this generation and exit
    pub print: Option<u64>,
    pub help: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: Source::Preset("glider".to_string()),
            rule: None,
            boundary: Boundary::Unbounded,
            interval: DEFAULT_INTERVAL,
            print: None,
            help: false,
        }
    }
}

impl Config {
    /// Parse command line arguments, not including the program name.
    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut source = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .with_context(|| format!("{name} expects a value"))
            };

            match arg.as_str() {
                "-h" | "--help" => config.help = true,
                "--rule" => {
                    let rule = value("--rule")?;
                    let rule: RuleSet = rule
                        .parse()
                        .with_context(|| format!("Invalid rule \"{rule}\""))?;

                    config.rule = Some(rule);
                }
                "--clip" => {
                    let clip = value("--clip")?;
                    config.boundary = parse_clip(&clip)
                        .with_context(|| format!("Invalid window size \"{clip}\""))?;
                }
                "--interval" => {
                    let ms: u64 = value("--interval")?
                        .parse()
                        .context("--interval expects milliseconds")?;

                    config.interval = Duration::from_millis(ms);
                }
                "--print" => {
                    let n: u64 = value("--print")?
                        .parse()
                        .context("--print expects a generation count")?;

                    config.print = Some(n);
                }
                flag if flag.starts_with('-') => bail!("Unknown option {flag}"),
                pattern => {
                    if source.is_some() {
                        bail!("Only one pattern can be given");
                    }

                    source = Some(pattern.to_string());
                }
            }
        }

        if let Some(source) = source {
            config.source = if source.contains('.') || source.contains('/') {
                Source::File(PathBuf::from(source))
            } else {
                Source::Preset(source)
            };
        }

        Ok(config)
    }
}

fn parse_clip(s: &str) -> anyhow::Result<Boundary> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("expected WIDTHxHEIGHT");
    };

    let width: usize = w.trim().parse().context("bad width")?;
    let height: usize = h.trim().parse().context("bad height")?;

    Ok(Boundary::Clipped { width, height })
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::Config;
    use super::Source;
    use crate::engine::Boundary;
    use crate::rule_set::RuleSet;

    fn parse(args: &[&str]) -> anyhow::Result<Config> {
        Config::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults() {
        assert_eq!(parse(&[]).unwrap(), Config::default());
    }

    #[test]
    fn all_options() -> anyhow::Result<()> {
        let config = parse(&[
            "--rule",
            "B36/S23",
            "--clip",
            "40x30",
            "--interval",
            "100",
            "--print",
            "12",
            "pats/gun.rle",
        ])?;

        assert_eq!(config.rule, Some("B36/S23".parse::<RuleSet>()?));
        assert_eq!(
            config.boundary,
            Boundary::Clipped {
                width: 40,
                height: 30
            }
        );
        assert_eq!(config.interval, Duration::from_millis(100));
        assert_eq!(config.print, Some(12));
        assert_eq!(config.source, Source::File(PathBuf::from("pats/gun.rle")));

        Ok(())
    }

    #[test]
    fn preset_source() -> anyhow::Result<()> {
        let config = parse(&["pulsar"])?;
        assert_eq!(config.source, Source::Preset("pulsar".to_string()));

        Ok(())
    }

    #[test]
    fn errors() {
        assert!(parse(&["--rule"]).is_err());
        assert!(parse(&["--rule", "B9"]).is_err());
        assert!(parse(&["--clip", "40"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["glider", "blinker"]).is_err());
    }
}
