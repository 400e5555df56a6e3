use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use circular_gauge::{Gauge, GaugeCommand, GaugeConfig, WindowOptions};
use rand::Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: circular-gauge [options]

  --config FILE     load gauge settings from a JSON file
  --range MIN MAX   value range
  --steps N         number of tick intervals
  --value V         initial value
  --title TITLE     window title
  --font PATH       font file for the tick labels
  --stdin           read values from stdin, one per line
  --demo            move the needle randomly

Arrow keys step the value, Home/End jump to the bounds.";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    range: Option<(f64, f64)>,
    steps: Option<u32>,
    value: Option<f64>,
    title: Option<String>,
    font: Option<PathBuf>,
    stdin: bool,
    demo: bool,
}

fn parse_number<T: std::str::FromStr>(flag: &str, raw: Option<String>) -> Result<T, String> {
    let raw = raw.ok_or_else(|| format!("{flag} needs a value"))?;
    raw.parse()
        .map_err(|_| format!("{flag}: cannot parse {raw:?}"))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                parsed.config = Some(args.next().ok_or("--config needs a path")?.into());
            }
            "--range" => {
                let x: f64 = parse_number("--range", args.next())?;
                let y: f64 = parse_number("--range", args.next())?;
                parsed.range = Some((x.min(y), x.max(y)));
            }
            "--steps" => parsed.steps = Some(parse_number("--steps", args.next())?),
            "--value" => parsed.value = Some(parse_number("--value", args.next())?),
            "--title" => parsed.title = Some(args.next().ok_or("--title needs a value")?),
            "--font" => parsed.font = Some(args.next().ok_or("--font needs a path")?.into()),
            "--stdin" => parsed.stdin = true,
            "--demo" => parsed.demo = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument {other:?}\n\n{USAGE}")),
        }
    }
    Ok(parsed)
}

fn spawn_stdin_feed(sender: Sender<GaugeCommand>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match line.trim().parse::<f64>() {
                Ok(value) => {
                    if sender.send(GaugeCommand::SetValue(value)).is_err() {
                        break;
                    }
                }
                Err(_) => warn!(line = %line.trim(), "not a number"),
            }
        }
    });
}

fn spawn_random_feed(sender: Sender<GaugeCommand>, min: f64, max: f64) {
    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut value = (min + max) / 2.0;
        let mut target = value;
        loop {
            // Drift towards a target that changes now and then.
            if rng.random_range(0.0..1.0) < 0.05 {
                target = rng.random_range(min..=max);
            }
            value += (target - value) * 0.1;
            if sender.send(GaugeCommand::SetValue(value)).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(30));
        }
    });
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };

    let mut config = match &args.config {
        Some(path) => GaugeConfig::from_json_file(path)?,
        None => GaugeConfig::default(),
    };
    if let Some((min, max)) = args.range {
        config.min_value = min;
        config.max_value = max;
        if args.value.is_none() {
            config.value = min;
        }
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(value) = args.value {
        config.value = value;
    }

    let (min, max) = (config.min_value, config.max_value);
    let mut gauge = Gauge::new(config)?;
    let options = WindowOptions::builder()
        .maybe_font_path(args.font)
        .title(args.title.unwrap_or_else(|| "Custom Gauge".to_string()))
        .build();

    if args.stdin || args.demo {
        let (sender, receiver) = mpsc::channel();
        if args.stdin {
            info!("reading values from stdin");
            spawn_stdin_feed(sender.clone());
        }
        if args.demo {
            info!("random needle demo");
            spawn_random_feed(sender, min, max);
        }
        gauge.show_with_commands(&options, receiver)?;
    } else {
        gauge.show(&options)?;
    }
    Ok(())
}
