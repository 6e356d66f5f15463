//! crazyfile CLI - compress and restore numeric-heavy YAML files.

use anyhow::{bail, Context, Result};
use crazyfile::file::{
    check_compress_paths, check_decompress_paths, crazy_path_for, crazy_to_yaml, load_crazy,
    plain_path_for, store_data_to_crazy, yaml_to_crazy,
};
use crazyfile::text::{json, yaml};
use crazyfile::{report, tree, Dtype, Settings};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Verbosity level
const LOG_QUIET: u8 = 0;
const LOG_INFO: u8 = 1;
const LOG_DEBUG: u8 = 2;
const LOG_TRACE: u8 = 3;

fn init_logging(level: u8) {
    let default = match level {
        LOG_QUIET => "error",
        LOG_INFO => "info",
        LOG_DEBUG => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Options shared by all commands.
struct Options {
    settings: Settings,
    json: bool,
    args: Vec<String>,
}

fn parse_args(raw: &[String]) -> Result<(Options, u8)> {
    let mut level = LOG_INFO;
    let mut config: Option<PathBuf> = None;
    let mut threshold = None;
    let mut dtype = None;
    let mut flow_threshold = None;
    let mut gzip_level = None;
    let mut json = false;
    let mut args = Vec::new();

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| -> Result<String> {
            iter.next()
                .cloned()
                .with_context(|| format!("missing value for {}", name))
        };
        match arg.as_str() {
            "-v" | "--verbose" => level = LOG_DEBUG,
            "-vv" | "--trace" => level = LOG_TRACE,
            "-q" | "--quiet" => level = LOG_QUIET,
            "-j" | "--json" => json = true,
            "-t" | "--threshold" => {
                let v = value(arg.as_str())?;
                threshold = Some(v.parse::<usize>().with_context(|| format!("bad threshold '{}'", v))?);
            }
            "-d" | "--dtype" => {
                dtype = Some(value(arg.as_str())?.parse::<Dtype>()?);
            }
            "-f" | "--flow-threshold" => {
                let v = value(arg.as_str())?;
                flow_threshold =
                    Some(v.parse::<usize>().with_context(|| format!("bad flow threshold '{}'", v))?);
            }
            "-l" | "--level" => {
                let v = value(arg.as_str())?;
                gzip_level = Some(v.parse::<u32>().with_context(|| format!("bad level '{}'", v))?);
            }
            "-c" | "--config" => config = Some(PathBuf::from(value(arg.as_str())?)),
            _ => args.push(arg.clone()),
        }
    }

    let mut settings = match config {
        Some(path) => Settings::load(&path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(t) = threshold {
        settings = settings.with_threshold(t);
    }
    if let Some(d) = dtype {
        settings = settings.with_dtype(d);
    }
    if let Some(f) = flow_threshold {
        settings = settings.with_flow_threshold(f);
    }
    if let Some(l) = gzip_level {
        settings.level = l;
    }
    settings.validate()?;

    Ok((Options { settings, json, args }, level))
}

fn main() {
    let raw: Vec<String> = env::args().skip(1).collect();

    let (opts, level) = match parse_args(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };
    init_logging(level);

    if let Err(e) = run(&opts) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(opts: &Options) -> Result<()> {
    let args: Vec<&str> = opts.args.iter().map(String::as_str).collect();
    let Some((&command, rest)) = args.split_first() else {
        print_help();
        return Ok(());
    };

    match command {
        "to-crazy" | "tc" => cmd_to_crazy(rest, &opts.settings),
        "store-crazy" | "sc" => cmd_store_crazy(rest, &opts.settings),
        "load-crazy" | "lc" => cmd_load_crazy(rest, &opts.settings, opts.json),
        "decompress" | "dc" => cmd_decompress(rest, &opts.settings),
        "report" | "r" => cmd_report(rest, &opts.settings),
        "version" | "-V" | "--version" => {
            print_version();
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            print_help();
            bail!("unknown command: {}", other)
        }
    }
}

/// Resolve `<in> [out]`, deriving `out` from `in` when omitted.
fn in_out(rest: &[&str], usage: &str, derive: fn(&Path) -> PathBuf) -> Result<(PathBuf, PathBuf)> {
    match rest {
        [input] => Ok((PathBuf::from(input), derive(Path::new(input)))),
        [input, output] => Ok((PathBuf::from(input), PathBuf::from(output))),
        _ => bail!("expected 1 or 2 arguments\nUsage: {}", usage),
    }
}

fn cmd_to_crazy(rest: &[&str], settings: &Settings) -> Result<()> {
    let (input, output) = in_out(rest, "crazyfile to-crazy <in.yaml> [out.crazy.yaml]", |p| {
        crazy_path_for(p)
    })?;
    check_compress_paths(&input, &output)?;
    yaml_to_crazy(&input, &output, settings)
        .with_context(|| format!("failed to compress {}", input.display()))?;
    println!("{} -> {}", input.display(), output.display());
    Ok(())
}

fn cmd_store_crazy(rest: &[&str], settings: &Settings) -> Result<()> {
    let [data, output] = rest else {
        bail!("expected 2 arguments\nUsage: crazyfile store-crazy <data.json> <out.crazy.yaml>");
    };
    let doc = json::load(data).with_context(|| format!("failed to load data from {}", data))?;
    store_data_to_crazy(doc, output, settings)
        .with_context(|| format!("failed to write {}", output))?;
    println!("{} -> {}", data, output);
    Ok(())
}

fn cmd_load_crazy(rest: &[&str], settings: &Settings, as_json: bool) -> Result<()> {
    let [input] = rest else {
        bail!("expected 1 argument\nUsage: crazyfile load-crazy <in.crazy.yaml> [--json]");
    };
    let doc = load_crazy(input).with_context(|| format!("failed to load {}", input))?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&json::to_value(&doc))?);
    } else {
        print!("{}", yaml::to_string(&tree::annotate(doc, settings.flow_threshold)));
    }
    Ok(())
}

fn cmd_decompress(rest: &[&str], settings: &Settings) -> Result<()> {
    let (input, output) = in_out(rest, "crazyfile decompress <in.crazy.yaml> [out.yaml]", |p| {
        plain_path_for(p)
    })?;
    check_decompress_paths(&input, &output)?;
    crazy_to_yaml(&input, &output, settings)
        .with_context(|| format!("failed to decompress {}", input.display()))?;
    println!("{} -> {}", input.display(), output.display());
    Ok(())
}

fn cmd_report(rest: &[&str], settings: &Settings) -> Result<()> {
    let [input] = rest else {
        bail!("expected 1 argument\nUsage: crazyfile report <in.yaml>");
    };
    let text = std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input))?;
    let doc = yaml::parse(&text)?;
    let rows = report::report(&doc, settings.threshold, &Dtype::FLOATS)?;
    print!("{}", report::render_markdown(&rows));
    Ok(())
}

fn print_version() {
    println!(
        "crazyfile {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("CRAZYFILE_BUILD_DATE").unwrap_or("unknown"),
        option_env!("CRAZYFILE_BUILD_TIME").unwrap_or("unknown"),
    );
}

fn print_help() {
    println!("crazyfile - compress long numeric arrays in YAML files");
    println!();
    println!("USAGE:");
    println!("    crazyfile [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    tc, to-crazy    <in> [out]        Compress YAML (out defaults to <name>.crazy.<ext>)");
    println!("    sc, store-crazy <data.json> <out> Compress a JSON data file into crazy YAML");
    println!("    lc, load-crazy  <in>              Print the decompressed document");
    println!("    dc, decompress  <in> [out]        Restore plain YAML (out drops '.crazy')");
    println!("    r,  report      <in>              Size and precision table per float dtype");
    println!("    version                           Show version and build date");
    println!("    h,  help                          Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -t, --threshold N         Collapse sequences longer than N (default 20)");
    println!("    -d, --dtype NAME          float16 | float32 | float64 | int8..uint64 (default float16)");
    println!("    -f, --flow-threshold N    Inline flat sequences shorter than N (default 10)");
    println!("    -l, --level N             gzip level 0-9 (default 9)");
    println!("    -c, --config FILE         Load settings from a JSON file");
    println!("    -j, --json                load-crazy prints JSON instead of YAML");
    println!("    -v, --verbose             Show debug output");
    println!("    -vv, --trace              Show trace output (very verbose)");
    println!("    -q, --quiet               Only show errors");
    println!();
    println!("EXAMPLES:");
    println!("    crazyfile to-crazy run.yaml                 # writes run.crazy.yaml");
    println!("    crazyfile -t 10 -d float32 to-crazy run.yaml");
    println!("    crazyfile decompress run.crazy.yaml         # writes run.yaml");
    println!("    crazyfile report run.yaml");
    println!();
    println!("NOTES:");
    println!("    - RUST_LOG overrides the -v/-q log level");
}
