use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use jarcheck_classpath::{ClasspathEntry, ClasspathIndex, JdkInstallation};
use jarcheck_config::{init_tracing, load_for_dir, JarcheckConfig};
use jarcheck_resolve::{check_dependencies, MissingDependency, ResolutionVerdict, TypeDirectory};
use jarcheck_types::TypeRef;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "jarcheck",
    version,
    about = "Check that a class's declared dependencies resolve against a set of JARs",
    override_usage = "jarcheck [OPTIONS] <MainClassName> <JAR1> <JAR2> ... <JARN>"
)]
struct Cli {
    /// Binary name of the class to check (e.g. `com.example.Main`)
    #[arg(value_name = "MainClassName")]
    main_class: String,

    /// JARs, JMODs or class directories, searched in order
    #[arg(value_name = "JAR", required = true, num_args = 1..)]
    jars: Vec<PathBuf>,

    /// JDK home providing platform classes (defaults to discovery)
    #[arg(long, value_name = "PATH", conflicts_with = "no_jdk")]
    jdk: Option<PathBuf>,

    /// Do not include JDK platform classes
    #[arg(long)]
    no_jdk: bool,

    /// Config file (defaults to `jarcheck.toml` in the current directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit a JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    entry: &'a str,
    found: bool,
    satisfied: bool,
    missing: Option<&'a MissingDependency>,
    bundles: &'a [ClasspathEntry],
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli)?;
    init_tracing(&config.logging);

    let class_name = entry_class_name(&cli.main_class)?;

    let entries = classpath_entries(&cli, &config)?;
    let index = ClasspathIndex::build(&entries).context("failed to read classpath")?;
    tracing::debug!(
        target: "jarcheck.cli",
        entries = index.entries().len(),
        classes = index.len(),
        "type directory ready"
    );

    let entry = cli.main_class.as_str();
    if !index.resolve(&class_name) {
        if cli.json {
            print_report(&Report {
                entry,
                found: false,
                satisfied: false,
                missing: None,
                bundles: index.entries(),
            })?;
        } else {
            println!("Main class {entry} not found in the provided JAR files.");
        }
        return Ok(1);
    }

    let verdict = check_dependencies(&class_name, &index)
        .with_context(|| format!("failed to check dependencies of {entry}"))?;

    if cli.json {
        let missing = match &verdict {
            ResolutionVerdict::Satisfied => None,
            ResolutionVerdict::Missing(missing) => Some(missing),
        };
        print_report(&Report {
            entry,
            found: true,
            satisfied: verdict.is_satisfied(),
            missing,
            bundles: index.entries(),
        })?;
        return Ok(0);
    }

    match &verdict {
        ResolutionVerdict::Satisfied => {
            println!("All dependencies for {entry} are satisfied.");
        }
        ResolutionVerdict::Missing(missing) => {
            tracing::info!(
                target: "jarcheck.cli",
                missing = %missing.type_name,
                site = %missing.site,
                "unresolved dependency"
            );
            println!("Missing dependency: {}", missing.type_name);
            println!("Some dependencies for {entry} are missing.");
        }
    }
    Ok(0)
}

/// The binary name of the entry class. Slashed internal names are accepted;
/// primitives, `void` and arrays are rejected.
fn entry_class_name(input: &str) -> Result<String> {
    match TypeRef::parse_source_name(input).context("invalid main class name")? {
        TypeRef::Named(name) => Ok(name),
        other => anyhow::bail!("main class `{other}` is not a class type"),
    }
}

fn load_config(cli: &Cli) -> Result<JarcheckConfig> {
    let mut config = match &cli.config {
        Some(path) => JarcheckConfig::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            load_for_dir(&cwd).context("failed to load config")?.0
        }
    };

    if cli.verbose {
        config.logging.level = "debug".to_owned();
    }
    if cli.no_jdk {
        config.jdk.enabled = false;
    }
    if let Some(home) = &cli.jdk {
        config.jdk.home = Some(home.clone());
        config.jdk.enabled = true;
    }
    Ok(config)
}

/// User bundles in command-line order, then platform classes.
fn classpath_entries(cli: &Cli, config: &JarcheckConfig) -> Result<Vec<ClasspathEntry>> {
    let mut entries: Vec<ClasspathEntry> = cli.jars.iter().map(ClasspathEntry::from_path).collect();
    if !config.jdk.enabled {
        return Ok(entries);
    }

    match JdkInstallation::discover(config.jdk.home.as_deref()) {
        Ok(jdk) => {
            tracing::debug!(
                target: "jarcheck.cli",
                root = %jdk.root().display(),
                "using JDK platform classes"
            );
            let platform = jdk
                .platform_entries()
                .with_context(|| format!("failed to list platform classes in {}", jdk.root().display()))?;
            entries.extend(platform);
        }
        // A JDK named on the command line must be usable.
        Err(err) if cli.jdk.is_some() => return Err(err).context("invalid --jdk"),
        Err(err) => {
            tracing::warn!(
                target: "jarcheck.cli",
                error = %err,
                "continuing without JDK platform classes"
            );
        }
    }
    Ok(entries)
}

fn print_report(report: &Report<'_>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
