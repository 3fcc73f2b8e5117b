use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{report, watch};
use crate::catalog::{self, load_program_file, ProgramCatalog, DEFAULT_SAVE_NAME};
use crate::config::{Config, OutputFormat};
use crate::core::Normalizer;
use crate::interpreter::{interpret_program, InterpreterOptions, InterpreterSession};

/// Delay between points in `--play` mode
const PLAY_INTERVAL: Duration = Duration::from_millis(250);

/// Entry point of the `mpf-sim` binary
pub async fn run() -> Result<()> {
    let config = Config::from_args_and_env()?;
    init_logging(&config.log_level);
    run_with_config(&config).await
}

/// `RUST_LOG` wins over the configured level
pub fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).try_init();
}

pub async fn run_with_config(config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    log::info!("{}", catalog.summary());

    if config.list {
        print!("{}", report::render_catalog(&catalog));
        return Ok(());
    }

    if config.files.is_empty() {
        let program = match &config.example {
            Some(name) => catalog
                .get(name)
                .with_context(|| format!("No program named {} in the catalog", name))?,
            None => catalog.active().context("The program catalog is empty")?,
        };
        simulate(&program.name, &program.content, config).await?;
        if config.watch {
            log::warn!("--watch needs a program file; ignoring it for catalog programs");
        }
        return Ok(());
    }

    for path in &config.files {
        let text = read_program(path)?;
        simulate(&display_name(path), &text, config).await?;
    }

    if config.watch {
        watch::watch_files(&config.files, |path| {
            let text = read_program(path)?;
            let session = interpret(&text, config);
            print_session(&display_name(path), &session, config)
        })
        .await?;
    }

    Ok(())
}

/// Bundled examples, then every configured program directory
pub fn load_catalog(config: &Config) -> Result<ProgramCatalog> {
    let mut catalog = ProgramCatalog::with_examples();
    for dir in &config.program_dirs {
        catalog.load_dir(dir)?;
    }
    if let Some(name) = &config.example {
        catalog.set_active(name);
    }
    Ok(catalog)
}

/// Normalize and interpret program text with the configured options
pub fn interpret(text: &str, config: &Config) -> InterpreterSession {
    let program = Normalizer::new(config.gutter).normalize(text);
    let options = InterpreterOptions {
        spindle_preset: config.spindle_preset,
    };
    interpret_program(program, &options)
}

async fn simulate(name: &str, text: &str, config: &Config) -> Result<()> {
    let session = interpret(text, config);
    if session.program().is_blank() {
        log::warn!("{} contains no program text", name);
    }
    print_session(name, &session, config)?;

    if config.play {
        play(&session, config).await?;
    }

    if let Some(target) = &config.save {
        let path = save_target(target, name);
        catalog::save_program(&path, &session.program().to_text())?;
    }

    Ok(())
}

fn print_session(name: &str, session: &InterpreterSession, config: &Config) -> Result<()> {
    match config.format {
        OutputFormat::Text => print!("{}", report::render_text(name, session)),
        OutputFormat::Json => println!("{}", report::render_json(name, session)?),
    }

    if let Some(index) = config.point {
        print_point(session, index, config)?;
    }
    Ok(())
}

fn print_point(session: &InterpreterSession, index: usize, config: &Config) -> Result<()> {
    let Some(info) = session.point_info(index) else {
        bail!(
            "Point {} is out of range; the program has {} points",
            index,
            session.points().len()
        );
    };
    match config.format {
        OutputFormat::Text => {
            if let Some(text) = report::render_point_info(session, index) {
                print!("{}", text);
            }
        }
        OutputFormat::Json => println!("{}", report::render_point_info_json(&info)?),
    }
    Ok(())
}

/// Print every point in order, one per tick
async fn play(session: &InterpreterSession, config: &Config) -> Result<()> {
    let mut playback = session.playback();
    let mut interval = tokio::time::interval(PLAY_INTERVAL);

    let Some(mut index) = playback.first() else {
        return Ok(());
    };
    loop {
        interval.tick().await;
        print_point(session, index, config)?;
        if playback.is_at_end() {
            break;
        }
        match playback.step_forward() {
            Some(next) => index = next,
            None => break,
        }
    }
    Ok(())
}

fn read_program(path: &Path) -> Result<String> {
    if catalog::ProgramKind::from_file_name(&display_name(path)).is_some() {
        return Ok(load_program_file(path)?.content);
    }
    // Plain text files are accepted as well
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read program file: {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Where `--save` writes a program: a directory target gets the program's
/// own file name, or `program.mpf` when the text has none.
fn save_target(target: &Path, name: &str) -> PathBuf {
    if !target.is_dir() {
        return target.to_path_buf();
    }
    let name = Path::new(name).file_name().filter(|n| !n.is_empty());
    match name {
        Some(name) => target.join(name),
        None => target.join(DEFAULT_SAVE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Args;
    use clap::Parser;

    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["mpf-sim"];
        argv.extend_from_slice(args);
        Config::from_parts(Args::parse_from(argv), None).unwrap()
    }

    #[test]
    fn test_interpret_strips_gutter_and_applies_preset() {
        let config = config(&["--gutter", "auto", "--spindle", "200"]);
        let session = interpret("1: G0 X0 Z0\n2: G1 X10 F0.1", &config);

        assert_eq!(session.points().len(), 2);
        assert_eq!(session.points()[1].spindle_speed, 200.0);
        assert_eq!(session.program().line(0), Some("G0 X0 Z0"));
    }

    #[test]
    fn test_save_target_names_file_after_program() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(save_target(dir.path(), "SHAFT.MPF"), dir.path().join("SHAFT.MPF"));
        assert_eq!(save_target(dir.path(), ""), dir.path().join(DEFAULT_SAVE_NAME));

        let file = dir.path().join("PART.MPF");
        assert_eq!(save_target(&file, "SHAFT.MPF"), file);
    }

    #[tokio::test]
    async fn test_save_several_programs_into_one_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let a = dir.path().join("A.MPF");
        let b = dir.path().join("B.MPF");
        fs::write(&a, "G0 X1 Z1\n").unwrap();
        fs::write(&b, "G0 X2 Z2\n").unwrap();

        let config = config(&[
            "--save",
            out.to_str().unwrap(),
            a.to_str().unwrap(),
            b.to_str().unwrap(),
        ]);
        run_with_config(&config).await.unwrap();

        assert_eq!(fs::read_to_string(out.join("A.MPF")).unwrap(), "G0 X1 Z1\n");
        assert_eq!(fs::read_to_string(out.join("B.MPF")).unwrap(), "G0 X2 Z2\n");
        assert!(!out.join(DEFAULT_SAVE_NAME).exists());
    }

    #[tokio::test]
    async fn test_play_stops_at_last_point() {
        let config = config(&["--format", "json"]);
        let session = interpret("G0 X0 Z0\nG1 X4 F0.1 S100\nG1 Z-2", &config);
        assert_eq!(session.points().len(), 3);
        play(&session, &config).await.unwrap();

        let empty = interpret("\n  \n", &config);
        assert!(empty.program().is_blank());
        play(&empty, &config).await.unwrap();
    }

    #[test]
    fn test_read_plain_text_program() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.nc");
        fs::write(&path, "G0 X1 Z1\n").unwrap();
        assert_eq!(read_program(&path).unwrap(), "G0 X1 Z1\n");
    }

    #[test]
    fn test_load_catalog_selects_example() {
        let config = config(&["--example", "example2.mpf"]);
        let catalog = load_catalog(&config).unwrap();
        assert_eq!(catalog.active().map(|p| p.name.as_str()), Some("EXAMPLE2.MPF"));
    }
}
