mod app;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqblocks_config::Config;
use reqblocks_engine::Editor;
use std::{
    env, fs,
    io::stdout,
    path::{Path, PathBuf},
    process,
};

use app::{App, ui};

#[derive(Debug, Default, PartialEq)]
struct Options {
    file: Option<PathBuf>,
    log_file: Option<PathBuf>,
    print_blocks: bool,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut options = Self::default();
        let mut args = args.iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--log" => {
                    let path = args.next().ok_or("--log needs a file")?;
                    options.log_file = Some(PathBuf::from(path));
                }
                "--blocks" => options.print_blocks = true,
                flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
                path if options.file.is_none() => options.file = Some(PathBuf::from(path)),
                _ => return Err("only one file can be edited".to_string()),
            }
        }

        if options.print_blocks && options.file.is_none() {
            return Err("--blocks needs a file".to_string());
        }
        Ok(options)
    }
}

/// Log to `log_file` when one is configured, nowhere otherwise; the
/// terminal belongs to the editor.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn print_blocks(editor: &Editor) {
    for block in editor.blocks() {
        println!(
            "{}\t{}\t{}\t{:?}",
            block.index,
            block.category.code(),
            block.category,
            block.content
        );
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let options = match Options::parse(&args[1..]) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: {} [--log <file>] [--blocks] [requirements-file]", args[0]);
            process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    init_logging(options.log_file.as_deref().or(config.log_file.as_deref()))?;
    log::info!("config path {}", Config::config_path().display());

    let dictionary = match config.load_dictionary() {
        Ok(dictionary) => dictionary,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let text = match &options.file {
        Some(path) if path.exists() => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        _ => String::new(),
    };
    let editor = Editor::from_text(&text, dictionary);

    if options.print_blocks {
        print_blocks(&editor);
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(editor, config.style_map(), options.file);

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Queued caret moves need the geometry that was just painted
        app.editor.after_layout(&app.layout);
        if app.editor.is_layout_stale() {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                if !app.handle_key(key) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => {}
        }
    }
}
