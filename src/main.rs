use music_wordle::catalog::{CatalogProvider, StaticCatalog};
use music_wordle::cli::{CliInterface, parse_cli};
use music_wordle::config::{Config, InterfaceKind, SourceKind};
use music_wordle::deezer::DeezerCatalog;
use music_wordle::error::Result;
use music_wordle::game_state::{GameInterface, SessionSettings, game_loop};
use music_wordle::logging::init_logging;
use music_wordle::spotify::SpotifyCatalog;
use music_wordle::tui::TuiInterface;
use music_wordle::info_log;
use std::io;
use std::process::ExitCode;

fn build_catalog(config: &Config) -> Result<Box<dyn CatalogProvider>> {
    let catalog: Box<dyn CatalogProvider> = match config.source {
        SourceKind::Embedded => match &config.artists_file {
            Some(path) => Box::new(StaticCatalog::from_file(path)?),
            None => Box::new(StaticCatalog::embedded()),
        },
        SourceKind::Deezer => Box::new(DeezerCatalog::new(
            &config.deezer_base_url,
            config.artist_cache_ttl(),
            config.song_cache_ttl(),
        )),
        SourceKind::Spotify => Box::new(SpotifyCatalog::new(
            &config.spotify_base_url,
            config.resolve_spotify_token(),
            config.artist_cache_ttl(),
        )?),
    };
    Ok(catalog)
}

fn run() -> Result<()> {
    let cli = parse_cli();
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli)?;
    init_logging(cli.verbose, config.interface);
    info_log!(
        "main() - mode {:?}, source {:?}, {} attempts",
        config.mode,
        config.source,
        config.max_attempts
    );

    let mut catalog = build_catalog(&config)?;
    let settings = SessionSettings {
        mode: config.mode,
        artist: config.artist.clone(),
        max_attempts: config.max_attempts,
        seed: config.seed,
        date: chrono::Local::now().date_naive(),
    };

    // The interface is dropped at the end of this block, so the terminal is
    // restored before main prints any error.
    {
        let mut interface: Box<dyn GameInterface> = match config.interface {
            InterfaceKind::Tui => match TuiInterface::new() {
                Ok(tui) => Box::new(tui),
                Err(e) => {
                    eprintln!("could not start the full-screen interface ({e}), using plain mode");
                    Box::new(CliInterface::new(io::stdin().lock()))
                }
            },
            InterfaceKind::Plain => Box::new(CliInterface::new(io::stdin().lock())),
        };
        game_loop(catalog.as_mut(), &settings, interface.as_mut())
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("music-wordle: {e}");
            ExitCode::FAILURE
        }
    }
}
