mod setup;
mod config_gen;
#[cfg(feature = "audio")]
mod audio;

use std::env;
use std::path::Path;
use anyhow::Context;
use casefile_core::config::CoreConfig;
use casefile_core::manager::load_story;
use casefile_core::renderer::driver::Driver;
use casefile_core::renderer::Renderer;
use casefile_core::Game;

fn main() {
    let args: Vec<String> = env::args().collect();
    let arg_plain = args.iter().any(|a| a == "--plain");
    let is_tui_mode = cfg!(feature = "tui") && !arg_plain;

    setup::init(is_tui_mode);
    log::info!(">>> Case File Launcher Started (TUI: {}) <<<", is_tui_mode);

    if let Err(e) = run(is_tui_mode) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(is_tui_mode: bool) -> anyhow::Result<()> {
    let core_cfg = CoreConfig::load();
    let story_path = &core_cfg.system.story_path;

    log::info!("Loading story from config: {}", story_path);
    if !Path::new(story_path).exists() {
        anyhow::bail!("Story '{}' not found. Please check config.toml or file path.", story_path);
    }
    let story = load_story(story_path).with_context(|| format!("Failed to load story from {}", story_path))?;
    let game = Game::new(story, &core_cfg);

    #[cfg(feature = "tui")]
    if is_tui_mode {
        log::info!("Mode: TUI");
        let renderer = casefile_core::TuiRenderer::new()?;
        return drive(game, renderer, &core_cfg);
    }

    let _ = is_tui_mode;
    log::info!("Mode: plain terminal");
    drive(game, casefile_core::TerminalRenderer::new(), &core_cfg)
}

fn drive<R: Renderer>(game: Game, renderer: R, core_cfg: &CoreConfig) -> anyhow::Result<()> {
    #[cfg(feature = "audio")]
    {
        match audio::AudioPlayer::new(core_cfg.audio.clone()) {
            Ok(player) => {
                let renderer = audio::AudibleRenderer::new(renderer, player);
                return Driver::new(game, renderer, core_cfg.pacing.tick()).run();
            }
            Err(e) => log::warn!("Audio unavailable, continuing silently: {}", e),
        }
    }

    Driver::new(game, renderer, core_cfg.pacing.tick()).run()
}
