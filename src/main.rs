//! # Nimbus - Editor Shell Core
//!
//! The coordination core of a browser-style code editor: extension,
//! command and event registries around a single live widget handle.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the demo against the headless widget
//! cargo run
//!
//! # Load extensions from a directory of extension.toml manifests
//! cargo run -- --extensions path/to/extensions
//! ```

mod samples;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nimbus_core::{
    EditorCoordinator, EditorEvent, EditorWidget, EventKind, FileStore, HeadlessWidget,
    MemoryFileStore, Position, ShellConfig,
};
use nimbus_extension::{ExtensionLoader, ExtensionRegistry};

/// Nimbus - coordination core of a code editor shell
#[derive(Parser, Debug)]
#[command(name = "nimbus")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to load instead of the default location
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory of extension manifests to discover
    #[arg(short, long, value_name = "DIR")]
    extensions: Option<PathBuf>,

    /// File to open in the demo editor
    #[arg(value_name = "FILE", default_value = "src/main.tsx")]
    file: String,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Nimbus v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => ShellConfig::load_from(path)?,
        None => ShellConfig::load(),
    };

    let coordinator = Arc::new(EditorCoordinator::new(&config));
    let store = Arc::new(MemoryFileStore::with_defaults());

    // The save event handler chain: the core emits, the store persists.
    let sync_store = store.clone();
    coordinator
        .events()
        .subscribe(EventKind::Saved, move |event| {
            if let EditorEvent::Saved { path, content } = event {
                sync_store.update(path, content);
                tracing::info!(path = %path, bytes = content.len(), "saved to store");
            }
        })
        .detach();

    let status = coordinator.events().subscribe(EventKind::CursorMoved, |event| {
        if let EditorEvent::CursorMoved(position) = event {
            tracing::info!("status bar: {position}");
        }
    });

    // Extension registry over the coordinator's shared stores.
    let extensions = ExtensionRegistry::new(
        coordinator.handles().clone(),
        coordinator.commands().clone(),
        coordinator.behaviors().clone(),
    );
    for extension in samples::builtin_extensions() {
        extensions.add(extension)?;
    }
    if let Some(dir) = &args.extensions {
        for extension in ExtensionLoader::new(dir).discover()? {
            if let Err(error) = extensions.add(extension) {
                tracing::warn!(%error, "skipping extension");
            }
        }
    }

    // Mount the headless widget and wire its chords back to dispatch.
    let widget = Arc::new(HeadlessWidget::new());
    let dispatcher = coordinator.clone();
    widget.set_dispatcher(move |command_id| {
        if let Err(error) = dispatcher.commands().dispatch(command_id) {
            tracing::warn!(command_id, %error, "chord dispatch failed");
        }
    });

    widget.set_value(&store.content(&args.file));
    coordinator.set_current_file(args.file.as_str());
    coordinator.mount(&widget);

    // Enable every installed extension.
    for info in extensions.list() {
        extensions.toggle(&info.id)?;
    }

    tracing::info!("command palette:");
    for command in coordinator.commands().commands() {
        let chord = command.keybinding.as_deref().unwrap_or("-");
        tracing::info!("  {:<28} {:<24} {}", command.id, command.label, chord);
    }

    // A short scripted session.
    widget.type_text("\nconsole.log(\"hello from nimbus\");\n");
    widget.move_cursor(Position::new(3, 1));
    coordinator.format_document();
    coordinator.commands().dispatch("sample.wordCount")?;
    widget.press("Ctrl+S");

    tracing::info!(
        file = %args.file,
        bytes = store.content(&args.file).len(),
        "store contents after save"
    );

    for info in extensions.list() {
        extensions.toggle(&info.id)?;
    }
    drop(status);
    coordinator.unmount();
    coordinator.dispose();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["nimbus"]);
        assert!(args.config.is_none());
        assert_eq!(args.file, "src/main.tsx");
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args_with_extensions_dir() {
        let args = Args::parse_from(["nimbus", "--extensions", "exts", "-vv"]);
        assert_eq!(args.extensions, Some(PathBuf::from("exts")));
        assert_eq!(args.verbose, 2);
    }
}
