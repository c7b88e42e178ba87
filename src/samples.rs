//! Sample extensions shipped with the demo.

use std::sync::Arc;

use nimbus_core::{Command, EditorBehavior, EditorWidget};
use nimbus_extension::{Extension, ExtensionApi, ExtensionHooks, ExtensionManifest, ExtensionResult};

/// Returns the demo's built-in extensions, disabled.
pub fn builtin_extensions() -> Vec<Extension> {
    vec![word_count(), uppercase()]
}

/// Counts words in the current buffer and reports them via the log.
fn word_count() -> Extension {
    Extension::new(ExtensionManifest::new(
        "sample.word-count",
        "Word Count",
        "Reports the word count of the current buffer",
        "1.0.0",
        "Nimbus contributors",
    ))
    .with_command(Command::callback(
        "sample.wordCount",
        "Count Words",
        |widget| {
            let words = widget.value().split_whitespace().count();
            tracing::info!(words, "word count");
        },
    ))
    .with_behavior(Arc::new(TrailingWhitespaceMarker))
    .with_hooks(WordCountHooks::default())
}

/// Uppercases the whole buffer in place.
fn uppercase() -> Extension {
    Extension::new(ExtensionManifest::new(
        "sample.uppercase",
        "Uppercase Buffer",
        "Rewrites the buffer in upper case",
        "0.1.0",
        "Nimbus contributors",
    ))
    .with_command(Command::callback(
        "sample.uppercase",
        "Uppercase Buffer",
        |widget| {
            let shouted = widget.value().to_uppercase();
            widget.set_value(&shouted);
        },
    ))
}

/// Marks trailing whitespace; declarative, the widget does the work.
struct TrailingWhitespaceMarker;

impl EditorBehavior for TrailingWhitespaceMarker {
    fn name(&self) -> &str {
        "trailing-whitespace-marker"
    }

    fn attach(&self, widget: &Arc<dyn EditorWidget>) {
        widget.run_action("editor.markTrailingWhitespace");
    }
}

/// Registers an extra command during activation and removes it again
/// on deactivation — the symmetric-cleanup pattern extensions should
/// follow for contributions made through the API.
#[derive(Default)]
struct WordCountHooks {
    api: Option<ExtensionApi>,
}

impl ExtensionHooks for WordCountHooks {
    fn activate(&mut self, api: &ExtensionApi) -> ExtensionResult<()> {
        api.register_command(Command::callback(
            "sample.charCount",
            "Count Characters",
            |widget| {
                let chars = widget.value().chars().count();
                tracing::info!(chars, "character count");
            },
        ))
        .ok();
        self.api = Some(api.clone());
        Ok(())
    }

    fn deactivate(&mut self) -> ExtensionResult<()> {
        if let Some(api) = self.api.take() {
            api.unregister_command("sample.charCount");
        }
        Ok(())
    }
}
