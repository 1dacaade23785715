/// External spelling validator applied to note text before it is stored.
///
/// Returns the words it rejects; an empty list means the text passes.
pub trait SpellChecker: Send + Sync {
    fn check(&self, text: &str) -> Vec<String>;
}

/// Used when no validator is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllSpellChecker;

impl SpellChecker for AcceptAllSpellChecker {
    fn check(&self, _text: &str) -> Vec<String> {
        Vec::new()
    }
}
