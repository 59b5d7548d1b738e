//! Plain text nodes

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{FeedbackSink, DISPLAYED_TEXT_WIDGET};

#[derive(Debug, Clone, Copy, Default)]
pub struct TextInput;

impl TextInput {
    pub fn get_text(&self, text: &str) -> String {
        text.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WrapText;

impl WrapText {
    pub fn wrap(&self, text: &str, prepend: &str, append: &str) -> String {
        format!("{}{}{}", prepend, text, append)
    }
}

/// Shows its inputs in the node and passes them through
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowText;

impl ShowText {
    pub fn show(
        &self,
        texts: &[String],
        node_id: Option<&str>,
        feedback: &dyn FeedbackSink,
    ) -> Vec<String> {
        if let Some(node_id) = node_id {
            feedback.send(node_id, DISPLAYED_TEXT_WIDGET, &texts.join("\n"));
        }
        texts.to_vec()
    }
}

/// Shuffles the space-separated words of a prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct ShufflePrompt;

impl ShufflePrompt {
    /// Newlines become spaces and commas are dropped before splitting. Every seed,
    /// zero included, gives a fixed order.
    pub fn shuffle(&self, text: &str, seed: u64) -> String {
        let flattened = text.replace(['\n', '\r'], " ").replace(',', "");
        let mut words: Vec<&str> = flattened.split(' ').filter(|w| !w.is_empty()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        words.shuffle(&mut rng);
        words.join(" ")
    }
}
