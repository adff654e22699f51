use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shown when varied prompts are off or the prompt source fails.
pub const DEFAULT_PROMPTS: &[&str] = &[
    "What made you smile today?",
    "Who is someone you're thankful for, and why?",
    "What is a small comfort you enjoyed today?",
    "What is something you're looking forward to?",
    "What challenge taught you something recently?",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: Option<String>,
    pub prompt_text: String,
}

impl Prompt {
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            id: None,
            prompt_text: text.into(),
        }
    }
}

/// Supplies server-side prompts when varied prompts are enabled.
pub trait PromptSource: Send + Sync {
    fn get_prompt(&self) -> Result<Prompt>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptState {
    Idle,
    Loading,
    Ready(Prompt),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    /// A request is already in flight.
    Ignored,
    /// Local fallback index moved to the contained position.
    Advanced(usize),
    /// Caller must fetch from the prompt source and call [`PromptRotator::resolve`].
    Fetch,
}

#[derive(Debug, Clone)]
pub struct PromptRotator {
    fallbacks: Vec<String>,
    index: usize,
    varied: bool,
    state: PromptState,
}

impl PromptRotator {
    pub fn new(fallbacks: Vec<String>, varied: bool) -> Self {
        let fallbacks = if fallbacks.is_empty() {
            DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect()
        } else {
            fallbacks
        };
        Self {
            fallbacks,
            index: 0,
            varied,
            state: PromptState::Idle,
        }
    }

    pub fn with_defaults(varied: bool) -> Self {
        Self::new(Vec::new(), varied)
    }

    pub fn state(&self) -> &PromptState {
        &self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PromptState::Loading)
    }

    pub fn varied(&self) -> bool {
        self.varied
    }

    pub fn set_varied(&mut self, varied: bool) {
        self.varied = varied;
        self.state = PromptState::Idle;
    }

    pub fn request_refresh(&mut self) -> RefreshAction {
        if self.is_loading() {
            return RefreshAction::Ignored;
        }
        if self.varied {
            self.state = PromptState::Loading;
            return RefreshAction::Fetch;
        }
        self.index = (self.index + 1) % self.fallbacks.len();
        RefreshAction::Advanced(self.index)
    }

    /// Late results (after a mode switch) are dropped. A failed fetch moves
    /// the local index, so repeated taps walk the fallback list while the
    /// source is down.
    pub fn resolve(&mut self, result: Result<Prompt>) {
        if !self.is_loading() {
            debug!("dropping prompt result that arrived outside of a request");
            return;
        }
        self.state = match result {
            Ok(prompt) => PromptState::Ready(prompt),
            Err(err) => {
                self.index = (self.index + 1) % self.fallbacks.len();
                debug!(%err, index = self.index, "prompt fetch failed, using fallback");
                PromptState::Error(err.to_string())
            }
        };
    }

    pub fn refresh_with(&mut self, source: &dyn PromptSource) -> RefreshAction {
        let action = self.request_refresh();
        if action == RefreshAction::Fetch {
            self.resolve(source.get_prompt());
        }
        action
    }

    pub fn current(&self) -> Prompt {
        match &self.state {
            PromptState::Ready(prompt) => prompt.clone(),
            _ => Prompt::fallback(self.fallbacks[self.index].clone()),
        }
    }

    pub fn current_text(&self) -> String {
        self.current().prompt_text
    }
}
