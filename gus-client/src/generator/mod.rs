//! Content generator: generate, critique, refine, copy

pub mod form;

use crate::api::{Backend, CritiqueRequest, RefineRequest};
use crate::clipboard::Clipboard;
use crate::lifecycle::{failure_message, Fallbacks, InFlight, Outcome};
use crate::model::{Critique, GenerationResult};
use crate::toast::Toast;
use crate::view::{CritiquePanel, GeneratorView, PanelState};
use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PROMPT_REQUIRED: &str = "Please enter a prompt";
pub const GENERATED: &str = "Content generated";
pub const GENERATED_WITH_CONTEXT: &str = "Content generated with knowledge base context";
pub const NOTHING_TO_CRITIQUE: &str = "Generate content first";
pub const CRITIQUE_REQUIRED: &str = "Critique the content before refining";
pub const REFINED: &str = "Content refined";
pub const NOTHING_TO_COPY: &str = "Nothing to copy";
pub const COPIED: &str = "Copied to clipboard";
pub const COPY_FAILED: &str = "Failed to copy to clipboard";

const OFFLINE: &str = "Network error. Please try again.";

const GENERATE_FALLBACKS: Fallbacks<'static> = Fallbacks {
    rejected: "Failed to generate content",
    offline: OFFLINE,
};

const CRITIQUE_FALLBACKS: Fallbacks<'static> = Fallbacks {
    rejected: "Failed to critique content",
    offline: OFFLINE,
};

const REFINE_FALLBACKS: Fallbacks<'static> = Fallbacks {
    rejected: "Failed to refine content",
    offline: OFFLINE,
};

struct GeneratorState {
    panel: PanelState,
    /// Prompt that produced `current`, sent along with critiques
    original_prompt: String,
    current: Option<GenerationResult>,
    critique: Option<Critique>,
}

/// Drives a generator view.
///
/// Generate and refine both replace the content, so they share one latch.
/// Critique has its own and may run alongside them; a critique that comes
/// back for content that has since been replaced is dropped and hidden.
pub struct GeneratorController {
    backend: Arc<dyn Backend>,
    view: Arc<dyn GeneratorView>,
    clipboard: Arc<dyn Clipboard>,
    content_busy: AtomicBool,
    critique_busy: AtomicBool,
    state: Mutex<GeneratorState>,
}

impl GeneratorController {
    pub fn new(
        backend: Arc<dyn Backend>,
        view: Arc<dyn GeneratorView>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            backend,
            view,
            clipboard,
            content_busy: AtomicBool::new(false),
            critique_busy: AtomicBool::new(false),
            state: Mutex::new(GeneratorState {
                panel: PanelState::Empty,
                original_prompt: String::new(),
                current: None,
                critique: None,
            }),
        }
    }

    /// Content currently on display
    pub fn current_result(&self) -> Option<GenerationResult> {
        self.state.lock().current.clone()
    }

    pub fn current_critique(&self) -> Option<Critique> {
        self.state.lock().critique.clone()
    }

    pub fn panel(&self) -> PanelState {
        self.state.lock().panel
    }

    /// Generate content from the form
    pub async fn generate(&self) -> Outcome {
        let request = self.view.form().to_request();
        if request.prompt.is_empty() {
            self.view.show_toast(Toast::warning(PROMPT_REQUIRED));
            return Outcome::Skipped;
        }

        let Some(_busy) = InFlight::claim(&self.content_busy) else {
            debug!("Generation already in flight");
            return Outcome::Skipped;
        };

        let previous = self.panel();
        self.set_panel(PanelState::Loading);

        info!(
            persona = %request.persona,
            use_ragie = request.use_ragie,
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "Generating content"
        );

        match self.backend.generate(&request).await {
            Ok(reply) => {
                let result = GenerationResult {
                    content: reply.content,
                    usage: reply.usage,
                };
                {
                    let mut state = self.state.lock();
                    state.original_prompt = request.prompt;
                    state.current = Some(result.clone());
                    state.critique = None;
                }

                self.view.show_content(&result);
                self.set_panel(PanelState::Content);
                self.view.set_critique_panel(CritiquePanel::Hidden);
                self.view.show_toast(Toast::success(if reply.context_used {
                    GENERATED_WITH_CONTEXT
                } else {
                    GENERATED
                }));
                Outcome::Completed
            }
            Err(err) => {
                warn!(error = %err, "Generation failed");
                self.view
                    .show_toast(Toast::error(failure_message(&err, &GENERATE_FALLBACKS)));
                self.set_panel(previous);
                Outcome::Failed
            }
        }
    }

    /// Ask the server to critique the content on display
    pub async fn critique(&self) -> Outcome {
        let request = {
            let state = self.state.lock();
            state.current.as_ref().map(|current| CritiqueRequest {
                content: current.content.clone(),
                original_prompt: state.original_prompt.clone(),
            })
        };
        let Some(request) = request else {
            self.view.show_toast(Toast::warning(NOTHING_TO_CRITIQUE));
            return Outcome::Skipped;
        };

        let view = &self.view;
        let Some(_busy) = InFlight::claim(&self.critique_busy)
            .map(|guard| guard.on_release(move || view.set_critique_enabled(true)))
        else {
            debug!("Critique already in flight");
            return Outcome::Skipped;
        };

        self.view.set_critique_enabled(false);
        self.view.set_critique_panel(CritiquePanel::Loading);

        info!(chars = request.content.len(), "Requesting critique");
        match self.backend.critique(&request).await {
            Ok(reply) => {
                {
                    let mut state = self.state.lock();
                    let unchanged = state
                        .current
                        .as_ref()
                        .is_some_and(|c| c.content == request.content);
                    if !unchanged {
                        debug!("Content replaced while critiquing, dropping critique");
                        drop(state);
                        self.view.set_critique_panel(CritiquePanel::Hidden);
                        return Outcome::Skipped;
                    }
                    state.critique = Some(Critique {
                        text: reply.critique.clone(),
                    });
                }
                self.view
                    .set_critique_panel(CritiquePanel::Shown(reply.critique));
                Outcome::Completed
            }
            Err(err) => {
                warn!(error = %err, "Critique failed");
                let message = failure_message(&err, &CRITIQUE_FALLBACKS);
                self.view
                    .set_critique_panel(CritiquePanel::Error(message.clone()));
                self.view.show_toast(Toast::error(message));
                Outcome::Failed
            }
        }
    }

    /// Rewrite the content using the current critique
    pub async fn refine(&self) -> Outcome {
        let request = {
            let state = self.state.lock();
            match (&state.current, &state.critique) {
                (Some(current), Some(critique)) => Ok(RefineRequest {
                    original_content: current.content.clone(),
                    critique: critique.text.clone(),
                }),
                (None, _) => Err(NOTHING_TO_CRITIQUE),
                (Some(_), None) => Err(CRITIQUE_REQUIRED),
            }
        };
        let request = match request {
            Ok(request) => request,
            Err(message) => {
                self.view.show_toast(Toast::warning(message));
                return Outcome::Skipped;
            }
        };

        let Some(_busy) = InFlight::claim(&self.content_busy) else {
            debug!("Content update already in flight");
            return Outcome::Skipped;
        };

        self.set_panel(PanelState::Loading);
        self.view.set_critique_panel(CritiquePanel::Hidden);

        info!(chars = request.original_content.len(), "Refining content");
        match self.backend.refine(&request).await {
            Ok(reply) => {
                let result = GenerationResult {
                    content: reply.refined_content,
                    usage: reply.usage,
                };
                {
                    let mut state = self.state.lock();
                    state.current = Some(result.clone());
                    state.critique = None;
                }

                self.view.show_content(&result);
                self.set_panel(PanelState::Content);
                // A critique may have landed while refining; it is now stale
                self.view.set_critique_panel(CritiquePanel::Hidden);
                self.view.show_toast(Toast::success(REFINED));
                Outcome::Completed
            }
            Err(err) => {
                warn!(error = %err, "Refinement failed");
                self.view
                    .show_toast(Toast::error(failure_message(&err, &REFINE_FALLBACKS)));
                self.set_panel(PanelState::Content);
                // Keep the critique so the refinement can be retried
                self.view
                    .set_critique_panel(CritiquePanel::Shown(request.critique));
                Outcome::Failed
            }
        }
    }

    /// Copy the content on display to the clipboard
    pub fn copy(&self) -> Outcome {
        let content = self.state.lock().current.as_ref().map(|c| c.content.clone());
        let Some(content) = content else {
            self.view.show_toast(Toast::warning(NOTHING_TO_COPY));
            return Outcome::Skipped;
        };

        match self.clipboard.set_text(&content) {
            Ok(()) => {
                self.view.show_toast(Toast::success(COPIED));
                Outcome::Completed
            }
            Err(e) => {
                warn!(error = %e, "Copy failed");
                self.view.show_toast(Toast::error(COPY_FAILED));
                Outcome::Failed
            }
        }
    }

    fn set_panel(&self, panel: PanelState) {
        self.state.lock().panel = panel;
        self.view.set_panel(panel);
    }
}
