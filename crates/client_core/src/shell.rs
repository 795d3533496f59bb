use shared::{domain::ProductSubmission, protocol::AnalysisResult};

use crate::{
    projector::{project, RenderModel},
    submission::{SubmissionController, SubmissionError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Submit,
    Result,
    Regulator,
}

/// Cross-page state: the active tab and the last successful analysis.
///
/// Both fields change only through [`AppShell::submit_result`] and
/// [`AppShell::select_tab`].
#[derive(Debug, Default)]
pub struct AppShell {
    active_tab: Tab,
    current_result: Option<AnalysisResult>,
}

impl AppShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn current_result(&self) -> Option<&AnalysisResult> {
        self.current_result.as_ref()
    }

    pub fn render_model(&self) -> Option<RenderModel> {
        self.current_result.as_ref().map(project)
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    /// Stores a fresh result and switches to the result view in one step.
    pub fn submit_result(&mut self, result: AnalysisResult) {
        self.current_result = Some(result);
        self.active_tab = Tab::Result;
    }

    /// Runs `form` through `controller`; only a successful analysis reaches
    /// the shell.
    pub async fn submit(
        &mut self,
        controller: &SubmissionController,
        form: &ProductSubmission,
    ) -> Result<(), SubmissionError> {
        let result = controller.submit(form).await?;
        self.submit_result(result);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
