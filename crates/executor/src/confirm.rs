use async_trait::async_trait;

/// What the operator sees at the confirmation gate. The displayed command
/// is the anonymised form; the literal form never reaches the prompt.
#[derive(Debug, Clone)]
pub struct ConfirmRequest<'a> {
    pub tool: &'a str,
    pub displayed_command: &'a str,
    pub rationale: Option<&'a str>,
}

/// The single synchronous human decision point.
///
/// Implementations suspend until the operator answers; there is no
/// timeout. Cancellation (interrupt, closed stdin) must resolve to
/// `false` so the executor can record the implicit decline.
#[async_trait]
pub trait Confirm: Send + Sync {
    /// Base gate before any execution.
    async fn confirm_run(&self, request: &ConfirmRequest<'_>) -> bool;

    /// Additional gate for warn verdicts, naming the triggered rules.
    /// This is asked on top of (and before) the base gate.
    async fn acknowledge_warnings(
        &self,
        request: &ConfirmRequest<'_>,
        reasons: &[String],
    ) -> bool;
}
