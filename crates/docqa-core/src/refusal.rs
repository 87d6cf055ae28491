//! The canonical "I don't know" answer.
//!
//! The composer instructs the model to reply with exactly
//! [`REFUSAL_SENTENCE`] when the retrieved context is insufficient, and the
//! session layer detects unanswered questions by looking for
//! [`REFUSAL_MARKER`] in the reply. Both sides must read these values from
//! here (or from the same `PipelineConfig`), never from a local copy.

pub const REFUSAL_SENTENCE: &str = "Esa es una excelente pregunta. No tengo la información detallada sobre ese punto, lo consultaré con el equipo de campaña.";

pub const REFUSAL_MARKER: &str = "No tengo la información detallada";

pub fn is_refusal(answer: &str, marker: &str) -> bool {
    !marker.is_empty() && answer.contains(marker)
}
