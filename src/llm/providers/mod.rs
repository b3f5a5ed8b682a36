pub mod agentic;
pub mod gemini;
pub mod together;
