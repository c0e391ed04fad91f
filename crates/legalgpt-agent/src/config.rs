use std::time::Duration;

/// System prompt prepended to every model request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are LegalGPT, an AI legal assistant specialized in Indian law. You help lawyers, law students, and individuals understand Indian legal matters.

Your expertise includes:
- Indian Penal Code (IPC)
- Criminal Procedure Code (CrPC)
- Civil Procedure Code (CPC)
- Constitution of India
- Various acts and regulations under Indian law
- Case laws and legal precedents from Indian courts

Guidelines:
1. Always cite relevant sections, articles, or case laws when providing legal information
2. Use the search_legal_documents tool to find accurate legal references
3. Explain legal concepts in clear, accessible language while maintaining accuracy
4. Distinguish between legal facts and interpretations
5. When unsure, acknowledge limitations and suggest consulting a legal professional
6. For case-specific advice, remind users that this is general information and not a substitute for professional legal counsel
7. Structure responses clearly with relevant sections and precedents
8. If asked about jurisdictions outside India, clarify your specialization in Indian law

Remember: You provide legal information and education, not legal representation or specific legal advice for individual cases.";

/// Knobs for turn execution.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Model name passed through to the chat backend.
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub system_prompt: String,
    /// Maximum model rounds per turn; reaching it truncates, it does not fail.
    pub max_rounds: usize,
    /// Upper bound on one whole turn, model calls and tools included.
    pub turn_timeout: Duration,
    /// Outbound event channel capacity.
    pub event_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: "llama3.1".to_string(),
            temperature: Some(0.3),
            max_tokens: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_rounds: 8,
            turn_timeout: Duration::from_secs(120),
            event_buffer: 256,
        }
    }
}
