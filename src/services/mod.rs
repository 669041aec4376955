pub mod agent;
pub mod livekit;
pub mod llm_provider;
pub mod phrase;
pub mod similar_words;
pub mod supabase;
pub mod tutor;
pub mod voice_quiz;
