pub mod chat;
pub mod prompts;
pub mod sections;

pub use chat::ChatAssistant;
pub use prompts::Section;
pub use sections::{SectionGateway, Sections};
